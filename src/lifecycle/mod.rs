//! Election lifecycle as mirrored by a client
//!
//! The server owns the status; [`ElectionLifecycle`] keeps the last value it
//! confirmed and answers the guard questions every voter screen asks before
//! rendering. Admin transitions go through [`AdminControls`].

mod admin;
mod status;

pub use admin::*;
pub use status::*;


use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::ClientApiResult;
use crate::PemiraApi;
use crate::PreconditionError;
use crate::Result;

pub struct ElectionLifecycle {
    api: Arc<dyn PemiraApi>,
    cached: RwLock<CachedStatus>,
    transition_in_flight: AtomicBool,
}

impl ElectionLifecycle {
    pub fn new(api: Arc<dyn PemiraApi>) -> Self {
        Self {
            api,
            cached: RwLock::new(CachedStatus::Unknown),
            transition_in_flight: AtomicBool::new(false),
        }
    }

    pub fn cached(&self) -> CachedStatus {
        *self.cached.read()
    }

    /// Refreshes the cache from the server.
    ///
    /// A failed fetch resets the cache to [`CachedStatus::Unknown`], which
    /// every guard treats as not open.
    pub async fn fetch_status(&self) -> ClientApiResult<ElectionStatus> {
        match self.api.fetch_status().await {
            Ok(status) => {
                debug!("[:ElectionLifecycle:fetch_status] server reports {}", status);
                *self.cached.write() = CachedStatus::Known(status);
                Ok(status)
            }
            Err(e) => {
                warn!("[:ElectionLifecycle:fetch_status] failed, assuming closed: {}", e);
                *self.cached.write() = CachedStatus::Unknown;
                Err(e)
            }
        }
    }

    /// Issues `command` against the server.
    ///
    /// The command must match the cached status. On success the cache holds
    /// the status the server confirmed, which is not necessarily the
    /// requested one; on failure the cache is left as it was.
    pub async fn transition(
        &self,
        command: LifecycleCommand,
    ) -> Result<ElectionStatus> {
        let current = self.cached();
        if current != CachedStatus::Known(command.required_status()) {
            return Err(PreconditionError::InvalidLifecycleState {
                operation: command.name(),
                status: current.to_string(),
            }
            .into());
        }

        let _guard = InFlight::acquire(&self.transition_in_flight, command.name())?;

        let confirmed = match command {
            LifecycleCommand::Reset => {
                self.api.reset_pemira().await.map_err(|e| {
                    warn!("[:ElectionLifecycle:transition] ballot purge failed: {}", e);
                    e
                })?;
                info!("[:ElectionLifecycle:transition] ballots purged");
                self.api.update_status(command.target_status()).await
            }
            LifecycleCommand::Start | LifecycleCommand::End => {
                self.api.update_status(command.target_status()).await
            }
        }
        .map_err(|e| {
            warn!(
                "[:ElectionLifecycle:transition] {} rejected, keeping {}: {}",
                command.name(),
                current,
                e
            );
            e
        })?;

        if confirmed != command.target_status() {
            warn!(
                "[:ElectionLifecycle:transition] {} requested {} but server confirmed {}",
                command.name(),
                command.target_status(),
                confirmed
            );
        }
        info!(
            "[:ElectionLifecycle:transition] {}: {} -> {}",
            command.name(),
            current,
            confirmed
        );
        *self.cached.write() = CachedStatus::Known(confirmed);
        Ok(confirmed)
    }

    /// Ballot casting UI and calls are permitted
    pub fn ballot_allowed(&self) -> bool {
        self.cached().is_open()
    }

    /// Identity capture is permitted
    pub fn identity_allowed(&self) -> bool {
        self.cached().is_open()
    }

    /// The one admin command the cached status offers, none while unknown
    pub fn available_command(&self) -> Option<LifecycleCommand> {
        self.cached().status().map(LifecycleCommand::for_status)
    }

    /// Fails the guard with the status the caller should render.
    pub fn require_open(&self) -> std::result::Result<(), ElectionStatus> {
        let cached = self.cached();
        if cached.is_open() {
            Ok(())
        } else {
            Err(cached.effective())
        }
    }
}

/// Marks an operation as running until dropped
pub(crate) struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlight<'a> {
    pub(crate) fn acquire(
        flag: &'a AtomicBool,
        operation: &'static str,
    ) -> std::result::Result<Self, PreconditionError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PreconditionError::InFlight(operation))?;
        Ok(Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
