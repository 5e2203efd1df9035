use std::sync::Arc;

use tracing::info;

use super::ElectionLifecycle;
use super::ElectionStatus;
use super::LifecycleCommand;
use crate::constants::MSG_RESET_CONFIRM;
use crate::constants::MSG_RESET_FAILED;
use crate::constants::MSG_STATUS_UPDATE_FAILED;
use crate::Error;
use crate::PreconditionError;
use crate::Result;
use crate::SessionContext;

/// Lifecycle commands of an authenticated admin
pub struct AdminControls {
    lifecycle: Arc<ElectionLifecycle>,
    session: Arc<SessionContext>,
}

impl AdminControls {
    pub fn new(
        lifecycle: Arc<ElectionLifecycle>,
        session: Arc<SessionContext>,
    ) -> Self {
        Self { lifecycle, session }
    }

    pub fn lifecycle(&self) -> &ElectionLifecycle {
        &self.lifecycle
    }

    /// Whether the control for `command` is enabled
    pub fn is_enabled(
        &self,
        command: LifecycleCommand,
    ) -> bool {
        self.lifecycle.available_command() == Some(command)
    }

    /// `closed -> open`
    pub async fn start_election(&self) -> Result<ElectionStatus> {
        self.run(LifecycleCommand::Start).await
    }

    /// `open -> completed`
    pub async fn end_election(&self) -> Result<ElectionStatus> {
        self.run(LifecycleCommand::End).await
    }

    /// Opens the confirmation gate in front of the reset.
    ///
    /// Nothing is sent until [`ResetConfirmation::confirm`] is called.
    pub fn request_reset(&self) -> Result<ResetConfirmation<'_>> {
        self.authorize(LifecycleCommand::Reset)?;
        Ok(ResetConfirmation { controls: self })
    }

    fn authorize(
        &self,
        command: LifecycleCommand,
    ) -> Result<()> {
        self.session.require_token()?;
        if !self.is_enabled(command) {
            return Err(PreconditionError::InvalidLifecycleState {
                operation: command.name(),
                status: self.lifecycle.cached().to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn run(
        &self,
        command: LifecycleCommand,
    ) -> Result<ElectionStatus> {
        self.authorize(command)?;
        self.session.touch();
        self.lifecycle.transition(command).await
    }
}

/// Pending reset awaiting an explicit answer
#[must_use = "a reset happens only once confirmed"]
pub struct ResetConfirmation<'a> {
    controls: &'a AdminControls,
}

impl ResetConfirmation<'_> {
    pub fn prompt(&self) -> &'static str {
        MSG_RESET_CONFIRM
    }

    /// Purges every ballot and closes the election.
    pub async fn confirm(self) -> Result<ElectionStatus> {
        self.controls.run(LifecycleCommand::Reset).await
    }

    /// Leaves the lifecycle untouched.
    pub fn cancel(self) {
        info!("[:AdminControls:reset] cancelled");
    }
}

/// Message shown for a failed admin command
pub fn command_failure_message(
    command: LifecycleCommand,
    error: &Error,
) -> String {
    let fallback = match command {
        LifecycleCommand::Reset => MSG_RESET_FAILED,
        LifecycleCommand::Start | LifecycleCommand::End => MSG_STATUS_UPDATE_FAILED,
    };
    error.user_message(fallback)
}
