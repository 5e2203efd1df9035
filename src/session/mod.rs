//! Admin authentication context
//!
//! [`SessionContext`] owns the bearer token and user id for the whole
//! process: it is initialised by a login (or by restoring a saved token) and
//! torn down by a logout or by expiry. Expiry is either the hard token
//! lifetime or a stretch of inactivity, checked by [`spawn_inactivity_watchdog`].

mod watchdog;

pub use watchdog::*;


use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::constants::*;
use crate::Credentials;
use crate::ErrorCode;
use crate::PemiraApi;
use crate::PreconditionError;
use crate::Redirect;
use crate::Route;
use crate::SessionConfig;
use crate::UiConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryReason {
    TokenLifetime,
    Inactivity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
    LoggedOut,
    Expired(ExpiryReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// Login rejection as shown on the login form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginFailure {
    pub severity: Severity,
    pub message: String,
}

impl LoginFailure {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

struct Credential {
    token: String,
    user_id: Option<String>,
    issued_at: Instant,
    last_activity: Instant,
}

pub struct SessionContext {
    api: Arc<dyn PemiraApi>,
    config: SessionConfig,
    logout_delay: Duration,
    credential: Mutex<Option<Credential>>,
    state_tx: watch::Sender<SessionState>,
}

impl SessionContext {
    pub fn new(
        api: Arc<dyn PemiraApi>,
        config: SessionConfig,
        ui: &UiConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Anonymous);
        Self {
            api,
            config,
            logout_delay: ui.logout_redirect_delay(),
            credential: Mutex::new(None),
            state_tx,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Authenticates against `POST /login` and installs the issued token.
    ///
    /// On success the caller navigates to the dashboard.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> std::result::Result<Redirect, LoginFailure> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(LoginFailure::warning(MSG_LOGIN_EMPTY));
        }

        let credentials = Credentials {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        match self.api.login(credentials).await {
            Ok(response) => {
                self.install(response.token, Some(response.user.id));
                info!("[:SessionContext:login] admin {} logged in", username.trim());
                Ok(Redirect::now(Route::Dashboard))
            }
            Err(e) => Err(match e.code() {
                ErrorCode::InvalidRequest => {
                    warn!("[:SessionContext:login] rejected: {}", e);
                    LoginFailure::warning(e.user_message(MSG_LOGIN_EMPTY))
                }
                ErrorCode::Unauthorized => {
                    warn!("[:SessionContext:login] wrong credentials for {}", username.trim());
                    LoginFailure::warning(MSG_LOGIN_MISMATCH)
                }
                ErrorCode::NotFound => {
                    warn!("[:SessionContext:login] unknown user {}", username.trim());
                    LoginFailure::warning(MSG_LOGIN_UNKNOWN_USER)
                }
                _ => {
                    error!("[:SessionContext:login] {}", e);
                    LoginFailure::error(MSG_LOGIN_SYSTEM)
                }
            }),
        }
    }

    /// Re-enters a session from a token saved by an earlier login.
    pub fn restore(
        &self,
        token: impl Into<String>,
        user_id: Option<String>,
    ) {
        self.install(token.into(), user_id);
    }

    fn install(
        &self,
        token: String,
        user_id: Option<String>,
    ) {
        let now = Instant::now();
        self.api.set_auth_token(Some(token.clone()));
        *self.credential.lock() = Some(Credential {
            token,
            user_id,
            issued_at: now,
            last_activity: now,
        });
        self.state_tx.send_replace(SessionState::Authenticated);
    }

    /// Drops the credentials and schedules the return to the login page.
    pub fn logout(&self) -> Redirect {
        if self.teardown(SessionState::LoggedOut) {
            info!("[:SessionContext:logout] admin logged out");
        }
        Redirect::after(Route::Login, self.logout_delay)
    }

    /// Returns whether a credential was actually dropped
    fn teardown(
        &self,
        state: SessionState,
    ) -> bool {
        let dropped = self.credential.lock().take().is_some();
        if dropped {
            self.api.set_auth_token(None);
            self.state_tx.send_replace(state);
        }
        dropped
    }

    /// Records user activity, postponing the inactivity expiry.
    ///
    /// An already expired credential stays expired.
    pub fn touch(&self) {
        let mut guard = self.credential.lock();
        if let Some(credential) = guard.as_mut() {
            if self.expiry_of(credential).is_none() {
                credential.last_activity = Instant::now();
            }
        }
    }

    /// Tears the session down if it expired, reporting why.
    pub fn check_expiry(&self) -> Option<ExpiryReason> {
        let reason = {
            let guard = self.credential.lock();
            let credential = guard.as_ref()?;
            self.expiry_of(credential)?
        };
        if self.teardown(SessionState::Expired(reason)) {
            info!("[:SessionContext:check_expiry] session expired: {:?}", reason);
        }
        Some(reason)
    }

    fn expiry_of(
        &self,
        credential: &Credential,
    ) -> Option<ExpiryReason> {
        let now = Instant::now();
        if now.duration_since(credential.issued_at) >= self.config.token_ttl() {
            Some(ExpiryReason::TokenLifetime)
        } else if now.duration_since(credential.last_activity) >= self.config.inactivity_timeout() {
            Some(ExpiryReason::Inactivity)
        } else {
            None
        }
    }

    /// Token of a live session; expired sessions are torn down first.
    pub fn require_token(&self) -> std::result::Result<String, PreconditionError> {
        if self.check_expiry().is_some() {
            return Err(PreconditionError::SessionExpired);
        }
        self.credential
            .lock()
            .as_ref()
            .map(|c| c.token.clone())
            .ok_or(PreconditionError::MissingAuthToken)
    }

    /// Entry check of the dashboard: without a live session go to logout.
    pub fn guard_dashboard(&self) -> std::result::Result<(), Redirect> {
        self.require_token()
            .map(|_| ())
            .map_err(|_| Redirect::now(Route::Logout))
    }

    pub fn user_id(&self) -> Option<String> {
        self.credential.lock().as_ref().and_then(|c| c.user_id.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.lock().is_some()
    }

    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }
}
