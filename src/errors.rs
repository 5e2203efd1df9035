//! Pemira client error hierarchy
//!
//! Remote-call failures are carried as [`ClientApiError`] and are expected to
//! be mapped to a view by the caller. The variants below cover the failures
//! that happen before or around a remote call.

use config::ConfigError;

use crate::ClientApiError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration source could not be read or deserialized
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration was loaded but violates a sanity rule
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Remote REST call failed
    #[error(transparent)]
    Api(#[from] ClientApiError),

    /// Operation entered without its required context
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// User input rejected before any request was sent
    #[error("{0}")]
    Validation(String),

    /// Local file handling (log dir, CSV export, candidate image)
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Server-provided message for remote failures, `fallback` for other
    /// remote failures, the error itself otherwise
    pub fn user_message(
        &self,
        fallback: &str,
    ) -> String {
        match self {
            Error::Api(e) => e.user_message(fallback),
            other => other.to_string(),
        }
    }
}

/// Failures that redirect to an entry point instead of rendering inline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
    #[error("Voter student id is missing from the navigation context")]
    MissingVoterId,

    #[error("No authentication token, please log in")]
    MissingAuthToken,

    #[error("Admin session expired")]
    SessionExpired,

    #[error("Destructive operation `{0}` requires explicit confirmation")]
    ConfirmationRequired(&'static str),

    #[error("Operation `{0}` is already in flight")]
    InFlight(&'static str),

    #[error("Operation `{operation}` is not available while the election is {status}")]
    InvalidLifecycleState {
        operation: &'static str,
        status: String,
    },
}

impl PreconditionError {
    /// Entry point the user is sent to, for failures that leave the screen
    pub fn entry_point(&self) -> Option<crate::Route> {
        match self {
            PreconditionError::MissingVoterId => Some(crate::Route::Identity),
            PreconditionError::MissingAuthToken | PreconditionError::SessionExpired => {
                Some(crate::Route::Logout)
            }
            _ => None,
        }
    }
}
