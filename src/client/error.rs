use reqwest::StatusCode;
use serde::Deserialize;
use serde::Serialize;

pub type ClientApiResult<T> = std::result::Result<T, ClientApiError>;

/// Error codes for failures of the Pemira REST backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    ConnectionTimeout,
    ConnectionFailed,
    InvalidResponse,
    InvalidRequest,
    Unauthorized,
    NotFound,
    /// Ballot uniqueness violation: the voter already has a ballot
    AlreadyVoted,
    ServerError,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientApiError {
    /// Transport layer error (retryable)
    #[serde(rename = "network")]
    Network {
        code: ErrorCode,
        message: String,
        retry_after_ms: Option<u64>,
    },

    /// Response could not be understood
    #[serde(rename = "protocol")]
    Protocol { code: ErrorCode, message: String },

    /// Server rejected the request
    #[serde(rename = "business")]
    Business {
        code: ErrorCode,
        message: String,
        /// `message` field of the server's error body, shown to users verbatim
        #[serde(skip_serializing_if = "Option::is_none")]
        server_message: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        required_action: Option<String>,
    },

    /// General Client Api error
    #[serde(rename = "general")]
    General { code: ErrorCode, message: String },
}

impl ClientApiError {
    /// Returns the error code associated with this error
    pub fn code(&self) -> ErrorCode {
        match self {
            ClientApiError::Network { code, .. } => *code,
            ClientApiError::Protocol { code, .. } => *code,
            ClientApiError::Business { code, .. } => *code,
            ClientApiError::General { code, .. } => *code,
        }
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        match self {
            ClientApiError::Network { message, .. } => message,
            ClientApiError::Protocol { message, .. } => message,
            ClientApiError::Business { message, .. } => message,
            ClientApiError::General { message, .. } => message,
        }
    }

    /// Message the server attached to a rejection, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientApiError::Business { server_message, .. } => server_message.as_deref(),
            _ => None,
        }
    }

    /// Server-provided message when available, `fallback` otherwise
    pub fn user_message(
        &self,
        fallback: &str,
    ) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }

    pub fn is_already_voted(&self) -> bool {
        self.code() == ErrorCode::AlreadyVoted
    }

    /// Whether the user may simply try the same request again
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self.code(),
            ErrorCode::AlreadyVoted | ErrorCode::Unauthorized | ErrorCode::NotFound
        )
    }

    pub fn general_client_error(message: String) -> Self {
        ClientApiError::General {
            code: ErrorCode::General,
            message,
        }
    }

    /// Maps a non-success HTTP response to an error.
    ///
    /// The ballot uniqueness rejection is recognised either by `409 Conflict`
    /// or by a 4xx whose message says the voter already voted.
    pub fn from_http_status(
        status: StatusCode,
        server_message: Option<String>,
    ) -> Self {
        let message = format!("HTTP {}", status.as_u16());
        let business = |code: ErrorCode, required_action: Option<&str>| ClientApiError::Business {
            code,
            message: message.clone(),
            server_message: server_message.clone(),
            required_action: required_action.map(str::to_string),
        };

        if status == StatusCode::CONFLICT
            || (status.is_client_error()
                && server_message.as_deref().is_some_and(is_already_voted_message))
        {
            return business(ErrorCode::AlreadyVoted, None);
        }

        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                business(ErrorCode::InvalidRequest, Some("check request fields"))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                business(ErrorCode::Unauthorized, Some("log in again"))
            }
            StatusCode::NOT_FOUND => business(ErrorCode::NotFound, None),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ClientApiError::Network {
                code: ErrorCode::ConnectionTimeout,
                message: message.clone(),
                retry_after_ms: Some(1000),
            },
            s if s.is_server_error() => business(ErrorCode::ServerError, Some("try again later")),
            _ => business(ErrorCode::General, None),
        }
    }
}

fn is_already_voted_message(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("already voted")
        || message.contains("sudah melakukan voting")
        || message.contains("sudah memilih")
}

impl From<ErrorCode> for ClientApiError {
    fn from(code: ErrorCode) -> Self {
        match code {
            // Network layer errors
            ErrorCode::ConnectionTimeout => ClientApiError::Network {
                code,
                message: "Connection timeout".to_string(),
                retry_after_ms: Some(3000),
            },
            ErrorCode::ConnectionFailed => ClientApiError::Network {
                code,
                message: "Connection failed".to_string(),
                retry_after_ms: Some(5000),
            },

            // Protocol layer errors
            ErrorCode::InvalidResponse => ClientApiError::Protocol {
                code,
                message: "Invalid response format".to_string(),
            },

            // Business logic errors
            ErrorCode::InvalidRequest => ClientApiError::Business {
                code,
                message: "Invalid request".to_string(),
                server_message: None,
                required_action: Some("check request fields".to_string()),
            },
            ErrorCode::Unauthorized => ClientApiError::Business {
                code,
                message: "Unauthorized".to_string(),
                server_message: None,
                required_action: Some("log in again".to_string()),
            },
            ErrorCode::NotFound => ClientApiError::Business {
                code,
                message: "Not found".to_string(),
                server_message: None,
                required_action: None,
            },
            ErrorCode::AlreadyVoted => ClientApiError::Business {
                code,
                message: "Voter already has a ballot".to_string(),
                server_message: None,
                required_action: None,
            },
            ErrorCode::ServerError => ClientApiError::Business {
                code,
                message: "Internal server error".to_string(),
                server_message: None,
                required_action: Some("try again later".to_string()),
            },

            ErrorCode::General => ClientApiError::General {
                code,
                message: "General Client Api error".to_string(),
            },
        }
    }
}

impl From<reqwest::Error> for ClientApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ClientApiError::Network {
                code: ErrorCode::ConnectionTimeout,
                message: format!("Connection timeout: {err}"),
                retry_after_ms: Some(3000),
            };
        }
        if err.is_connect() {
            return ClientApiError::Network {
                code: ErrorCode::ConnectionFailed,
                message: format!("Connection failed: {err}"),
                retry_after_ms: Some(5000),
            };
        }
        if err.is_decode() {
            return ClientApiError::Protocol {
                code: ErrorCode::InvalidResponse,
                message: format!("Invalid response body: {err}"),
            };
        }
        if let Some(status) = err.status() {
            return ClientApiError::from_http_status(status, None);
        }
        if err.is_builder() {
            return ClientApiError::general_client_error(format!("Invalid request: {err}"));
        }

        ClientApiError::Network {
            code: ErrorCode::ConnectionFailed,
            message: "Connection unexpectedly closed".into(),
            retry_after_ms: Some(5000),
        }
    }
}

impl From<serde_json::Error> for ClientApiError {
    fn from(err: serde_json::Error) -> Self {
        ClientApiError::Protocol {
            code: ErrorCode::InvalidResponse,
            message: format!("Invalid response body: {err}"),
        }
    }
}

impl std::fmt::Display for ClientApiError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self.server_message() {
            Some(server_message) => {
                write!(f, "{:?}: {} ({})", self.code(), self.message(), server_message)
            }
            None => write!(f, "{:?}: {}", self.code(), self.message()),
        }
    }
}

impl std::error::Error for ClientApiError {}
