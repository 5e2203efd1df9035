use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;
use crate::StatusDialect;

/// Location of the Pemira REST backend and transport limits
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    /// Default: "http://localhost:4000/api"
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// TCP connect timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_in_ms: u64,

    /// Whole request timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_in_ms: u64,

    /// Base URL of the ballot endpoints (`/votes/...`), which the backend
    /// serves outside the API prefix.
    /// Default: origin of `base_url`, e.g. "http://localhost:4000"
    #[serde(default)]
    pub votes_base_url: Option<String>,

    /// Spelling of lifecycle status values sent to the backend.
    /// Responses are accepted in either spelling.
    #[serde(default)]
    pub status_dialect: StatusDialect,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            votes_base_url: None,
            connect_timeout_in_ms: default_connect_timeout(),
            request_timeout_in_ms: default_request_timeout(),
            status_dialect: StatusDialect::default(),
        }
    }
}

impl ApiConfig {
    pub fn validate(&self) -> Result<()> {
        validate_url("api.base_url", &self.base_url)?;
        if let Some(votes_base_url) = &self.votes_base_url {
            validate_url("api.votes_base_url", votes_base_url)?;
        }
        if self.connect_timeout_in_ms == 0 {
            return Err(Error::InvalidConfig(
                "api.connect_timeout_in_ms must be > 0".into(),
            ));
        }
        if self.request_timeout_in_ms < self.connect_timeout_in_ms {
            return Err(Error::InvalidConfig(format!(
                "api request timeout {}ms must not be shorter than connect timeout {}ms",
                self.request_timeout_in_ms, self.connect_timeout_in_ms
            )));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_in_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_in_ms)
    }
}

fn validate_url(
    field: &str,
    url: &str,
) -> Result<()> {
    let url = url.trim();
    if url.is_empty() {
        return Err(Error::InvalidConfig(format!("{field} cannot be empty")));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(Error::InvalidConfig(format!(
            "{field} `{url}` must start with http:// or https://"
        )));
    }
    Ok(())
}

fn default_base_url() -> String {
    "http://localhost:4000/api".to_string()
}
fn default_connect_timeout() -> u64 {
    1000
}
fn default_request_timeout() -> u64 {
    3000
}
