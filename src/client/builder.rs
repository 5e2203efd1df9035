use std::time::Duration;

use super::config::normalize_base_url;
use super::ClientApiResult;
use super::ClientConfig;
use super::HttpClient;
use crate::StatusDialect;

/// Configurable builder for [`HttpClient`] instances
///
/// # Default Configuration
/// - Connect Timeout: 1s
/// - Request Timeout: 3s
/// - Ballot endpoints: origin of the backend URL
/// - Status dialect: English
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    /// Create a new builder with default config and the given backend URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            config: ClientConfig::new(base_url),
        }
    }

    /// Set connection timeout (default: 1s)
    pub fn connect_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set request timeout (default: 3s)
    pub fn request_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the base URL of the ballot endpoints (default: origin of the
    /// backend URL)
    pub fn votes_base_url(
        mut self,
        url: impl Into<String>,
    ) -> Self {
        self.config.votes_base_url = normalize_base_url(url.into());
        self
    }

    /// Set the spelling of status values sent to the backend
    pub fn status_dialect(
        mut self,
        dialect: StatusDialect,
    ) -> Self {
        self.config.status_dialect = dialect;
        self
    }

    /// Completely replaces the configuration, including the base URL
    ///
    /// Discards every setting made through the granular methods.
    pub fn set_config(
        mut self,
        config: ClientConfig,
    ) -> Self {
        self.config = ClientConfig {
            base_url: normalize_base_url(config.base_url),
            votes_base_url: normalize_base_url(config.votes_base_url),
            ..config
        };
        self
    }

    /// Build the client with current configuration
    pub fn build(self) -> ClientApiResult<HttpClient> {
        HttpClient::new(self.config)
    }
}
