use std::time::Duration;

use reqwest::Url;

use crate::ApiConfig;
use crate::StatusDialect;

/// Client configuration parameters for the REST connection
///
/// # Key Configuration Areas
/// - Backend location
/// - Connection establishment and request lifecycle timeouts
/// - Wire spelling of lifecycle status values
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL endpoint paths are appended to, without trailing slash
    pub base_url: String,

    /// Base URL of the ballot endpoints, without trailing slash
    /// Default: origin of `base_url`
    pub votes_base_url: String,

    /// Maximum time to wait for establishing a TCP connection
    /// Default: 1 second
    pub connect_timeout: Duration,

    /// Maximum time to wait for a complete response
    /// Default: 3 seconds
    pub request_timeout: Duration,

    /// Spelling used when sending a status to the backend
    /// Default: English (`closed` / `open` / `completed`)
    pub status_dialect: StatusDialect,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = normalize_base_url(base_url.into());
        Self {
            votes_base_url: origin_of(&base_url),
            base_url,
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000/api".to_string(),
            votes_base_url: "http://localhost:4000".to_string(),
            connect_timeout: Duration::from_millis(1000),
            request_timeout: Duration::from_millis(3000),
            status_dialect: StatusDialect::default(),
        }
    }
}

impl From<&ApiConfig> for ClientConfig {
    fn from(api: &ApiConfig) -> Self {
        let base_url = normalize_base_url(api.base_url.clone());
        let votes_base_url = match &api.votes_base_url {
            Some(url) => normalize_base_url(url.clone()),
            None => origin_of(&base_url),
        };
        Self {
            base_url,
            votes_base_url,
            connect_timeout: api.connect_timeout(),
            request_timeout: api.request_timeout(),
            status_dialect: api.status_dialect,
        }
    }
}

pub(super) fn normalize_base_url(base_url: String) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Scheme, host and port of `base_url`; unparseable URLs are kept as is
pub(super) fn origin_of(base_url: &str) -> String {
    Url::parse(base_url)
        .map(|url| url.origin().ascii_serialization())
        .unwrap_or_else(|_| base_url.to_string())
}
