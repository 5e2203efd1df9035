use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Admin credential lifetime
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionConfig {
    /// Hard expiry of a login, counted from the moment it was issued
    /// Default: 7 days
    #[serde(default = "default_token_ttl")]
    pub token_ttl_in_secs: u64,

    /// Credentials are dropped after this long without user activity
    /// Default: 30 minutes
    #[serde(default = "default_inactivity_timeout")]
    pub inactivity_timeout_in_secs: u64,

    /// How often the inactivity watchdog wakes up
    /// Default: 60 seconds
    #[serde(default = "default_activity_check_interval")]
    pub activity_check_interval_in_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_ttl_in_secs: default_token_ttl(),
            inactivity_timeout_in_secs: default_inactivity_timeout(),
            activity_check_interval_in_secs: default_activity_check_interval(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.inactivity_timeout_in_secs == 0 {
            return Err(Error::InvalidConfig(
                "session.inactivity_timeout_in_secs must be > 0".into(),
            ));
        }
        if self.inactivity_timeout_in_secs >= self.token_ttl_in_secs {
            return Err(Error::InvalidConfig(format!(
                "session inactivity timeout {}s must be shorter than token ttl {}s",
                self.inactivity_timeout_in_secs, self.token_ttl_in_secs
            )));
        }
        if self.activity_check_interval_in_secs == 0 {
            return Err(Error::InvalidConfig(
                "session.activity_check_interval_in_secs must be > 0".into(),
            ));
        }
        Ok(())
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_in_secs)
    }

    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout_in_secs)
    }

    pub fn activity_check_interval(&self) -> Duration {
        Duration::from_secs(self.activity_check_interval_in_secs)
    }
}

fn default_token_ttl() -> u64 {
    7 * 24 * 60 * 60
}
fn default_inactivity_timeout() -> u64 {
    30 * 60
}
fn default_activity_check_interval() -> u64 {
    60
}
