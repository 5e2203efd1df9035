use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UiConfig {
    /// Delay before leaving the ballot screen after a vote or an
    /// "already voted" answer
    #[serde(default = "default_redirect_delay")]
    pub redirect_delay_in_ms: u64,

    /// Delay before leaving the logout screen
    #[serde(default = "default_logout_redirect_delay")]
    pub logout_redirect_delay_in_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            redirect_delay_in_ms: default_redirect_delay(),
            logout_redirect_delay_in_ms: default_logout_redirect_delay(),
        }
    }
}

impl UiConfig {
    pub fn validate(&self) -> Result<()> {
        if self.redirect_delay_in_ms == 0 {
            return Err(Error::InvalidConfig("ui.redirect_delay_in_ms must be > 0".into()));
        }
        Ok(())
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_in_ms)
    }

    pub fn logout_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.logout_redirect_delay_in_ms)
    }
}

fn default_redirect_delay() -> u64 {
    3000
}
fn default_logout_redirect_delay() -> u64 {
    2000
}
