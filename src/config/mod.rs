//! Configuration management for the Pemira client.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support (`CONFIG_PATH`)
//! - Environment variable overrides (`PEMIRA__` prefix)
//! - Component-wise validation
mod api;
mod session;
mod ui;
pub use api::*;
pub use session::*;
pub use ui::*;


use std::env;
use std::path::PathBuf;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

const ENV_PREFIX: &str = "PEMIRA";

/// Main configuration container
///
/// Combines all subsystem configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PemiraConfig {
    /// REST backend location and transport tuning
    #[serde(default)]
    pub api: ApiConfig,
    /// Admin credential lifetime and inactivity policy
    #[serde(default)]
    pub session: SessionConfig,
    /// Fixed delays of the presentation layer
    #[serde(default)]
    pub ui: UiConfig,
    /// Directory the binary writes its log file into
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

impl Default for PemiraConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            ui: UiConfig::default(),
            log_dir: default_log_dir(),
        }
    }
}

impl PemiraConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults
    /// 2. Configuration file from `CONFIG_PATH` environment variable (if set)
    /// 3. Environment variables with `PEMIRA__` prefix
    ///
    /// Callers MUST call [`validate()`](Self::validate) before using the result.
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(env_source());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional overrides from a TOML file without validation.
    ///
    /// Environment variables are re-applied on top so they keep the highest
    /// priority.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates every subsystem and returns the validated instance.
    pub fn validate(self) -> Result<Self> {
        self.api.validate()?;
        self.session.validate()?;
        self.ui.validate()?;
        if self.log_dir.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("log_dir cannot be empty".into()));
        }
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("./logs")
}
