use std::path::Path;
use std::time::Duration;

use schemalift_accessor::AccessorOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("can't read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("can't encode settings: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// On-disk form of [`AccessorOptions`]. Durations are whole seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub heartbeat_interval_secs: u64,
    pub ddl_deadline_secs: u64,
    pub max_workers: usize,
    pub dispatch_interval_secs: u64,
    pub fk_warning_threshold: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let options = AccessorOptions::default();
        Self {
            heartbeat_interval_secs: options.heartbeat_interval.as_secs(),
            ddl_deadline_secs: options.ddl_deadline.as_secs(),
            max_workers: options.max_workers,
            dispatch_interval_secs: options.dispatch_interval.as_secs(),
            fk_warning_threshold: options.fk_warning_threshold,
        }
    }
}

impl Settings {
    /// Read `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn into_options(self) -> AccessorOptions {
        AccessorOptions {
            heartbeat_interval: Duration::from_secs(self.heartbeat_interval_secs),
            ddl_deadline: Duration::from_secs(self.ddl_deadline_secs),
            max_workers: self.max_workers,
            dispatch_interval: Duration::from_secs(self.dispatch_interval_secs),
            fk_warning_threshold: self.fk_warning_threshold,
        }
    }
}
