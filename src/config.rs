//! Configuration for durakv
//!
//! Centralized configuration with sensible defaults. The log path is the
//! explicit construction-time value the Store derives all of its resources
//! from; nothing is read from process-wide state.

use std::path::PathBuf;

/// Main configuration for a durakv Store instance
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the append-only write-ahead log file.
    /// Created on first open if it does not exist.
    pub log_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("./durakv.log"),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the write-ahead log path
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log_path = path.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
