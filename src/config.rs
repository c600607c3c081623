//! Configuration for ZVFS
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, ZvfsError};

/// Main configuration for a ZVFS container
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Container Configuration
    // -------------------------------------------------------------------------
    /// Host file holding the header, entry table and data region
    pub container_path: PathBuf,

    /// Sync strategy: whether mutations are fsynced before returning
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Compaction Configuration
    // -------------------------------------------------------------------------
    /// Suffix appended to the container path for the rebuild target.
    ///   disk.zvfs  ->  disk.zvfs.tmp
    pub compaction_suffix: String,
}

/// Container sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every mutating operation (safest, slowest)
    EveryWrite,

    /// Leave flushing to the OS (scratch containers, tests)
    Never,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            container_path: PathBuf::from("./disk.zvfs"),
            sync_strategy: SyncStrategy::EveryWrite,
            compaction_suffix: ".tmp".to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Path of the temporary container built during compaction
    pub fn compaction_path(&self) -> PathBuf {
        let mut raw = self.container_path.clone().into_os_string();
        raw.push(&self.compaction_suffix);
        PathBuf::from(raw)
    }

    /// Check settings that would make an operation unsafe
    ///
    /// An empty compaction suffix names the container itself as the rebuild
    /// target.
    pub fn validate(&self) -> Result<()> {
        if self.compaction_suffix.is_empty() {
            return Err(ZvfsError::Config(
                "compaction suffix must not be empty".to_string(),
            ));
        }
        if self.compaction_path() == self.container_path {
            return Err(ZvfsError::Config(format!(
                "compaction target {} is the container itself",
                self.container_path.display()
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the container file path
    pub fn container_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.container_path = path.into();
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the suffix used for the compaction rebuild target
    pub fn compaction_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.compaction_suffix = suffix.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
