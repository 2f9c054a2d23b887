//! The configuration file model.
//!
//! Every section and every field is optional; missing values take the
//! defaults below.
//!
//! ```toml
//! [processor]
//! sample_rate = 20.0
//! buffer_duration_secs = 2.0
//! num_channels = 8
//! tolerance_percent = 15.0
//! filter_order = 4
//!
//! [history]
//! capacity = 10
//! consistency_window = 5
//!
//! [feed]
//! device_host = "192.168.1.100"
//! log_every = 50
//! queue_capacity = 1024
//! ```

use std::path::{Path, PathBuf};

use cortexkey_core::{
    DEFAULT_BUFFER_SECS, DEFAULT_CHANNELS, DEFAULT_CONSISTENCY_WINDOW, DEFAULT_FILTER_ORDER,
    DEFAULT_HISTORY_CAPACITY, DEFAULT_SAMPLE_RATE, DEFAULT_TOLERANCE_PERCENT, DerivationParams,
    KeyHistory,
};
use serde::{Deserialize, Serialize};

use crate::ConfigError;
use crate::paths;
use crate::validation::Validation;

/// Default acquisition device host.
pub const DEFAULT_DEVICE_HOST: &str = "192.168.1.100";

/// Default number of accepted ticks between progress log lines.
pub const DEFAULT_LOG_EVERY: usize = 50;

/// Default bound of the feed event queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Derivation pipeline parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorSettings {
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Buffer window in seconds.
    pub buffer_duration_secs: f64,
    /// Channels per tick.
    pub num_channels: usize,
    /// Quantization tolerance in percent.
    pub tolerance_percent: f64,
    /// Butterworth prototype order.
    pub filter_order: usize,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            buffer_duration_secs: DEFAULT_BUFFER_SECS,
            num_channels: DEFAULT_CHANNELS,
            tolerance_percent: DEFAULT_TOLERANCE_PERCENT,
            filter_order: DEFAULT_FILTER_ORDER,
        }
    }
}

/// Key history parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Keys retained.
    pub capacity: usize,
    /// Most recent keys compared for consistency.
    pub consistency_window: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
            consistency_window: DEFAULT_CONSISTENCY_WINDOW,
        }
    }
}

/// Ingestion feed parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Host of the acquisition device.
    pub device_host: String,
    /// Accepted ticks between progress log lines.
    pub log_every: usize,
    /// Bound of the feed event queue.
    pub queue_capacity: usize,
}

impl FeedSettings {
    /// Streaming endpoint of the device.
    pub fn device_url(&self) -> String {
        format!("ws://{}/ws", self.device_host)
    }
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            device_host: DEFAULT_DEVICE_HOST.to_string(),
            log_every: DEFAULT_LOG_EVERY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pipeline parameters.
    pub processor: ProcessorSettings,
    /// History parameters.
    pub history: HistorySettings,
    /// Feed parameters.
    pub feed: FeedSettings,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save settings as pretty TOML, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Serialize to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load from `explicit`, else from the user config file if present,
    /// else defaults. Returns the path that was read, if any.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match paths::resolve(explicit) {
            Some(path) => Ok((Self::load(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    /// Validated pipeline parameters.
    pub fn to_params(&self) -> Result<DerivationParams, ConfigError> {
        let p = &self.processor;
        Ok(DerivationParams::new(
            p.sample_rate,
            p.buffer_duration_secs,
            p.num_channels,
            p.tolerance_percent,
            p.filter_order,
        )?)
    }

    /// An empty history sized from the `[history]` section.
    pub fn new_history(&self) -> Result<KeyHistory, ConfigError> {
        Ok(KeyHistory::new(
            self.history.capacity,
            self.history.consistency_window,
        )?)
    }

    /// Check every section and report which bands can be filtered.
    pub fn validate(&self) -> Result<Validation, ConfigError> {
        let params = self.to_params()?;
        self.new_history()?;
        if self.feed.log_every == 0 {
            return Err(ConfigError::InvalidFeed {
                field: "log_every",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.feed.queue_capacity == 0 {
            return Err(ConfigError::InvalidFeed {
                field: "queue_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(Validation::for_params(params))
    }
}
