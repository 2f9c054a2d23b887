//! Configuration for the cortexkey derivation pipeline.
//!
//! Settings live in a single TOML file with `[processor]`, `[history]` and
//! `[feed]` sections. Loading follows a fixed search order: an explicit
//! path, then the user config file, then built-in defaults.
//!
//! # Example
//!
//! ```rust
//! use cortexkey_config::Settings;
//!
//! let settings = Settings::from_toml("[processor]\nsample_rate = 256.0\n").unwrap();
//! let validation = settings.validate().unwrap();
//! assert!(validation.fallback_bands().is_empty());
//! assert_eq!(validation.params.capacity(), 512);
//! ```

mod error;
pub mod paths;
mod settings;
mod validation;

pub use error::ConfigError;
pub use paths::{APP_NAME, CONFIG_FILE, user_config_dir, user_config_file};
pub use settings::{
    DEFAULT_DEVICE_HOST, DEFAULT_LOG_EVERY, DEFAULT_QUEUE_CAPACITY, FeedSettings,
    HistorySettings, ProcessorSettings, Settings,
};
pub use validation::{BandCoverage, FallbackReason, Validation};
