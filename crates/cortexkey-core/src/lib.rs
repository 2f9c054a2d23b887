//! Cortexkey Core - primitives for deriving keys from EEG
//!
//! This crate holds everything in the key derivation pipeline that does not
//! need an FFT or a filter designer:
//!
//! - [`ChannelBuffer`] - bounded per-channel sample rings with eviction
//! - [`FrequencyBand`] / [`eeg_bands`] - the fixed band table
//! - [`normalize`] / [`quantize`] - global z-score and tolerance grid
//! - [`BrainKey`] - multi-digest expansion to exactly 2048 bytes
//! - [`KeyHistory`] - bounded key log with consistency scoring
//! - [`DerivationParams`] - validated pipeline parameters
//!
//! Spectral analysis lives in `cortexkey-analysis`; the shared engine and
//! feed handling live in `cortexkey-io`.
//!
//! # Example
//!
//! ```rust
//! use cortexkey_core::{BrainKey, FeatureVector, KeyHistory, Tolerance, normalize_and_quantize};
//!
//! let features = FeatureVector::from(vec![1.0, 2.0, 3.0, 4.0]);
//! let quantized = normalize_and_quantize(&features, Tolerance::default());
//! let key = BrainKey::derive(&quantized);
//! assert_eq!(key.as_bytes().len(), 2048);
//!
//! let mut history = KeyHistory::default();
//! history.push(key.clone());
//! history.push(key);
//! assert_eq!(history.consistency(), 100.0);
//! ```

pub mod band;
pub mod buffer;
pub mod error;
pub mod history;
pub mod key;
pub mod params;
pub mod quantize;
pub mod sum;
pub mod vector;

pub use band::{BAND_COUNT, FrequencyBand, band_by_name, eeg_bands};
pub use buffer::{ChannelBuffer, Snapshot};
pub use error::ParamsError;
pub use history::{DEFAULT_CONSISTENCY_WINDOW, DEFAULT_HISTORY_CAPACITY, KeyHistory};
pub use key::{BrainKey, KEY_LEN, PREVIEW_CHARS};
pub use params::{
    DEFAULT_BUFFER_SECS, DEFAULT_CHANNELS, DEFAULT_FILTER_ORDER, DEFAULT_SAMPLE_RATE,
    DerivationParams,
};
pub use quantize::{
    DEFAULT_TOLERANCE_PERCENT, Tolerance, normalize, normalize_and_quantize, quantize, sanitize,
};
pub use sum::pairwise_sum;
pub use vector::{FEATURES_PER_BAND, FeatureVector, QuantizedVector};
