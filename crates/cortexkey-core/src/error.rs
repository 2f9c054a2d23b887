//! Error types for derivation parameters.

use thiserror::Error;

/// Errors raised when derivation parameters are out of range.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParamsError {
    /// Tolerance must be finite and strictly positive.
    #[error("tolerance must be a finite percentage > 0, got {0}")]
    InvalidTolerance(f64),

    /// Sample rate must be finite and strictly positive.
    #[error("sample rate must be finite and > 0, got {0}")]
    InvalidSampleRate(f64),

    /// Buffer duration must be finite and strictly positive.
    #[error("buffer duration must be finite and > 0 seconds, got {0}")]
    InvalidDuration(f64),

    /// The buffer would hold fewer samples than a spectrum needs.
    #[error("buffer capacity {capacity} is too small (need at least {minimum} samples)")]
    CapacityTooSmall {
        /// Capacity implied by sample rate and duration.
        capacity: usize,
        /// Smallest usable capacity.
        minimum: usize,
    },

    /// At least one channel is required.
    #[error("channel count must be at least 1")]
    NoChannels,

    /// Filter order must be at least 1.
    #[error("filter order must be at least 1")]
    InvalidFilterOrder,

    /// History capacity or consistency window is zero.
    #[error("history capacity and consistency window must be at least 1")]
    EmptyHistory,
}
