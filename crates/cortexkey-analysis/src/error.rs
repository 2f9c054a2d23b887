//! Error types for filtering and spectral analysis.

use thiserror::Error;

/// Why a band filter could not be designed or applied.
///
/// These never reach a key-generation caller: the decomposer substitutes
/// the raw signal for the affected band and records the reason.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FilterError {
    /// Filter order of zero.
    #[error("filter order must be at least 1")]
    InvalidOrder,

    /// Normalized cutoffs outside the open interval (0, 1).
    #[error("normalized cutoffs ({low:.3}, {high:.3}) must lie strictly inside (0, 1)")]
    CutoffOutOfRange {
        /// Lower cutoff as a fraction of Nyquist.
        low: f64,
        /// Upper cutoff as a fraction of Nyquist.
        high: f64,
    },

    /// Lower cutoff not below the upper one.
    #[error("lower cutoff {low:.3} must be below upper cutoff {high:.3}")]
    CutoffOrder {
        /// Lower cutoff as a fraction of Nyquist.
        low: f64,
        /// Upper cutoff as a fraction of Nyquist.
        high: f64,
    },

    /// Empty denominator or a leading denominator coefficient of zero.
    #[error("denominator must be non-empty with a non-zero leading coefficient")]
    InvalidDenominator,

    /// The design produced NaN or infinite coefficients.
    #[error("filter design produced non-finite coefficients")]
    NonFinite,

    /// The signal is not longer than the edge extension.
    #[error("signal of {len} samples must be longer than the {padlen}-sample edge extension")]
    SignalTooShort {
        /// Signal length.
        len: usize,
        /// Required edge extension.
        padlen: usize,
    },

    /// The steady-state initial-condition system has no unique solution.
    #[error("steady-state initial conditions are singular")]
    Singular,
}

/// Errors from spectral feature extraction and assembly.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    /// Too few samples for a one-sided spectrum.
    #[error("signal of {len} samples is too short for a spectrum (need at least 2)")]
    SignalTooShort {
        /// Signal length.
        len: usize,
    },

    /// Snapshot channel count does not match the assembler.
    #[error("snapshot has {got} channels, expected {expected}")]
    ChannelMismatch {
        /// Channels the assembler was built for.
        expected: usize,
        /// Channels in the snapshot.
        got: usize,
    },
}
