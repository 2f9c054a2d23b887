//! Band decomposition with raw-signal fallback.
//!
//! Filters are designed once per band at construction. A band whose filter
//! cannot be designed (cutoffs at or past Nyquist) or cannot be applied
//! (signal too short for the edge extension) passes the raw signal through
//! instead; the substitution is logged and reported alongside the output.
//!
//! # Example
//!
//! ```rust
//! use cortexkey_analysis::filterbank::BandDecomposer;
//!
//! let decomposer = BandDecomposer::eeg(20.0, 4);
//! let signal: Vec<f64> = (0..40).map(|i| (i as f64 * 0.7).sin()).collect();
//! let bands = decomposer.decompose(&signal);
//!
//! assert_eq!(bands.len(), 5);
//! // Delta and theta fit under the 10 Hz Nyquist; the rest fall back
//! assert!(!bands[0].is_fallback());
//! assert!(bands[2].is_fallback());
//! assert_eq!(bands[2].samples, signal);
//! ```

use cortexkey_core::{FrequencyBand, eeg_bands};

use crate::butterworth::bandpass_for;
use crate::error::FilterError;
use crate::iir::TransferFunction;
use crate::zero_phase::filtfilt;

/// One band's output from [`BandDecomposer::decompose`].
#[derive(Debug, Clone, PartialEq)]
pub struct BandSignal {
    /// The band.
    pub band: FrequencyBand,
    /// Filtered signal, or the raw signal when filtering failed.
    pub samples: Vec<f64>,
    /// Why the raw signal was substituted, if it was.
    pub fallback: Option<FilterError>,
}

impl BandSignal {
    /// Whether the raw signal was substituted.
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Design outcome for one band.
#[derive(Debug, Clone)]
struct BandFilter {
    band: FrequencyBand,
    design: Result<TransferFunction, FilterError>,
}

/// Splits a signal into frequency bands by zero-phase band-pass filtering.
#[derive(Debug, Clone)]
pub struct BandDecomposer {
    filters: Vec<BandFilter>,
    sample_rate: f64,
}

impl BandDecomposer {
    /// Design filters of `order` for each of `bands` at `sample_rate` Hz.
    pub fn new(sample_rate: f64, bands: &[FrequencyBand], order: usize) -> Self {
        let filters = bands
            .iter()
            .map(|band| {
                let design = bandpass_for(band, sample_rate, order);
                if let Err(err) = &design {
                    tracing::warn!(
                        band = band.name,
                        low_hz = band.low_hz,
                        high_hz = band.high_hz,
                        sample_rate,
                        error = %err,
                        "band filter design failed, raw signal will be used"
                    );
                }
                BandFilter { band: *band, design }
            })
            .collect();
        Self {
            filters,
            sample_rate,
        }
    }

    /// Decomposer over the five standard EEG bands.
    pub fn eeg(sample_rate: f64, order: usize) -> Self {
        Self::new(sample_rate, &eeg_bands::ALL, order)
    }

    /// Sample rate the filters were designed for.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Number of bands.
    pub fn num_bands(&self) -> usize {
        self.filters.len()
    }

    /// Bands in output order.
    pub fn bands(&self) -> impl Iterator<Item = &FrequencyBand> {
        self.filters.iter().map(|f| &f.band)
    }

    /// Design result for each band: `None` when the filter exists, the
    /// design error otherwise.
    pub fn coverage(&self) -> Vec<(FrequencyBand, Option<FilterError>)> {
        self.filters
            .iter()
            .map(|f| (f.band, f.design.as_ref().err().cloned()))
            .collect()
    }

    /// Filter `signal` through every band, in band order.
    pub fn decompose(&self, signal: &[f64]) -> Vec<BandSignal> {
        self.filters
            .iter()
            .map(|filter| {
                let result = match &filter.design {
                    Ok(tf) => filtfilt(tf, signal),
                    Err(err) => Err(err.clone()),
                };
                match result {
                    Ok(samples) => BandSignal {
                        band: filter.band,
                        samples,
                        fallback: None,
                    },
                    Err(err) => {
                        if filter.design.is_ok() {
                            tracing::warn!(
                                band = filter.band.name,
                                len = signal.len(),
                                error = %err,
                                "band filtering failed, using raw signal"
                            );
                        }
                        BandSignal {
                            band: filter.band,
                            samples: signal.to_vec(),
                            fallback: Some(err),
                        }
                    }
                }
            })
            .collect()
    }
}
