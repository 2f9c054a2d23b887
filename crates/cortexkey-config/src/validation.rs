//! Band coverage diagnostics.
//!
//! A band can only be filtered when its cutoffs sit strictly inside the
//! Nyquist interval of the configured sample rate and the window is longer
//! than the filter's edge extension. Bands that fail either test are still
//! part of the feature vector, computed from the raw signal.

use std::fmt;

use cortexkey_core::{DerivationParams, FrequencyBand, eeg_bands};

/// Why a band will use the raw signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The upper cutoff is at or above Nyquist.
    AboveNyquist,
    /// The window is not longer than the edge extension.
    WindowTooShort {
        /// Samples per window.
        window: usize,
        /// Edge extension for the configured order.
        padding: usize,
    },
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AboveNyquist => f.write_str("above Nyquist"),
            Self::WindowTooShort { window, padding } => {
                write!(f, "window of {window} needs more than {padding} samples")
            }
        }
    }
}

/// How one band will be handled at the configured rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandCoverage {
    /// The band.
    pub band: FrequencyBand,
    /// Cutoffs as a fraction of Nyquist.
    pub normalized: (f64, f64),
    /// False when the raw signal will stand in for this band.
    pub filtered: bool,
    /// Set exactly when `filtered` is false.
    pub fallback: Option<FallbackReason>,
}

/// Result of [`Settings::validate`](crate::Settings::validate).
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    /// The validated parameters.
    pub params: DerivationParams,
    /// One entry per band, in feature order.
    pub coverage: Vec<BandCoverage>,
}

impl Validation {
    /// Coverage of the standard band table for `params`.
    pub fn for_params(params: DerivationParams) -> Self {
        let sample_rate = params.sample_rate();
        let coverage = eeg_bands::ALL
            .iter()
            .map(|band| {
                let fallback = if !band.below_nyquist(sample_rate) {
                    Some(FallbackReason::AboveNyquist)
                } else if !params.window_fits_filter() {
                    Some(FallbackReason::WindowTooShort {
                        window: params.capacity(),
                        padding: params.edge_padding(),
                    })
                } else {
                    None
                };
                BandCoverage {
                    band: *band,
                    normalized: band.normalized(sample_rate),
                    filtered: fallback.is_none(),
                    fallback,
                }
            })
            .collect();
        Self { params, coverage }
    }

    /// Names of bands that will use the raw signal.
    pub fn fallback_bands(&self) -> Vec<&'static str> {
        self.coverage
            .iter()
            .filter(|c| !c.filtered)
            .map(|c| c.band.name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rate_falls_back_on_upper_bands() {
        let v = Validation::for_params(DerivationParams::default());
        assert_eq!(v.fallback_bands(), ["alpha", "beta", "gamma"]);
        assert_eq!(v.coverage.len(), 5);
        assert!((v.coverage[0].normalized.0 - 0.05).abs() < 1e-12);
        assert_eq!(v.coverage[0].fallback, None);
        assert_eq!(v.coverage[2].fallback, Some(FallbackReason::AboveNyquist));
    }

    #[test]
    fn test_high_rate_filters_everything() {
        let params = DerivationParams::new(256.0, 2.0, 8, 15.0, 4).unwrap();
        assert!(Validation::for_params(params).fallback_bands().is_empty());
    }

    #[test]
    fn test_short_window_falls_back_on_every_band() {
        // 20 samples cannot cover the 27-sample edge extension
        let params = DerivationParams::new(20.0, 1.0, 8, 15.0, 4).unwrap();
        let v = Validation::for_params(params);
        assert_eq!(
            v.fallback_bands(),
            ["delta", "theta", "alpha", "beta", "gamma"]
        );
        assert_eq!(
            v.coverage[0].fallback,
            Some(FallbackReason::WindowTooShort {
                window: 20,
                padding: 27
            })
        );
        assert_eq!(v.coverage[4].fallback, Some(FallbackReason::AboveNyquist));
    }

    #[test]
    fn test_lower_order_fits_short_window() {
        let params = DerivationParams::new(20.0, 1.0, 8, 15.0, 2).unwrap();
        assert_eq!(
            Validation::for_params(params).fallback_bands(),
            ["alpha", "beta", "gamma"]
        );
    }

    #[test]
    fn test_reason_display() {
        let reason = FallbackReason::WindowTooShort {
            window: 20,
            padding: 27,
        };
        assert_eq!(reason.to_string(), "window of 20 needs more than 27 samples");
        assert_eq!(FallbackReason::AboveNyquist.to_string(), "above Nyquist");
    }
}
