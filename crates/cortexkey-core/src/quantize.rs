//! Normalization and tolerance quantization.
//!
//! Small perturbations of the feature vector (sensor noise, slow drift) must
//! collapse onto the same grid point so that two recordings of the same
//! brain state derive the same key. Larger differences land on different
//! grid points.
//!
//! Normalization is one global z-score over the whole vector, not per
//! feature kind. Power, frequency and ratio features share a single mean
//! and standard deviation. Changing that would change every derived key.

use crate::error::ParamsError;
use crate::sum::pairwise_mean;
use crate::vector::{FeatureVector, QuantizedVector};

/// Default tolerance percentage.
pub const DEFAULT_TOLERANCE_PERCENT: f64 = 15.0;

/// Substitute for `+inf` (and `-inf`, negated) during sanitizing.
pub const INFINITY_SENTINEL: f64 = 1e6;

/// Quantization tolerance in percent.
///
/// The grid step in normalized units is `tolerance / 100`; a higher
/// tolerance means a coarser grid and more inputs per key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance(f64);

impl Tolerance {
    /// Validate a tolerance percentage.
    pub fn new(percent: f64) -> Result<Self, ParamsError> {
        if percent.is_finite() && percent > 0.0 {
            Ok(Self(percent))
        } else {
            Err(ParamsError::InvalidTolerance(percent))
        }
    }

    /// The percentage.
    pub fn percent(&self) -> f64 {
        self.0
    }

    /// Grid points per normalized unit: `100 / percent`.
    pub fn scale(&self) -> f64 {
        100.0 / self.0
    }

    /// Grid spacing in normalized units.
    pub fn step(&self) -> f64 {
        1.0 / self.scale()
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self(DEFAULT_TOLERANCE_PERCENT)
    }
}

/// Replace NaN with 0 and infinities with `±1e6`.
pub fn sanitize(values: &mut [f64]) {
    for v in values.iter_mut() {
        if v.is_nan() {
            *v = 0.0;
        } else if *v == f64::INFINITY {
            *v = INFINITY_SENTINEL;
        } else if *v == f64::NEG_INFINITY {
            *v = -INFINITY_SENTINEL;
        }
    }
}

/// Population mean and standard deviation, both reduced with
/// [`pairwise_sum`](crate::sum::pairwise_sum).
fn mean_std(values: &[f64]) -> (f64, f64) {
    let mean = pairwise_mean(values);
    let squares: Vec<f64> = values.iter().map(|v| (v - mean) * (v - mean)).collect();
    (mean, pairwise_mean(&squares).sqrt())
}

/// Sanitize, then z-score the vector against its own mean and deviation.
///
/// With zero deviation the vector is left as sanitized.
pub fn normalize(features: &FeatureVector) -> Vec<f64> {
    let mut values = features.as_slice().to_vec();
    sanitize(&mut values);
    if values.is_empty() {
        return values;
    }

    let (mean, std) = mean_std(&values);
    if std > 0.0 {
        for v in &mut values {
            *v = (*v - mean) / std;
        }
    }
    values
}

/// Snap each value to the tolerance grid.
///
/// Ties round to even, so `0.5` steps go to the even neighbour.
pub fn quantize(values: &[f64], tolerance: Tolerance) -> QuantizedVector {
    let scale = tolerance.scale();
    QuantizedVector::new(
        values
            .iter()
            .map(|v| (v * scale).round_ties_even() / scale)
            .collect(),
    )
}

/// Normalize then quantize.
pub fn normalize_and_quantize(features: &FeatureVector, tolerance: Tolerance) -> QuantizedVector {
    quantize(&normalize(features), tolerance)
}
