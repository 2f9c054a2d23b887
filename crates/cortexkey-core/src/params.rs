//! Derivation parameters.

use crate::error::ParamsError;
use crate::quantize::Tolerance;

/// Default sample rate of the EEG feed in Hz.
pub const DEFAULT_SAMPLE_RATE: f64 = 20.0;

/// Default analysis window in seconds.
pub const DEFAULT_BUFFER_SECS: f64 = 2.0;

/// Default number of EEG channels.
pub const DEFAULT_CHANNELS: usize = 8;

/// Default Butterworth order of each band-pass filter.
pub const DEFAULT_FILTER_ORDER: usize = 4;

/// Smallest buffer that still yields a non-empty one-sided spectrum.
pub const MIN_CAPACITY: usize = 2;

/// Validated parameters of one derivation pipeline.
///
/// Constructed once per engine; every field feeds into the key, so two
/// engines only reproduce each other's keys with equal parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivationParams {
    sample_rate: f64,
    buffer_duration_secs: f64,
    num_channels: usize,
    tolerance: Tolerance,
    filter_order: usize,
}

impl DerivationParams {
    /// Validate and build a parameter set.
    pub fn new(
        sample_rate: f64,
        buffer_duration_secs: f64,
        num_channels: usize,
        tolerance_percent: f64,
        filter_order: usize,
    ) -> Result<Self, ParamsError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(ParamsError::InvalidSampleRate(sample_rate));
        }
        if !buffer_duration_secs.is_finite() || buffer_duration_secs <= 0.0 {
            return Err(ParamsError::InvalidDuration(buffer_duration_secs));
        }
        if num_channels == 0 {
            return Err(ParamsError::NoChannels);
        }
        if filter_order == 0 {
            return Err(ParamsError::InvalidFilterOrder);
        }
        let tolerance = Tolerance::new(tolerance_percent)?;

        let params = Self {
            sample_rate,
            buffer_duration_secs,
            num_channels,
            tolerance,
            filter_order,
        };
        let capacity = params.capacity();
        if capacity < MIN_CAPACITY {
            return Err(ParamsError::CapacityTooSmall {
                capacity,
                minimum: MIN_CAPACITY,
            });
        }
        Ok(params)
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Analysis window in seconds.
    pub fn buffer_duration_secs(&self) -> f64 {
        self.buffer_duration_secs
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Quantization tolerance.
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Butterworth order.
    pub fn filter_order(&self) -> usize {
        self.filter_order
    }

    /// Samples held per channel: `floor(sample_rate × duration)`.
    pub fn capacity(&self) -> usize {
        (self.sample_rate * self.buffer_duration_secs) as usize
    }

    /// Samples a zero-phase bandpass of this order reflects onto each end
    /// of a window: three times the `2 × order + 1` denominator taps.
    ///
    /// Windows of this length or shorter cannot be bandpass filtered.
    pub fn edge_padding(&self) -> usize {
        3 * (2 * self.filter_order + 1)
    }

    /// True when a full window is longer than [`edge_padding`](Self::edge_padding).
    pub fn window_fits_filter(&self) -> bool {
        self.capacity() > self.edge_padding()
    }

    /// Length of the assembled feature vector.
    pub fn feature_len(&self) -> usize {
        self.num_channels * crate::BAND_COUNT * crate::FEATURES_PER_BAND
    }

    /// Return a copy with a different tolerance.
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl Default for DerivationParams {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            buffer_duration_secs: DEFAULT_BUFFER_SECS,
            num_channels: DEFAULT_CHANNELS,
            tolerance: Tolerance::default(),
            filter_order: DEFAULT_FILTER_ORDER,
        }
    }
}
