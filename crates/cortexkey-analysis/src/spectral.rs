//! Per-band spectral features.
//!
//! Seven scalars summarize the one-sided magnitude spectrum of a band
//! signal. Their order in [`SpectralFeatures::to_array`] is part of the key
//! format.

use cortexkey_core::{FEATURES_PER_BAND, pairwise_sum};

use crate::error::AnalysisError;
use crate::fft::{Fft, bin_frequencies};

/// Number of lowest bins counted in [`SpectralFeatures::power_ratio`].
pub const LOW_BIN_COUNT: usize = 10;

/// Fraction of total magnitude below the rolloff frequency.
pub const ROLLOFF_FRACTION: f64 = 0.85;

/// Spectral summary of one band signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralFeatures {
    /// Mean bin magnitude.
    pub mean_power: f64,
    /// Frequency of the first maximal bin, in Hz.
    pub peak_freq: f64,
    /// Maximal bin magnitude.
    pub peak_power: f64,
    /// Share of total magnitude in the lowest [`LOW_BIN_COUNT`] bins.
    pub power_ratio: f64,
    /// Magnitude-weighted mean frequency, in Hz.
    pub spectral_centroid: f64,
    /// Lowest frequency where the cumulative magnitude reaches
    /// [`ROLLOFF_FRACTION`] of the total, in Hz.
    pub spectral_rolloff: f64,
    /// Sum of squared differences between adjacent bin magnitudes.
    pub spectral_flux: f64,
}

impl SpectralFeatures {
    /// Feature names in vector order.
    pub const NAMES: [&'static str; FEATURES_PER_BAND] = [
        "mean_power",
        "peak_freq",
        "peak_power",
        "power_ratio",
        "spectral_centroid",
        "spectral_rolloff",
        "spectral_flux",
    ];

    /// Features in vector order.
    pub fn to_array(&self) -> [f64; FEATURES_PER_BAND] {
        [
            self.mean_power,
            self.peak_freq,
            self.peak_power,
            self.power_ratio,
            self.spectral_centroid,
            self.spectral_rolloff,
            self.spectral_flux,
        ]
    }

    /// Compute features from bin magnitudes and their frequencies.
    ///
    /// Both slices must have the same non-zero length. A zero total
    /// magnitude yields a ratio and centroid of zero. NaN magnitudes
    /// propagate into the affected fields. Sums are pairwise; the rolloff
    /// scan is a running left-to-right total.
    pub fn from_magnitudes(freqs: &[f64], mags: &[f64]) -> Self {
        let total = pairwise_sum(mags);
        let peak = argmax(mags);

        let low = pairwise_sum(&mags[..mags.len().min(LOW_BIN_COUNT)]);
        let power_ratio = if total == 0.0 { 0.0 } else { low / total };

        let products: Vec<f64> = freqs.iter().zip(mags).map(|(f, m)| f * m).collect();
        let weighted = pairwise_sum(&products);
        let spectral_centroid = if total == 0.0 {
            0.0
        } else {
            weighted / total
        };

        let steps: Vec<f64> = mags.windows(2).map(|w| (w[1] - w[0]).powi(2)).collect();
        let spectral_flux = pairwise_sum(&steps);

        Self {
            mean_power: total / mags.len() as f64,
            peak_freq: freqs[peak],
            peak_power: mags[peak],
            power_ratio,
            spectral_centroid,
            spectral_rolloff: rolloff(freqs, mags, total),
            spectral_flux,
        }
    }
}

/// Index of the first maximum. A NaN counts as the maximum.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            return i;
        }
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// First frequency whose cumulative magnitude reaches the rolloff
/// threshold, or the last frequency when none does.
fn rolloff(freqs: &[f64], mags: &[f64], total: f64) -> f64 {
    let threshold = ROLLOFF_FRACTION * total;
    let mut cumulative = 0.0;
    for (f, m) in freqs.iter().zip(mags) {
        cumulative += m;
        if cumulative >= threshold {
            return *f;
        }
    }
    freqs.last().copied().unwrap_or(0.0)
}

/// Extracts [`SpectralFeatures`] from fixed-rate signals.
///
/// Holds an FFT plan for the expected signal length; other lengths are
/// planned on demand.
#[derive(Debug)]
pub struct SpectralAnalyzer {
    fft: Fft,
    sample_rate: f64,
}

impl SpectralAnalyzer {
    /// Create an analyzer for signals of `len` samples at `sample_rate` Hz.
    pub fn new(len: usize, sample_rate: f64) -> Self {
        Self {
            fft: Fft::new(len),
            sample_rate,
        }
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Compute the seven features of `signal`.
    ///
    /// Needs at least two samples.
    pub fn analyze(&self, signal: &[f64]) -> Result<SpectralFeatures, AnalysisError> {
        let len = signal.len();
        if len < 2 {
            return Err(AnalysisError::SignalTooShort { len });
        }

        let mags = if len == self.fft.size() {
            self.fft.half_magnitudes(signal)
        } else {
            Fft::new(len).half_magnitudes(signal)
        };
        let freqs = bin_frequencies(len, self.sample_rate);
        Ok(SpectralFeatures::from_magnitudes(&freqs, &mags))
    }
}
