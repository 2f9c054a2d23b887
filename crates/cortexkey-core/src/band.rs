//! Frequency band table.
//!
//! The five classical EEG bands, in the fixed order the feature vector is
//! assembled in. The order is part of the key format: reordering the table
//! changes every derived key.

/// A named frequency interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyBand {
    /// Band name, also used in logs and diagnostics.
    pub name: &'static str,
    /// Low edge in Hz.
    pub low_hz: f64,
    /// High edge in Hz.
    pub high_hz: f64,
}

impl FrequencyBand {
    /// Band from `low_hz` to `high_hz`.
    pub const fn new(name: &'static str, low_hz: f64, high_hz: f64) -> Self {
        Self {
            name,
            low_hz,
            high_hz,
        }
    }

    /// Width in Hz.
    pub fn bandwidth(&self) -> f64 {
        self.high_hz - self.low_hz
    }

    /// Cutoffs normalized to the Nyquist frequency of `sample_rate`.
    ///
    /// A band can only be designed as a digital filter when both values lie
    /// strictly inside `(0, 1)`.
    pub fn normalized(&self, sample_rate: f64) -> (f64, f64) {
        let nyquist = sample_rate / 2.0;
        (self.low_hz / nyquist, self.high_hz / nyquist)
    }

    /// Whether the whole band lies strictly below Nyquist for `sample_rate`.
    pub fn below_nyquist(&self, sample_rate: f64) -> bool {
        let (low, high) = self.normalized(sample_rate);
        low > 0.0 && low < high && high < 1.0
    }
}

/// The EEG bands keys are derived from.
pub mod eeg_bands {
    use super::FrequencyBand;

    /// Delta band (0.5-4 Hz) - Deep sleep
    pub const DELTA: FrequencyBand = FrequencyBand::new("delta", 0.5, 4.0);

    /// Theta band (4-8 Hz) - Drowsiness, memory
    pub const THETA: FrequencyBand = FrequencyBand::new("theta", 4.0, 8.0);

    /// Alpha band (8-12 Hz) - Relaxed wakefulness
    pub const ALPHA: FrequencyBand = FrequencyBand::new("alpha", 8.0, 12.0);

    /// Beta band (12-30 Hz) - Active thinking, focus
    pub const BETA: FrequencyBand = FrequencyBand::new("beta", 12.0, 30.0);

    /// Gamma band (30-50 Hz) - Cognitive processing
    pub const GAMMA: FrequencyBand = FrequencyBand::new("gamma", 30.0, 50.0);

    /// All bands in feature-vector order.
    pub const ALL: [FrequencyBand; 5] = [DELTA, THETA, ALPHA, BETA, GAMMA];
}

/// Number of bands every channel is decomposed into.
pub const BAND_COUNT: usize = eeg_bands::ALL.len();

/// Look up a band by name (case-insensitive).
pub fn band_by_name(name: &str) -> Option<FrequencyBand> {
    eeg_bands::ALL
        .iter()
        .copied()
        .find(|b| b.name.eq_ignore_ascii_case(name))
}
