//! FFT wrapper for real-valued signals.

use rustfft::{FftPlanner, num_complex::Complex64};
use std::sync::Arc;

/// Forward FFT processor with a cached plan.
pub struct Fft {
    fft: Arc<dyn rustfft::Fft<f64>>,
    size: usize,
}

impl Fft {
    /// Create a new FFT processor for the given size
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        Self { fft, size }
    }

    /// Get FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Full complex spectrum of a real input.
    ///
    /// Input is zero-padded or truncated to the FFT size. No window is
    /// applied.
    pub fn forward(&self, input: &[f64]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = input.iter().map(|&x| Complex64::new(x, 0.0)).collect();
        buffer.resize(self.size, Complex64::new(0.0, 0.0));
        self.fft.process(&mut buffer);
        buffer
    }

    /// Magnitudes of the first `size / 2` bins, DC included.
    ///
    /// The Nyquist bin of an even-length transform is excluded.
    pub fn half_magnitudes(&self, input: &[f64]) -> Vec<f64> {
        let spectrum = self.forward(input);
        spectrum[..self.size / 2].iter().map(|c| c.norm()).collect()
    }
}

impl std::fmt::Debug for Fft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fft").field("size", &self.size).finish()
    }
}

/// Frequency in Hz of each of the first `len / 2` bins of a `len`-point
/// transform at `sample_rate`.
///
/// Bin `k` is `k × (1 / (len × (1 / sample_rate)))`. Going through the
/// sample period can differ in the last bit from `k × sample_rate / len`,
/// as for bin 5 of 37 at 25 Hz.
pub fn bin_frequencies(len: usize, sample_rate: f64) -> Vec<f64> {
    let spacing = 1.0 / (len as f64 * (1.0 / sample_rate));
    (0..len / 2).map(|k| k as f64 * spacing).collect()
}
