//! Butterworth band-pass design.
//!
//! Classical zero-pole-gain route: analog low-pass prototype, band-pass
//! transform around pre-warped cutoffs, bilinear transform, then expansion
//! into polynomial coefficients. The digital filter has `2 * order` poles.

use std::f64::consts::PI;

use cortexkey_core::FrequencyBand;
use rustfft::num_complex::Complex64;

use crate::error::FilterError;
use crate::iir::TransferFunction;

/// Sampling frequency of the normalized design domain (Nyquist = 1).
const DESIGN_FS: f64 = 2.0;

/// Design a band-pass Butterworth filter.
///
/// `low` and `high` are cutoffs normalized to Nyquist and must satisfy
/// `0 < low < high < 1`.
pub fn bandpass(order: usize, low: f64, high: f64) -> Result<TransferFunction, FilterError> {
    if order == 0 {
        return Err(FilterError::InvalidOrder);
    }
    let inside = |w: f64| w.is_finite() && w > 0.0 && w < 1.0;
    if !inside(low) || !inside(high) {
        return Err(FilterError::CutoffOutOfRange { low, high });
    }
    if low >= high {
        return Err(FilterError::CutoffOrder { low, high });
    }

    let warped_low = prewarp(low);
    let warped_high = prewarp(high);
    let bandwidth = warped_high - warped_low;
    let center = (warped_low * warped_high).sqrt();

    let (zeros, poles, gain) = lowpass_to_bandpass(&prototype_poles(order), center, bandwidth);
    let (zeros, poles, gain) = bilinear(&zeros, &poles, gain);

    let b: Vec<f64> = poly(&zeros).iter().map(|c| c.re * gain).collect();
    let a: Vec<f64> = poly(&poles).iter().map(|c| c.re).collect();
    TransferFunction::new(b, a)
}

/// Design the band-pass filter for `band` at `sample_rate`.
pub fn bandpass_for(
    band: &FrequencyBand,
    sample_rate: f64,
    order: usize,
) -> Result<TransferFunction, FilterError> {
    let (low, high) = band.normalized(sample_rate);
    bandpass(order, low, high)
}

/// Poles of the unit-cutoff analog Butterworth low-pass (gain 1, no zeros).
fn prototype_poles(order: usize) -> Vec<Complex64> {
    let n = order as f64;
    (0..order)
        .map(|i| {
            let m = -n + 1.0 + 2.0 * i as f64;
            -Complex64::new(0.0, PI * m / (2.0 * n)).exp()
        })
        .collect()
}

fn prewarp(w: f64) -> f64 {
    2.0 * DESIGN_FS * (PI * w / DESIGN_FS).tan()
}

/// Analog low-pass to band-pass. Each pole splits into a pair; `order`
/// zeros land at the origin.
fn lowpass_to_bandpass(
    poles: &[Complex64],
    center: f64,
    bandwidth: f64,
) -> (Vec<Complex64>, Vec<Complex64>, f64) {
    let scaled: Vec<Complex64> = poles.iter().map(|&p| p * (bandwidth / 2.0)).collect();
    let offsets: Vec<Complex64> = scaled
        .iter()
        .map(|&p| (p * p - center * center).sqrt())
        .collect();

    let mut out = Vec::with_capacity(2 * poles.len());
    out.extend(scaled.iter().zip(&offsets).map(|(&p, &d)| p + d));
    out.extend(scaled.iter().zip(&offsets).map(|(&p, &d)| p - d));

    let zeros = vec![Complex64::new(0.0, 0.0); poles.len()];
    let gain = bandwidth.powi(poles.len() as i32);
    (zeros, out, gain)
}

/// Bilinear transform to the z-plane. Zeros at infinity map to `z = -1`.
fn bilinear(
    zeros: &[Complex64],
    poles: &[Complex64],
    gain: f64,
) -> (Vec<Complex64>, Vec<Complex64>, f64) {
    let fs2 = 2.0 * DESIGN_FS;
    let map = |s: Complex64| (fs2 + s) / (fs2 - s);

    let mut z_zeros: Vec<Complex64> = zeros.iter().map(|&z| map(z)).collect();
    let z_poles: Vec<Complex64> = poles.iter().map(|&p| map(p)).collect();
    z_zeros.extend(std::iter::repeat_n(
        Complex64::new(-1.0, 0.0),
        poles.len() - zeros.len(),
    ));

    let num: Complex64 = zeros.iter().map(|&z| fs2 - z).product();
    let den: Complex64 = poles.iter().map(|&p| fs2 - p).product();
    (z_zeros, z_poles, gain * (num / den).re)
}

/// Monic polynomial with the given roots, highest power first.
fn poly(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for &root in roots {
        let mut next = vec![Complex64::new(0.0, 0.0); coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * root;
        }
        coeffs = next;
    }
    coeffs
}
