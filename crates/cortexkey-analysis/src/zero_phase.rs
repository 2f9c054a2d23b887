//! Zero-phase (forward-backward) filtering.
//!
//! The signal is extended at both ends by odd reflection, filtered forward
//! from steady-state initial conditions, filtered again in reverse, and the
//! extension is cut off. The result has no phase shift and the squared
//! magnitude response of the filter.

use crate::error::FilterError;
use crate::iir::TransferFunction;

/// Edge extension used for `tf`: three times its coefficient count.
pub fn default_padlen(tf: &TransferFunction) -> usize {
    3 * tf.len()
}

/// Extend `signal` by `padlen` samples on each side, reflecting through the
/// end points (`2 * x[0] - x[i]` on the left, `2 * x[n-1] - x[n-1-i]` on the
/// right).
///
/// Requires `padlen < signal.len()`.
pub fn odd_extend(signal: &[f64], padlen: usize) -> Vec<f64> {
    let n = signal.len();
    if padlen == 0 || n == 0 {
        return signal.to_vec();
    }
    let first = signal[0];
    let last = signal[n - 1];

    let mut out = Vec::with_capacity(n + 2 * padlen);
    out.extend((1..=padlen).rev().map(|i| 2.0 * first - signal[i]));
    out.extend_from_slice(signal);
    out.extend((1..=padlen).map(|i| 2.0 * last - signal[n - 1 - i]));
    out
}

/// Apply `tf` forward and backward with the default edge extension.
///
/// Fails when the signal is not longer than the extension or the
/// steady-state system is singular.
pub fn filtfilt(tf: &TransferFunction, signal: &[f64]) -> Result<Vec<f64>, FilterError> {
    let padlen = default_padlen(tf);
    if signal.len() <= padlen {
        return Err(FilterError::SignalTooShort {
            len: signal.len(),
            padlen,
        });
    }

    let zi = tf.steady_state()?;
    let extended = odd_extend(signal, padlen);

    let start = extended[0];
    let state: Vec<f64> = zi.iter().map(|z| z * start).collect();
    let mut forward = tf.filter(&extended, &state);

    forward.reverse();
    let start = forward[0];
    let state: Vec<f64> = zi.iter().map(|z| z * start).collect();
    let mut backward = tf.filter(&forward, &state);
    backward.reverse();

    let end = backward.len() - padlen;
    Ok(backward[padlen..end].to_vec())
}
