//! Pairwise floating-point summation.
//!
//! Every reduction in the pipeline (normalization statistics and the
//! spectral sums) goes through [`pairwise_sum`] so that the rounding of a
//! sum depends only on the values and their order. Left-to-right and
//! pairwise sums can differ in the last bit, and a feature sitting on a
//! grid boundary turns that bit into a different key.

/// Slices at most this long are summed with eight running accumulators;
/// longer ones are split in two and summed recursively.
pub const BLOCK: usize = 128;

/// Sum `values` with eight interleaved accumulators per block and a
/// binary split above [`BLOCK`].
///
/// Fewer than eight values are added left to right. Within a block, value
/// `i` goes to accumulator `i % 8`, the accumulators are combined as a
/// balanced tree and any tail past the last multiple of eight is added
/// last. Larger slices split at half the length rounded down to a
/// multiple of eight.
pub fn pairwise_sum(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 8 {
        let mut sum = -0.0;
        for v in values {
            sum += v;
        }
        sum
    } else if n <= BLOCK {
        let mut acc = [0.0; 8];
        acc.copy_from_slice(&values[..8]);
        let whole = n - n % 8;
        for chunk in values[8..whole].chunks_exact(8) {
            for (a, v) in acc.iter_mut().zip(chunk) {
                *a += v;
            }
        }
        let mut sum =
            ((acc[0] + acc[1]) + (acc[2] + acc[3])) + ((acc[4] + acc[5]) + (acc[6] + acc[7]));
        for v in &values[whole..] {
            sum += v;
        }
        sum
    } else {
        let mut half = n / 2;
        half -= half % 8;
        pairwise_sum(&values[..half]) + pairwise_sum(&values[half..])
    }
}

/// Arithmetic mean by [`pairwise_sum`]; NaN for an empty slice.
pub fn pairwise_mean(values: &[f64]) -> f64 {
    pairwise_sum(values) / values.len() as f64
}
