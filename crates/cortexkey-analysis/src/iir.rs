//! IIR transfer functions in polynomial form.
//!
//! `H(z) = (b[0] + b[1] z^-1 + ...) / (a[0] + a[1] z^-1 + ...)`, applied in
//! transposed direct form II.

use crate::error::FilterError;

/// Numerator and denominator coefficients, normalized so `a[0] == 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl TransferFunction {
    /// Build from raw coefficients.
    ///
    /// Leading zeros of `a` are stripped, both polynomials are divided by
    /// `a[0]` and padded to the same length.
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Result<Self, FilterError> {
        let leading = a.iter().position(|&c| c != 0.0);
        let Some(leading) = leading else {
            return Err(FilterError::InvalidDenominator);
        };
        if b.is_empty() {
            return Err(FilterError::InvalidDenominator);
        }
        let a = &a[leading..];
        let a0 = a[0];

        let n = a.len().max(b.len());
        let mut b: Vec<f64> = b.iter().map(|c| c / a0).collect();
        let mut a: Vec<f64> = a.iter().map(|c| c / a0).collect();
        b.resize(n, 0.0);
        a.resize(n, 0.0);

        if b.iter().chain(&a).any(|c| !c.is_finite()) {
            return Err(FilterError::NonFinite);
        }
        Ok(Self { b, a })
    }

    /// Numerator coefficients.
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Denominator coefficients (`a[0] == 1`).
    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// Number of coefficients in each polynomial.
    pub fn len(&self) -> usize {
        self.a.len()
    }

    /// Always false; a transfer function has at least one coefficient.
    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    /// Filter `input` starting from delay state `state` (`len() - 1` values).
    ///
    /// Missing state entries are treated as zero.
    pub fn filter(&self, input: &[f64], state: &[f64]) -> Vec<f64> {
        let n = self.len();
        let b = &self.b;
        let a = &self.a;

        if n == 1 {
            return input.iter().map(|x| x * b[0]).collect();
        }

        let mut z = vec![0.0; n - 1];
        for (dst, src) in z.iter_mut().zip(state) {
            *dst = *src;
        }

        let mut output = Vec::with_capacity(input.len());
        for &x in input {
            let y = z[0] + b[0] * x;
            for k in 0..n - 2 {
                z[k] = z[k + 1] + x * b[k + 1] - y * a[k + 1];
            }
            z[n - 2] = x * b[n - 1] - y * a[n - 1];
            output.push(y);
        }
        output
    }

    /// Delay state for which a unit step input produces a unit-step-scaled
    /// steady output from the first sample.
    ///
    /// Solves `(I - A) zi = B` where `A` is the transposed companion matrix
    /// of the denominator and `B = b[1..] - a[1..] * b[0]`.
    pub fn steady_state(&self) -> Result<Vec<f64>, FilterError> {
        let n = self.len();
        if n < 2 {
            return Ok(Vec::new());
        }
        let m = n - 1;

        let mut system = vec![vec![0.0; m]; m];
        for (r, row) in system.iter_mut().enumerate() {
            row[r] = 1.0;
            row[0] += self.a[r + 1];
            if r + 1 < m {
                row[r + 1] -= 1.0;
            }
        }
        let rhs: Vec<f64> = (1..n).map(|i| self.b[i] - self.a[i] * self.b[0]).collect();

        solve_linear(system, rhs).ok_or(FilterError::Singular)
    }
}

/// Solve a dense linear system by Gaussian elimination with partial pivoting.
fn solve_linear(mut m: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Option<Vec<f64>> {
    let n = rhs.len();

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| m[i][col].abs().total_cmp(&m[j][col].abs()))?;
        if m[pivot][col] == 0.0 || !m[pivot][col].is_finite() {
            return None;
        }
        m.swap(col, pivot);
        rhs.swap(col, pivot);

        let pivot_row = m[col].clone();
        let pivot_rhs = rhs[col];
        for row in col + 1..n {
            let factor = m[row][col] / pivot_row[col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                m[row][k] -= factor * pivot_row[k];
            }
            rhs[row] -= factor * pivot_rhs;
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| m[row][k] * x[k]).sum();
        x[row] = (rhs[row] - tail) / m[row][row];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}
