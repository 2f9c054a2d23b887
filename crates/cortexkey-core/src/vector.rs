//! Feature and quantized vectors.

/// Values contributed by every (channel, band) pair.
pub const FEATURES_PER_BAND: usize = 7;

/// Assembled spectral features, channel-major then band then feature.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Create an empty vector sized for `len` values.
    pub fn with_capacity(len: usize) -> Self {
        Self(Vec::with_capacity(len))
    }

    /// Append the values of one (channel, band) pair.
    pub fn extend_from_slice(&mut self, values: &[f64]) {
        self.0.extend_from_slice(values);
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no values have been appended.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the values.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Take ownership of the values.
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Feature values snapped to a tolerance grid; the input of key synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedVector(Vec<f64>);

impl QuantizedVector {
    pub(crate) fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Borrow the grid values.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the vector is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw byte image: each value as little-endian IEEE-754 binary64.
    pub fn to_bytes(&self) -> Vec<u8> {
        values_to_bytes(&self.0)
    }
}

/// Little-endian binary64 image of `values`.
pub(crate) fn values_to_bytes(values: &[f64]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * 8);
    for value in values {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}
