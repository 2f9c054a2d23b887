//! Key synthesis.
//!
//! A quantized vector is expanded into exactly [`KEY_LEN`] bytes by
//! concatenating several digests of its byte image:
//!
//! ```text
//! SHA-256(all) | MD5(all) | SHA-1(all) | SHA-512(all) | BLAKE2b-256(all)
//!   | SHA-256(slice 0) | SHA-256(slice 1) | ...        (10 values per slice)
//!   | SHA-256(buffer so far) ...                       (until >= 2048 bytes)
//! ```
//!
//! The result is truncated to 2048 bytes. Digest family, digest order, slice
//! width and byte encoding are all part of the key format; changing any of
//! them changes every key.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use blake2::Blake2b;
use blake2::digest::consts::U32;
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;

use crate::vector::{QuantizedVector, values_to_bytes};

/// Raw key length in bytes.
pub const KEY_LEN: usize = 2048;

/// Values per slice digest.
pub const SLICE_WIDTH: usize = 10;

/// Characters shown by [`BrainKey::preview`].
pub const PREVIEW_CHARS: usize = 32;

type Blake2b256 = Blake2b<U32>;

/// A derived key: exactly [`KEY_LEN`] bytes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BrainKey(Box<[u8]>);

impl BrainKey {
    /// Derive a key from a quantized feature vector.
    pub fn derive(vector: &QuantizedVector) -> Self {
        Self::derive_from_values(vector.as_slice())
    }

    fn derive_from_values(values: &[f64]) -> Self {
        let bytes = values_to_bytes(values);
        let mut out = Vec::with_capacity(KEY_LEN + 64);

        out.extend_from_slice(&Sha256::digest(&bytes));
        out.extend_from_slice(&Md5::digest(&bytes));
        out.extend_from_slice(&Sha1::digest(&bytes));
        out.extend_from_slice(&Sha512::digest(&bytes)[..64]);
        out.extend_from_slice(&Blake2b256::digest(&bytes));

        for slice in values.chunks(SLICE_WIDTH) {
            out.extend_from_slice(&Sha256::digest(values_to_bytes(slice)));
        }

        while out.len() < KEY_LEN {
            let next = Sha256::digest(&out);
            out.extend_from_slice(&next);
        }
        out.truncate(KEY_LEN);

        #[cfg(feature = "tracing")]
        tracing::trace!(values = values.len(), "key synthesized");

        Self(out.into_boxed_slice())
    }

    /// Wrap raw bytes, rejecting anything that is not [`KEY_LEN`] long.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        (bytes.len() == KEY_LEN).then(|| Self(bytes.into()))
    }

    /// Decode a base64 transport encoding.
    pub fn from_base64(text: &str) -> Option<Self> {
        STANDARD
            .decode(text)
            .ok()
            .and_then(|bytes| Self::from_bytes(&bytes))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Standard padded base64 encoding, as sent to callers.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    /// First [`PREVIEW_CHARS`] characters of the base64 encoding.
    pub fn preview(&self) -> String {
        let mut text = self.to_base64();
        text.truncate(PREVIEW_CHARS);
        text
    }
}

impl fmt::Debug for BrainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BrainKey({}...)", self.preview())
    }
}

impl fmt::Display for BrainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}
