//! Content hashing for output file names.
//!
//! Chunk and asset names carry a fingerprint of their bytes, so identical
//! content always lands at the same path and changed content never reuses an
//! old name.
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let fp = hash::fingerprint(b"body{color:red}"); // -> "1f0c8a2e"
//! ```

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hash a byte slice.
    #[inline]
    pub fn of<T: AsRef<[u8]> + ?Sized>(data: &T) -> Self {
        Self(*blake3::hash(data.as_ref()).as_bytes())
    }

    /// Convert to hex string.
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

/// Length of the fingerprint embedded in file names.
pub const FINGERPRINT_LEN: usize = 8;

/// Compute hash and return as 8-char hex fingerprint.
///
/// Used for content-derived file names (e.g. `style-a1b2c3d4.css`).
#[inline]
pub fn fingerprint<T: AsRef<[u8]> + ?Sized>(value: &T) -> String {
    let mut hex = ContentHash::of(value).to_hex();
    hex.truncate(FINGERPRINT_LEN);
    hex
}
