//! # Tightly-Packed Encoding
//!
//! The packed byte builder behind salt derivation. Fields are concatenated
//! with no length prefixes and no padding beyond their fixed widths:
//!
//! - strings: raw UTF-8 bytes
//! - addresses: 20 bytes
//! - digests: 32 bytes
//! - selectors: 4 bytes
//! - unsigned integers: 32-byte big-endian
//!
//! Ambiguous input is unrepresentable: the builder only accepts typed fields,
//! so a variable-length blob without a fixed width cannot reach the hash.

use crate::hashing::keccak256;
use shared_types::{Address, Digest, Selector};

/// Builder for tightly-packed preimages.
///
/// ```
/// use mf_codec::PackedEncoder;
/// use shared_types::Address;
///
/// let salt = PackedEncoder::new()
///     .str("manifold")
///     .address(Address::new([0x11; 20]))
///     .uint(7)
///     .hash();
/// ```
#[derive(Clone, Debug, Default)]
pub struct PackedEncoder {
    buf: Vec<u8>,
}

impl PackedEncoder {
    /// Creates an empty encoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a string as raw UTF-8 bytes.
    #[must_use]
    pub fn str(mut self, s: &str) -> Self {
        self.buf.extend_from_slice(s.as_bytes());
        self
    }

    /// Appends a 20-byte address.
    #[must_use]
    pub fn address(mut self, address: Address) -> Self {
        self.buf.extend_from_slice(address.as_bytes());
        self
    }

    /// Appends a 32-byte digest.
    #[must_use]
    pub fn digest(mut self, digest: Digest) -> Self {
        self.buf.extend_from_slice(digest.as_bytes());
        self
    }

    /// Appends a 4-byte selector.
    #[must_use]
    pub fn selector(mut self, selector: Selector) -> Self {
        self.buf.extend_from_slice(selector.as_bytes());
        self
    }

    /// Appends an unsigned integer as a 32-byte big-endian word.
    #[must_use]
    pub fn uint(mut self, value: u64) -> Self {
        let mut word = [0u8; 32];
        word[24..32].copy_from_slice(&value.to_be_bytes());
        self.buf.extend_from_slice(&word);
        self
    }

    /// Returns the packed bytes.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    /// Hashes the packed bytes with keccak-256.
    #[must_use]
    pub fn hash(self) -> Digest {
        keccak256(&self.buf)
    }

    /// Current packed length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if nothing has been packed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
