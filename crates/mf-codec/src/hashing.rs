//! # Keccak-256 Hashing
//!
//! The single hash function behind every Manifold commitment, plus the
//! leaf/node convenience wrappers and selector derivation.

use crate::encoding::{encode_leaf, encode_node};
use sha3::{Digest as Sha3Digest, Keccak256};
use shared_types::{Address, Digest, Selector};

/// Computes the keccak-256 hash of data.
#[must_use]
pub fn keccak256(data: &[u8]) -> Digest {
    let hash = Keccak256::digest(data);
    Digest::new(hash.into())
}

/// Hashes a route into its leaf digest: `keccak256(0x00 ‖ selector ‖ facet ‖ code_hash)`.
#[must_use]
pub fn hash_leaf(selector: Selector, facet: Address, code_hash: Digest) -> Digest {
    keccak256(&encode_leaf(selector, facet, code_hash))
}

/// Hashes two children into their parent digest: `keccak256(0x01 ‖ left ‖ right)`.
#[must_use]
pub fn hash_node(left: Digest, right: Digest) -> Digest {
    keccak256(&encode_node(left, right))
}

/// Derives a function selector from its signature string.
///
/// The selector is the first 4 bytes of `keccak256(signature)`, e.g.
/// `transfer(address,uint256)`.
#[must_use]
pub fn selector_from_signature(signature: &str) -> Selector {
    let digest = keccak256(signature.as_bytes());
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&digest.as_bytes()[..4]);
    Selector::new(bytes)
}

// =============================================================================
// TESTS
// =============================================================================
