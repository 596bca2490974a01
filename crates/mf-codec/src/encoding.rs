//! # Domain-Separated Preimage Encoding
//!
//! Fixed-width leaf and node preimages. Wrong-width input is unrepresentable:
//! every field arrives as a typed fixed-width value.

use shared_types::{Address, Digest, Selector};

/// Domain-separator byte prefixed to leaf preimages.
pub const LEAF_DOMAIN: u8 = 0x00;

/// Domain-separator byte prefixed to internal-node preimages.
pub const NODE_DOMAIN: u8 = 0x01;

/// Length of the leaf field concatenation without the domain byte.
pub const LEAF_FIELDS_LEN: usize = Selector::LEN + Address::LEN + Digest::LEN;

/// Length of a full leaf preimage: domain byte plus fields.
pub const LEAF_PREIMAGE_LEN: usize = 1 + LEAF_FIELDS_LEN;

/// Length of a full node preimage: domain byte plus two digests.
pub const NODE_PREIMAGE_LEN: usize = 1 + 2 * Digest::LEN;

/// Encodes a route leaf preimage: `0x00 ‖ selector(4) ‖ facet(20) ‖ code_hash(32)`.
#[must_use]
pub fn encode_leaf(selector: Selector, facet: Address, code_hash: Digest) -> [u8; LEAF_PREIMAGE_LEN] {
    let mut out = [0u8; LEAF_PREIMAGE_LEN];
    out[0] = LEAF_DOMAIN;
    out[1..5].copy_from_slice(selector.as_bytes());
    out[5..25].copy_from_slice(facet.as_bytes());
    out[25..57].copy_from_slice(code_hash.as_bytes());
    out
}

/// Encodes the leaf fields without the domain byte:
/// `selector(4) ‖ facet(20) ‖ code_hash(32)`.
///
/// This is the form a verifier receives; it prepends [`LEAF_DOMAIN`] itself.
#[must_use]
pub fn encode_leaf_fields(
    selector: Selector,
    facet: Address,
    code_hash: Digest,
) -> [u8; LEAF_FIELDS_LEN] {
    let mut out = [0u8; LEAF_FIELDS_LEN];
    out[0..4].copy_from_slice(selector.as_bytes());
    out[4..24].copy_from_slice(facet.as_bytes());
    out[24..56].copy_from_slice(code_hash.as_bytes());
    out
}

/// Encodes an internal-node preimage: `0x01 ‖ left(32) ‖ right(32)`.
#[must_use]
pub fn encode_node(left: Digest, right: Digest) -> [u8; NODE_PREIMAGE_LEN] {
    let mut out = [0u8; NODE_PREIMAGE_LEN];
    out[0] = NODE_DOMAIN;
    out[1..33].copy_from_slice(left.as_bytes());
    out[33..65].copy_from_slice(right.as_bytes());
    out
}

// =============================================================================
// TESTS
// =============================================================================
