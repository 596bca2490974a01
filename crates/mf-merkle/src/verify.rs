//! # Proof Verification
//!
//! Folds a leaf preimage up the sibling path and compares against the root.
//! The caller supplies the leaf fields *without* the domain byte; the
//! verifier prepends `0x00` itself so an attacker can never feed an internal
//! node where a leaf belongs.

use crate::errors::MerkleError;
use crate::proof::MerkleProof;
use mf_codec::{encode_leaf_fields, hash_node, keccak256, LEAF_DOMAIN};
use shared_types::{Digest, Route};

/// Verifies a leaf against a root.
///
/// `leaf_fields` is the leaf preimage without the leading `0x00`. Returns
/// false on a sibling/position length mismatch or a root mismatch.
#[must_use]
pub fn verify_leaf_fields(leaf_fields: &[u8], proof: &MerkleProof, root: Digest) -> bool {
    if !proof.is_consistent() {
        return false;
    }

    let mut preimage = Vec::with_capacity(1 + leaf_fields.len());
    preimage.push(LEAF_DOMAIN);
    preimage.extend_from_slice(leaf_fields);
    let mut acc = keccak256(&preimage);

    for (&sibling, &is_right) in proof.siblings.iter().zip(&proof.positions) {
        acc = if is_right {
            hash_node(sibling, acc)
        } else {
            hash_node(acc, sibling)
        };
    }

    acc == root
}

/// Verifies a route against a root.
#[must_use]
pub fn verify_route(route: &Route, proof: &MerkleProof, root: Digest) -> bool {
    let fields = encode_leaf_fields(route.selector, route.facet, route.code_hash);
    verify_leaf_fields(&fields, proof, root)
}

/// Error-returning variant of [`verify_leaf_fields`] for `?`-style callers.
pub fn check_leaf_fields(
    leaf_fields: &[u8],
    proof: &MerkleProof,
    root: Digest,
) -> Result<(), MerkleError> {
    if verify_leaf_fields(leaf_fields, proof, root) {
        Ok(())
    } else {
        Err(MerkleError::InvalidProof)
    }
}

// =============================================================================
// TESTS
// =============================================================================
