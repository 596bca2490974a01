//! # Ordered Tree Construction
//!
//! Builds the canonical tree over sorted leaf preimages and extracts
//! per-leaf proofs. All levels are retained so proof extraction is a walk,
//! not a rebuild.

use crate::errors::MerkleError;
use crate::proof::MerkleProof;
use mf_codec::{encode_leaf, hash_node, keccak256, LEAF_PREIMAGE_LEN};
use shared_types::{Digest, Route};

/// A deterministic ordered Merkle tree over encoded route leaves.
#[derive(Clone, Debug)]
pub struct OrderedMerkleTree {
    /// Sorted leaf preimages (domain byte included).
    leaves: Vec<[u8; LEAF_PREIMAGE_LEN]>,
    /// Hash levels: `levels[0]` are leaf digests, the last level is the root.
    levels: Vec<Vec<Digest>>,
}

impl OrderedMerkleTree {
    /// Builds the canonical tree for a set of routes.
    ///
    /// Routes are encoded as leaves and sorted by their raw bytes, so the
    /// resulting root is independent of input order.
    pub fn from_routes(routes: &[Route]) -> Result<Self, MerkleError> {
        let leaves = routes
            .iter()
            .map(|r| encode_leaf(r.selector, r.facet, r.code_hash))
            .collect();
        Self::from_leaves(leaves)
    }

    /// Builds the canonical tree from full leaf preimages.
    pub fn from_leaves(mut leaves: Vec<[u8; LEAF_PREIMAGE_LEN]>) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyTree);
        }
        leaves.sort_unstable();
        for (i, pair) in leaves.windows(2).enumerate() {
            if pair[0] == pair[1] {
                return Err(MerkleError::DuplicateLeaf { index: i + 1 });
            }
        }

        let mut levels = Vec::new();
        let mut level: Vec<Digest> = leaves.iter().map(|l| keccak256(l)).collect();
        levels.push(level.clone());

        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(2));
            for chunk in level.chunks(2) {
                let left = chunk[0];
                let right = *chunk.get(1).unwrap_or(&left); // odd node pairs with itself
                next.push(hash_node(left, right));
            }
            levels.push(next.clone());
            level = next;
        }

        Ok(Self { leaves, levels })
    }

    /// The Merkle root.
    #[must_use]
    pub fn root(&self) -> Digest {
        // levels is never empty: from_leaves rejects zero leaves
        self.levels[self.levels.len() - 1][0]
    }

    /// Number of leaves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Returns true if the tree holds no leaves. Construction forbids this;
    /// kept for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Sorted position of a leaf preimage, if present.
    #[must_use]
    pub fn leaf_index(&self, leaf: &[u8; LEAF_PREIMAGE_LEN]) -> Option<usize> {
        self.leaves.binary_search(leaf).ok()
    }

    /// Extracts the proof for the leaf at sorted index `index`.
    ///
    /// At every level the sibling and position bit satisfy: the parent is
    /// `hash(node(sibling, acc))` when the bit is set, `hash(node(acc,
    /// sibling))` otherwise. The final odd node is self-paired and records a
    /// `false` bit with its own digest as the sibling.
    pub fn proof(&self, index: usize) -> Result<MerkleProof, MerkleError> {
        if index >= self.leaves.len() {
            return Err(MerkleError::IndexOutOfRange {
                index,
                len: self.leaves.len(),
            });
        }

        let mut siblings = Vec::new();
        let mut positions = Vec::new();
        let mut i = index;

        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_index = i ^ 1;
            if sibling_index < level.len() {
                siblings.push(level[sibling_index]);
                positions.push(i % 2 == 1);
            } else {
                // Lone odd node: paired with itself, treated as a left child.
                siblings.push(level[i]);
                positions.push(false);
            }
            i /= 2;
        }

        Ok(MerkleProof::new(siblings, positions))
    }

    /// Extracts the proof for a route, if its leaf is in the tree.
    pub fn proof_for_route(&self, route: &Route) -> Result<MerkleProof, MerkleError> {
        let leaf = encode_leaf(route.selector, route.facet, route.code_hash);
        let index = self.leaf_index(&leaf).ok_or(MerkleError::LeafNotFound)?;
        self.proof(index)
    }
}

// =============================================================================
// TESTS
// =============================================================================
