//! # Codec - Canonical Encoding & Hashing
//!
//! Binary encoders and the keccak-256 hasher behind every commitment in
//! Manifold. All layouts are bit-exact and big-endian:
//!
//! | Preimage | Layout | Length |
//! |----------|--------|--------|
//! | Leaf | `0x00 ‖ selector(4) ‖ facet(20) ‖ code_hash(32)` | 57 |
//! | Node | `0x01 ‖ left(32) ‖ right(32)` | 65 |
//!
//! The domain-separator bytes prevent second-preimage confusion between leaf
//! and internal-node encodings.
//!
//! Pure functions only: no I/O, no async, deterministic on every platform.

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod encoding;
pub mod hashing;
pub mod packed;

pub use encoding::{
    encode_leaf, encode_leaf_fields, encode_node, LEAF_DOMAIN, LEAF_FIELDS_LEN, LEAF_PREIMAGE_LEN,
    NODE_DOMAIN, NODE_PREIMAGE_LEN,
};
pub use hashing::{hash_leaf, hash_node, keccak256, selector_from_signature};
pub use packed::PackedEncoder;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
