//! # Error Types
//!
//! All error types for manifest construction, serialization, and storage.

use mf_merkle::MerkleError;
use shared_types::Selector;
use thiserror::Error;

/// Errors from manifest building, wire handling, and storage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ManifestError {
    /// A manifest must contain at least one route.
    #[error("empty manifest")]
    EmptyManifest,

    /// The same selector appears in two routes.
    #[error("duplicate selector: {0}")]
    DuplicateSelector(Selector),

    /// A route points at the zero facet address.
    #[error("invalid facet address for selector {0}: zero")]
    InvalidFacetAddress(Selector),

    /// A route carries a zero code hash.
    #[error("invalid code hash for selector {0}: zero")]
    InvalidCodeHash(Selector),

    /// A serialized view could not be produced or parsed.
    #[error("serialization failed: {0}")]
    SerializationFailed(String),

    /// The storage collaborator failed.
    #[error("manifest storage error: {0}")]
    Storage(String),

    /// Merkle construction or verification failed.
    #[error("merkle error: {0}")]
    Merkle(#[from] MerkleError),
}
