//! # Routes and Counters
//!
//! The `Route` triple and the scalar counters used by the dispatcher
//! lifecycle.

use crate::primitives::{Address, Digest, Selector};
use serde::{Deserialize, Serialize};

/// Manifest generation counter. Strictly increases at each activation.
pub type Epoch = u64;

/// Seconds since the epoch-0 reference.
pub type Timestamp = u64;

/// A routing assertion: calls to `selector` forward to `facet`, and `facet`'s
/// runtime code hash must equal `code_hash`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    /// Function selector being routed.
    pub selector: Selector,
    /// Facet implementing the selector.
    pub facet: Address,
    /// Pinned runtime code hash of the facet.
    pub code_hash: Digest,
}

impl Route {
    /// Creates a new route.
    #[must_use]
    pub const fn new(selector: Selector, facet: Address, code_hash: Digest) -> Self {
        Self {
            selector,
            facet,
            code_hash,
        }
    }
}
