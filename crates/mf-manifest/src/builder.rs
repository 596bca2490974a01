//! # Manifest Builder
//!
//! Validates a set of routes, builds the canonical tree, and emits the
//! manifest document with one proof per route. Routes come out in canonical
//! (leaf-sorted) order whatever order they went in.

use crate::errors::ManifestError;
use mf_merkle::{verify_route, MerkleProof, OrderedMerkleTree};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Digest, Route, Selector};
use std::collections::HashSet;

/// A route plus its inclusion proof, as carried by a manifest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRoute {
    /// Function selector being routed.
    pub selector: Selector,
    /// Facet implementing the selector.
    pub facet: Address,
    /// Pinned runtime code hash of the facet.
    pub code_hash: Digest,
    /// Inclusion proof against the manifest root.
    pub proof: MerkleProof,
}

impl ManifestRoute {
    /// The bare route triple without the proof.
    #[must_use]
    pub fn route(&self) -> Route {
        Route::new(self.selector, self.facet, self.code_hash)
    }
}

/// A canonical, verifiable route manifest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest version string.
    pub version: String,
    /// Routes in canonical (leaf-sorted) order, each with its proof.
    pub routes: Vec<ManifestRoute>,
    /// Merkle root over the canonical leaf sequence.
    pub root: Digest,
}

impl Manifest {
    /// Verifies the whole document: selectors unique, every proof checks
    /// against the root.
    #[must_use]
    pub fn verify(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.routes.len());
        for entry in &self.routes {
            if !seen.insert(entry.selector) {
                return false;
            }
            if !verify_route(&entry.route(), &entry.proof, self.root) {
                return false;
            }
        }
        !self.routes.is_empty()
    }

    /// Serializes the descriptive (JSON) view.
    pub fn to_descriptive(&self) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ManifestError::SerializationFailed(e.to_string()))
    }

    /// Parses the descriptive (JSON) view.
    pub fn from_descriptive(json: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(json).map_err(|e| ManifestError::SerializationFailed(e.to_string()))
    }
}

/// Builder assembling a manifest from `(selector, facet, code_hash)` routes.
#[derive(Clone, Debug, Default)]
pub struct ManifestBuilder {
    version: String,
    routes: Vec<Route>,
}

impl ManifestBuilder {
    /// Creates a builder for the given manifest version.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            routes: Vec::new(),
        }
    }

    /// Adds a route.
    pub fn add_route(&mut self, selector: Selector, facet: Address, code_hash: Digest) -> &mut Self {
        self.routes.push(Route::new(selector, facet, code_hash));
        self
    }

    /// Adds a route, builder-chaining style.
    #[must_use]
    pub fn with_route(mut self, selector: Selector, facet: Address, code_hash: Digest) -> Self {
        self.routes.push(Route::new(selector, facet, code_hash));
        self
    }

    /// Number of routes staged so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no routes are staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Validates the staged routes and builds the canonical manifest.
    pub fn build(self) -> Result<Manifest, ManifestError> {
        if self.routes.is_empty() {
            return Err(ManifestError::EmptyManifest);
        }

        let mut seen = HashSet::with_capacity(self.routes.len());
        for route in &self.routes {
            if !seen.insert(route.selector) {
                return Err(ManifestError::DuplicateSelector(route.selector));
            }
            if route.facet.is_zero() {
                return Err(ManifestError::InvalidFacetAddress(route.selector));
            }
            if route.code_hash.is_zero() {
                return Err(ManifestError::InvalidCodeHash(route.selector));
            }
        }

        let tree = OrderedMerkleTree::from_routes(&self.routes)?;
        let root = tree.root();

        // Emit routes in canonical order: sort by encoded leaf, then attach
        // each route's proof by its sorted index.
        let mut sorted = self.routes;
        sorted.sort_unstable_by_key(|r| mf_codec::encode_leaf(r.selector, r.facet, r.code_hash));

        let mut routes = Vec::with_capacity(sorted.len());
        for (index, route) in sorted.into_iter().enumerate() {
            let proof = tree.proof(index)?;
            routes.push(ManifestRoute {
                selector: route.selector,
                facet: route.facet,
                code_hash: route.code_hash,
                proof,
            });
        }

        Ok(Manifest {
            version: self.version,
            routes,
            root,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
