//! # Manifest - Canonical Route Documents
//!
//! Transforms a deployment plan's routes into a canonical, verifiable
//! manifest: the sorted leaf sequence, the Merkle root, and a proof bundle
//! per route.
//!
//! ## Serialized Views
//!
//! | View | Form | Use |
//! |------|------|-----|
//! | Descriptive | self-describing JSON records | humans, tooling |
//! | Compact | fixed-width big-endian binary | transport |
//!
//! Both views normalize to the same root: the compact decoder re-derives the
//! root from the decoded routes and rejects a document that disagrees.

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod builder;
pub mod errors;
pub mod store;
pub mod wire;

pub use builder::{Manifest, ManifestBuilder, ManifestRoute};
pub use errors::ManifestError;
pub use store::{FileManifestStore, InMemoryManifestStore, ManifestStore};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
