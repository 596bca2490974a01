//! # Shared Types - Manifold Primitives
//!
//! Value-object primitives shared by every Manifold crate. These types
//! represent concepts defined by their value, not identity: selectors,
//! addresses, digests, epochs, routes, and governance roles.
//!
//! ## Wire Conventions
//!
//! | Type | Width | Layout |
//! |------|-------|--------|
//! | `Selector` | 4 bytes | opaque, big-endian display |
//! | `Address` | 20 bytes | account identifier |
//! | `Digest` | 32 bytes | keccak-256 output |
//! | `Epoch` | u64 | monotonically non-decreasing |
//! | `Timestamp` | u64 | seconds since the epoch-0 reference |
//!
//! All fixed-width types serialize as `0x`-prefixed lowercase hex strings so
//! manifests and event payloads stay human-readable.

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod primitives;
pub mod role;
pub mod route;

pub use primitives::{Address, Digest, ParseBytesError, Selector};
pub use role::Role;
pub use route::{Epoch, Route, Timestamp};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
