//! # Deploy - Salts & Address Prediction
//!
//! Deterministic placement: derive a reproducible salt from a byte payload
//! and a deployer identity, then predict the CREATE2-style address that salt
//! yields on **every** EVM-compatible chain.
//!
//! The same `(deployer, salt, init_code)` triple produces the same address
//! everywhere; the collaborator that performs the on-chain deployment must
//! use the identical triple for the prediction to be realized.
//!
//! Pure functions only: no I/O, no async, deterministic on every platform.

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod errors;
pub mod predictor;
pub mod salt;

pub use errors::DeployError;
pub use predictor::{
    create2_address, create2_address_from_code, validate_init_code, MAX_INIT_CODE_SIZE,
};
pub use salt::{dispatcher_salt, facet_salt, universal_salt, DeploymentPlan};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
