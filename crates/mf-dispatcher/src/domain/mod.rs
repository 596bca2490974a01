//! # Domain Layer
//!
//! Pure, synchronous dispatcher logic: the authoritative state container,
//! its indexes, the invariant checks, and the error taxonomy. No I/O, no
//! async; time arrives as an explicit parameter.

pub mod errors;
pub mod indexes;
pub mod invariants;
pub mod state;

pub use errors::DispatcherError;
pub use state::{DispatcherState, PendingRoot, RouteEntry};
