//! # Dispatcher - Hash-First Routed Execution
//!
//! The authoritative per-selector route table, updated in atomic epochs
//! behind a Merkle commitment, an activation timelock, and a runtime
//! code-hash pin on every route.
//!
//! ## Lifecycle
//!
//! ```text
//! commit_root ──> apply_routes* ──> activate
//!      │                │               │
//!      │   proofs checked against       │ re-pins each touched route's
//!      │   the pending root; batch      │ observed code hash; commits
//!      │   is atomic                    │ state in one step
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement |
//! |----|-----------|-------------|
//! | I1 | Forward/reverse route-index consistency | `domain/state.rs` - `route_update()` |
//! | I2 | Facet list holds exactly the facets with selectors | `domain/state.rs` - `route_update()` |
//! | I3 | Dispatch only on matching pinned code hash | `service.rs` - `dispatch()` |
//! | I4 | Epoch monotonicity | `domain/state.rs` - `commit_root()` / `activate()` |
//! | I5 | Activated roots never re-activate | `domain/state.rs` - `commit_root()` |
//! | I6 | Activation only after the timelock | `domain/state.rs` - `activate()` |
//! | I7 | `frozen` is terminal | every mutating operation |
//!
//! Executable forms of these checks live in [`domain::invariants`].
//!
//! ## Concurrency
//!
//! The dispatcher is a strictly serialized state machine: one
//! `tokio::sync::RwLock` guards the state, mutating operations hold the
//! write guard end-to-end, and readers receive copied snapshots.

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod events;
pub mod ports;
pub mod service;

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain
    pub use crate::domain::errors::DispatcherError;
    pub use crate::domain::state::{DispatcherState, PendingRoot, RouteEntry};

    // Invariants
    pub use crate::domain::invariants::{check_all_invariants, InvariantViolation};

    // Ports
    pub use crate::ports::inbound::DispatcherApi;
    pub use crate::ports::outbound::{EventSink, EvmClient, EvmError, TimeSource};

    // Events
    pub use crate::events::DispatcherEvent;

    // Adapters
    pub use crate::adapters::{
        InMemoryEvm, ManualTimeSource, RecordingEventSink, SystemTimeSource, TracingEventSink,
    };

    // Service
    pub use crate::service::{create_test_service, DispatcherService, DispatcherStats};

    // Config
    pub use crate::config::DispatcherConfig;
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
