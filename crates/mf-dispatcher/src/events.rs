//! # Event Schema
//!
//! Events emitted for indexers, in total order with mutations. The domain
//! returns them from each successful operation; the service forwards them to
//! the configured [`crate::ports::outbound::EventSink`] before releasing the
//! state lock.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Digest, Epoch, Role, Selector, Timestamp};

/// An observable dispatcher state change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatcherEvent {
    /// A root was committed and its timelock started.
    Committed {
        /// Committed root.
        root: Digest,
        /// Epoch the root will activate as.
        epoch: Epoch,
        /// Earliest activation time.
        eta: Timestamp,
    },

    /// A verified batch of routes was written.
    RoutesApplied {
        /// Pending root the batch was proven against.
        root: Digest,
        /// Number of routes in the batch.
        count: u32,
    },

    /// A pending root became active.
    Activated {
        /// Newly active root.
        root: Digest,
        /// Newly active epoch.
        epoch: Epoch,
    },

    /// A selector now forwards to a facet.
    SelectorRouted {
        /// Routed selector.
        selector: Selector,
        /// Facet now serving it.
        facet: Address,
    },

    /// A selector stopped forwarding to a facet.
    SelectorUnrouted {
        /// Unrouted selector.
        selector: Selector,
        /// Facet that served it.
        facet: Address,
    },

    /// Dispatch pausing was toggled.
    PausedSet {
        /// New paused flag.
        paused: bool,
        /// Caller that toggled it.
        by: Address,
    },

    /// The dispatcher was irreversibly frozen.
    Frozen {
        /// Caller that froze it.
        by: Address,
    },

    /// The activation grace window changed.
    EtaGraceSet {
        /// New grace in seconds.
        new: u32,
    },

    /// The batch size bound changed.
    MaxBatchSizeSet {
        /// New maximum batch size.
        new: u32,
    },

    /// A role was granted.
    RoleGranted {
        /// Granted role.
        role: Role,
        /// Receiving address.
        addr: Address,
        /// Granting admin.
        by: Address,
    },

    /// A role was revoked.
    RoleRevoked {
        /// Revoked role.
        role: Role,
        /// Losing address.
        addr: Address,
        /// Revoking admin.
        by: Address,
    },
}

impl DispatcherEvent {
    /// Stable event name for log lines and indexer filters.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Committed { .. } => "Committed",
            Self::RoutesApplied { .. } => "RoutesApplied",
            Self::Activated { .. } => "Activated",
            Self::SelectorRouted { .. } => "SelectorRouted",
            Self::SelectorUnrouted { .. } => "SelectorUnrouted",
            Self::PausedSet { .. } => "PausedSet",
            Self::Frozen { .. } => "Frozen",
            Self::EtaGraceSet { .. } => "EtaGraceSet",
            Self::MaxBatchSizeSet { .. } => "MaxBatchSizeSet",
            Self::RoleGranted { .. } => "RoleGranted",
            Self::RoleRevoked { .. } => "RoleRevoked",
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
