//! # Error Types
//!
//! All error types for dispatcher operations. Every failure surfaces with a
//! stable kind; nothing is silently recovered.

use shared_types::{Address, Digest, Epoch, Role, Selector, Timestamp};
use thiserror::Error;

/// Errors from dispatcher operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatcherError {
    /// A state-changing operation was attempted after `freeze()`.
    #[error("dispatcher is frozen")]
    Frozen,

    /// Dispatch was attempted while paused.
    #[error("dispatcher is paused")]
    Paused,

    /// `apply_routes` or `activate` without a pending root.
    #[error("no pending root")]
    NoPendingRoot,

    /// `commit_root` with an epoch at or below the active epoch.
    #[error("epoch not strictly increasing: {epoch} <= active {active}")]
    EpochNotStrictlyIncreasing {
        /// Epoch offered by the commit.
        epoch: Epoch,
        /// Current active epoch.
        active: Epoch,
    },

    /// `commit_root` with a root that was already activated.
    #[error("root already consumed: {0}")]
    RootConsumed(Digest),

    /// `commit_root` with the zero root.
    #[error("invalid root: zero")]
    InvalidRoot,

    /// A batch item's Merkle proof failed verification.
    #[error("invalid proof for selector {selector}")]
    InvalidProof {
        /// Selector whose proof failed.
        selector: Selector,
    },

    /// Batch exceeds the governed size bound.
    #[error("batch too large: {size} > {max}")]
    BatchTooLarge {
        /// Offered batch size.
        size: usize,
        /// Governed maximum.
        max: u32,
    },

    /// The same selector appears twice in one batch.
    #[error("duplicate selector in batch: {0}")]
    DuplicateSelector(Selector),

    /// Activation attempted before the timelock elapsed.
    #[error("activation not ready: now {now} < eta {eta}")]
    ActivationNotReady {
        /// Grace-adjusted current time.
        now: Timestamp,
        /// Earliest permitted activation time.
        eta: Timestamp,
    },

    /// A facet's observed runtime code hash disagrees with the pinned one.
    #[error("code hash mismatch for selector {selector}: expected {expected}, observed {observed}")]
    CodehashMismatch {
        /// Selector whose route failed the pin check.
        selector: Selector,
        /// Pinned code hash.
        expected: Digest,
        /// Code hash reported by the EVM collaborator.
        observed: Digest,
    },

    /// Dispatch of a selector with no live route.
    #[error("unknown selector: {0}")]
    UnknownSelector(Selector),

    /// Caller does not hold the required role.
    #[error("unauthorized: {caller} lacks role {role}")]
    Unauthorized {
        /// Role the operation requires.
        role: Role,
        /// Caller that was rejected.
        caller: Address,
    },

    /// A governance parameter was rejected.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The EVM collaborator could not serve a query.
    #[error("evm client unavailable: {0}")]
    EvmClientUnavailable(String),

    /// An EVM collaborator query exceeded its deadline.
    #[error("evm query timeout after {timeout_ms}ms")]
    Timeout {
        /// Configured deadline in milliseconds.
        timeout_ms: u64,
    },
}

impl DispatcherError {
    /// Returns true for precondition failures: the operation was simply not
    /// permitted in the current state.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::Frozen
                | Self::Paused
                | Self::NoPendingRoot
                | Self::EpochNotStrictlyIncreasing { .. }
                | Self::RootConsumed(_)
                | Self::InvalidRoot
                | Self::BatchTooLarge { .. }
                | Self::DuplicateSelector(_)
                | Self::ActivationNotReady { .. }
                | Self::Unauthorized { .. }
                | Self::InvalidConfig(_)
        )
    }

    /// Returns true for integrity failures: the state or inputs disagree
    /// with a cryptographic commitment.
    #[must_use]
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            Self::InvalidProof { .. } | Self::CodehashMismatch { .. } | Self::UnknownSelector(_)
        )
    }

    /// Returns true for collaborator failures: the EVM client misbehaved,
    /// not the caller.
    #[must_use]
    pub fn is_collaborator(&self) -> bool {
        matches!(self, Self::EvmClientUnavailable(_) | Self::Timeout { .. })
    }
}

// =============================================================================
// TESTS
// =============================================================================
