//! # Domain Invariants
//!
//! Executable forms of the dispatcher's structural invariants. The state
//! machine maintains these by construction; tests and audits re-check them
//! after arbitrary operation sequences.

use crate::domain::state::DispatcherState;
use shared_types::{Address, Selector};

/// A detected invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A routed selector is missing from its facet's reverse index, or a
    /// reverse-index entry has no forward route.
    ForwardReverseMismatch {
        /// Offending selector.
        selector: Selector,
        /// Facet involved.
        facet: Address,
    },

    /// The facet list disagrees with the set of facets holding selectors.
    FacetListMismatch {
        /// Offending facet.
        facet: Address,
    },

    /// A reverse-index entry exists with zero selectors.
    EmptyFacetEntry {
        /// Offending facet.
        facet: Address,
    },

    /// A pending epoch at or below the active epoch.
    PendingEpochNotAhead {
        /// Pending epoch found.
        pending: u64,
        /// Active epoch.
        active: u64,
    },

    /// The pending root was already consumed.
    PendingRootConsumed,
}

/// I1: every forward route appears in the reverse index and vice versa.
#[must_use]
pub fn check_forward_reverse_consistency(state: &DispatcherState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for (&selector, entry) in state.route_map() {
        let listed = state
            .facet_selector_map()
            .get(&entry.facet)
            .is_some_and(|set| set.contains(selector));
        if !listed {
            violations.push(InvariantViolation::ForwardReverseMismatch {
                selector,
                facet: entry.facet,
            });
        }
    }

    for (&facet, selectors) in state.facet_selector_map() {
        for &selector in selectors.as_slice() {
            let routed = state
                .route_map()
                .get(&selector)
                .is_some_and(|entry| entry.facet == facet);
            if !routed {
                violations.push(InvariantViolation::ForwardReverseMismatch { selector, facet });
            }
        }
    }

    violations
}

/// I2: the facet list holds exactly the facets with at least one selector.
#[must_use]
pub fn check_facet_list_exactness(state: &DispatcherState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for (&facet, selectors) in state.facet_selector_map() {
        if selectors.is_empty() {
            violations.push(InvariantViolation::EmptyFacetEntry { facet });
        }
        if !state.facet_addresses().contains(&facet) {
            violations.push(InvariantViolation::FacetListMismatch { facet });
        }
    }

    for facet in state.facet_addresses() {
        let live = state
            .facet_selector_map()
            .get(&facet)
            .is_some_and(|set| !set.is_empty());
        if !live {
            violations.push(InvariantViolation::FacetListMismatch { facet });
        }
    }

    violations
}

/// I4/I5 structural slice: any pending root must sit strictly ahead of the
/// active epoch and must not be consumed.
#[must_use]
pub fn check_pending_coherence(state: &DispatcherState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    if let Some(pending) = state.pending_root() {
        if pending.epoch <= state.active_epoch() {
            violations.push(InvariantViolation::PendingEpochNotAhead {
                pending: pending.epoch,
                active: state.active_epoch(),
            });
        }
        if state.is_root_consumed(pending.root) {
            violations.push(InvariantViolation::PendingRootConsumed);
        }
    }

    violations
}

/// Runs every structural check.
#[must_use]
pub fn check_all_invariants(state: &DispatcherState) -> Vec<InvariantViolation> {
    let mut violations = check_forward_reverse_consistency(state);
    violations.extend(check_facet_list_exactness(state));
    violations.extend(check_pending_coherence(state));
    violations
}

// =============================================================================
// TESTS
// =============================================================================
