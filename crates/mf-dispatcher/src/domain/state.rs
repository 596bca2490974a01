//! # Dispatcher State Machine
//!
//! The authoritative route table and the commit → apply → activate
//! lifecycle. Pure and synchronous: callers supply the current time and the
//! observed code hashes, so every collaborator query happens before any
//! mutation and the whole operation either commits or leaves no trace.

use crate::config::DispatcherConfig;
use crate::domain::errors::DispatcherError;
use crate::domain::indexes::IndexedSet;
use crate::events::DispatcherEvent;
use mf_manifest::ManifestRoute;
use mf_merkle::verify_route;
use shared_types::{Address, Digest, Epoch, Role, Selector, Timestamp};
use std::collections::{HashMap, HashSet};

/// Seconds past the grace-adjusted ETA before a pending root counts as a
/// late-activation alert condition.
pub const LATE_ACTIVATION_ALERT_SECS: u64 = 300;

/// A live route table entry. Facets are always non-zero here; zero-facet
/// updates delete the entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteEntry {
    /// Facet serving the selector.
    pub facet: Address,
    /// Pinned runtime code hash.
    pub code_hash: Digest,
}

/// A committed-but-not-yet-active root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingRoot {
    /// Committed Merkle root.
    pub root: Digest,
    /// Epoch the root will activate as.
    pub epoch: Epoch,
    /// Commit time; the timelock counts from here.
    pub since: Timestamp,
}

/// The authoritative dispatcher state.
///
/// Owned exclusively by one service; readers receive copied snapshots.
#[derive(Clone, Debug)]
pub struct DispatcherState {
    active_root: Digest,
    active_epoch: Epoch,
    pending: Option<PendingRoot>,

    routes: HashMap<Selector, RouteEntry>,
    facet_selectors: HashMap<Address, IndexedSet<Selector>>,
    facet_list: IndexedSet<Address>,

    activation_selectors: Vec<Selector>,
    activation_seen: HashSet<Selector>,

    consumed_roots: HashSet<Digest>,

    paused: bool,
    frozen: bool,

    activation_delay: u64,
    eta_grace: u32,
    max_batch_size: u32,

    roles: HashMap<Role, HashSet<Address>>,
}

impl DispatcherState {
    /// Creates a fresh dispatcher with the configured initial roles:
    /// `ADMIN = {deployer}`, `EMERGENCY = {guardian}`, all others empty.
    #[must_use]
    pub fn new(config: &DispatcherConfig) -> Self {
        let mut roles: HashMap<Role, HashSet<Address>> = HashMap::new();
        roles.entry(Role::Admin).or_default().insert(config.deployer);
        roles
            .entry(Role::Emergency)
            .or_default()
            .insert(config.guardian);

        Self {
            active_root: Digest::ZERO,
            active_epoch: 0,
            pending: None,
            routes: HashMap::new(),
            facet_selectors: HashMap::new(),
            facet_list: IndexedSet::new(),
            activation_selectors: Vec::new(),
            activation_seen: HashSet::new(),
            consumed_roots: HashSet::new(),
            paused: false,
            frozen: false,
            activation_delay: config.activation_delay,
            eta_grace: config.eta_grace,
            max_batch_size: config.max_batch_size,
            roles,
        }
    }

    // =========================================================================
    // GUARDS
    // =========================================================================

    fn require_not_frozen(&self) -> Result<(), DispatcherError> {
        if self.frozen {
            return Err(DispatcherError::Frozen);
        }
        Ok(())
    }

    fn require_role(&self, role: Role, caller: Address) -> Result<(), DispatcherError> {
        if self.has_role(role, caller) {
            Ok(())
        } else {
            Err(DispatcherError::Unauthorized { role, caller })
        }
    }

    // =========================================================================
    // LIFECYCLE OPERATIONS
    // =========================================================================

    /// Commits a root, starting its timelock. Replaces any existing pending
    /// root. Permitted while paused; only `frozen` blocks it.
    pub fn commit_root(
        &mut self,
        caller: Address,
        root: Digest,
        epoch: Epoch,
        now: Timestamp,
    ) -> Result<Vec<DispatcherEvent>, DispatcherError> {
        self.require_not_frozen()?;
        self.require_role(Role::Commit, caller)?;

        if root.is_zero() {
            return Err(DispatcherError::InvalidRoot);
        }
        if epoch <= self.active_epoch {
            return Err(DispatcherError::EpochNotStrictlyIncreasing {
                epoch,
                active: self.active_epoch,
            });
        }
        if self.consumed_roots.contains(&root) {
            return Err(DispatcherError::RootConsumed(root));
        }

        self.pending = Some(PendingRoot {
            root,
            epoch,
            since: now,
        });

        Ok(vec![DispatcherEvent::Committed {
            root,
            epoch,
            eta: now.saturating_add(self.activation_delay),
        }])
    }

    /// Applies a bounded batch of routes proven against the pending root.
    ///
    /// The batch is atomic: every proof is verified before any route is
    /// written, so a single bad item leaves the table untouched. Returns the
    /// applied count with the emitted events.
    pub fn apply_routes(
        &mut self,
        caller: Address,
        batch: &[ManifestRoute],
    ) -> Result<(u32, Vec<DispatcherEvent>), DispatcherError> {
        self.require_not_frozen()?;
        self.require_role(Role::Apply, caller)?;

        let pending = self.pending.ok_or(DispatcherError::NoPendingRoot)?;

        if batch.len() > self.max_batch_size as usize {
            return Err(DispatcherError::BatchTooLarge {
                size: batch.len(),
                max: self.max_batch_size,
            });
        }

        let mut batch_selectors = HashSet::with_capacity(batch.len());
        for item in batch {
            if !batch_selectors.insert(item.selector) {
                return Err(DispatcherError::DuplicateSelector(item.selector));
            }
        }

        // Verify every proof before touching the table.
        for item in batch {
            if !verify_route(&item.route(), &item.proof, pending.root) {
                return Err(DispatcherError::InvalidProof {
                    selector: item.selector,
                });
            }
        }

        let mut events = Vec::new();
        for item in batch {
            self.route_update(item.selector, item.facet, item.code_hash, &mut events);
            if self.activation_seen.insert(item.selector) {
                self.activation_selectors.push(item.selector);
            }
        }

        let count = u32::try_from(batch.len()).unwrap_or(u32::MAX);
        events.push(DispatcherEvent::RoutesApplied {
            root: pending.root,
            count,
        });
        Ok((count, events))
    }

    /// Checks every precondition of `activate` except the code-hash re-pins.
    ///
    /// The service calls this before issuing collaborator queries so a
    /// not-ready activation never pays for I/O.
    pub fn preflight_activation(
        &self,
        caller: Address,
        now: Timestamp,
    ) -> Result<(), DispatcherError> {
        self.require_not_frozen()?;
        self.require_role(Role::Apply, caller)?;
        let pending = self.pending.ok_or(DispatcherError::NoPendingRoot)?;

        let eta = pending.since.saturating_add(self.activation_delay);
        let graced_now = now.saturating_add(u64::from(self.eta_grace));
        if graced_now < eta {
            return Err(DispatcherError::ActivationNotReady {
                now: graced_now,
                eta,
            });
        }
        Ok(())
    }

    /// Activates the pending root.
    ///
    /// `observed` maps each facet touched since the last activation to its
    /// current runtime code hash, as reported by the EVM collaborator. Every
    /// touched route is re-pinned against it; any mismatch aborts with no
    /// state change. On success the pending root becomes active, is marked
    /// consumed, and the activation snapshot clears.
    pub fn activate(
        &mut self,
        caller: Address,
        now: Timestamp,
        observed: &HashMap<Address, Digest>,
    ) -> Result<(Epoch, Vec<DispatcherEvent>), DispatcherError> {
        self.preflight_activation(caller, now)?;
        let pending = self.pending.ok_or(DispatcherError::NoPendingRoot)?;

        // Re-pin every touched live route. All checks complete before any
        // state changes.
        for selector in &self.activation_selectors {
            let Some(entry) = self.routes.get(selector) else {
                continue; // selector was since unrouted
            };
            let observed_hash = observed.get(&entry.facet).copied().ok_or_else(|| {
                DispatcherError::EvmClientUnavailable(format!(
                    "no code hash observed for facet {:?}",
                    entry.facet
                ))
            })?;
            if observed_hash != entry.code_hash {
                return Err(DispatcherError::CodehashMismatch {
                    selector: *selector,
                    expected: entry.code_hash,
                    observed: observed_hash,
                });
            }
        }

        self.active_root = pending.root;
        self.active_epoch = pending.epoch;
        self.consumed_roots.insert(pending.root);
        self.pending = None;
        self.activation_selectors.clear();
        self.activation_seen.clear();

        Ok((
            self.active_epoch,
            vec![DispatcherEvent::Activated {
                root: self.active_root,
                epoch: self.active_epoch,
            }],
        ))
    }

    /// Resolves the routing decision for a selector.
    ///
    /// Fail-closed: rejected while paused or frozen, and when no live route
    /// exists. The caller still owes the dispatch-time code-hash check
    /// before forwarding.
    pub fn route_decision(&self, selector: Selector) -> Result<RouteEntry, DispatcherError> {
        if self.paused {
            return Err(DispatcherError::Paused);
        }
        if self.frozen {
            return Err(DispatcherError::Frozen);
        }
        self.routes
            .get(&selector)
            .copied()
            .ok_or(DispatcherError::UnknownSelector(selector))
    }

    // =========================================================================
    // GOVERNANCE OPERATIONS
    // =========================================================================

    /// Pauses dispatch. Governance operations stay available.
    pub fn pause(&mut self, caller: Address) -> Result<Vec<DispatcherEvent>, DispatcherError> {
        self.require_not_frozen()?;
        self.require_role(Role::Emergency, caller)?;
        self.paused = true;
        Ok(vec![DispatcherEvent::PausedSet {
            paused: true,
            by: caller,
        }])
    }

    /// Unpauses dispatch.
    pub fn unpause(&mut self, caller: Address) -> Result<Vec<DispatcherEvent>, DispatcherError> {
        self.require_not_frozen()?;
        self.require_role(Role::Emergency, caller)?;
        self.paused = false;
        Ok(vec![DispatcherEvent::PausedSet {
            paused: false,
            by: caller,
        }])
    }

    /// Irreversibly freezes the dispatcher. Every later mutation, and
    /// dispatch itself, is rejected.
    pub fn freeze(&mut self, caller: Address) -> Result<Vec<DispatcherEvent>, DispatcherError> {
        self.require_not_frozen()?;
        self.require_role(Role::Admin, caller)?;
        self.frozen = true;
        Ok(vec![DispatcherEvent::Frozen { by: caller }])
    }

    /// Grants a role.
    pub fn grant_role(
        &mut self,
        caller: Address,
        role: Role,
        addr: Address,
    ) -> Result<Vec<DispatcherEvent>, DispatcherError> {
        self.require_not_frozen()?;
        self.require_role(Role::Admin, caller)?;
        self.roles.entry(role).or_default().insert(addr);
        Ok(vec![DispatcherEvent::RoleGranted {
            role,
            addr,
            by: caller,
        }])
    }

    /// Revokes a role.
    pub fn revoke_role(
        &mut self,
        caller: Address,
        role: Role,
        addr: Address,
    ) -> Result<Vec<DispatcherEvent>, DispatcherError> {
        self.require_not_frozen()?;
        self.require_role(Role::Admin, caller)?;
        if let Some(holders) = self.roles.get_mut(&role) {
            holders.remove(&addr);
        }
        Ok(vec![DispatcherEvent::RoleRevoked {
            role,
            addr,
            by: caller,
        }])
    }

    /// Sets the activation grace window.
    pub fn set_eta_grace(
        &mut self,
        caller: Address,
        seconds: u32,
    ) -> Result<Vec<DispatcherEvent>, DispatcherError> {
        self.require_not_frozen()?;
        self.require_role(Role::Admin, caller)?;
        self.eta_grace = seconds;
        Ok(vec![DispatcherEvent::EtaGraceSet { new: seconds }])
    }

    /// Sets the batch size bound. Zero is rejected: it would make
    /// `apply_routes` permanently unusable, which only `freeze` may do.
    pub fn set_max_batch_size(
        &mut self,
        caller: Address,
        size: u32,
    ) -> Result<Vec<DispatcherEvent>, DispatcherError> {
        self.require_not_frozen()?;
        self.require_role(Role::Admin, caller)?;
        if size == 0 {
            return Err(DispatcherError::InvalidConfig(
                "max_batch_size must be positive".to_string(),
            ));
        }
        self.max_batch_size = size;
        Ok(vec![DispatcherEvent::MaxBatchSizeSet { new: size }])
    }

    // =========================================================================
    // ROUTE UPDATE (internal)
    // =========================================================================

    /// Writes one route, keeping the forward map, reverse index, and facet
    /// list consistent.
    ///
    /// Re-pointing a selector swap-and-pops it from the previous facet's
    /// selector set; a facet with no selectors left leaves the facet list
    /// the same way. A zero facet deletes the route.
    fn route_update(
        &mut self,
        selector: Selector,
        facet: Address,
        code_hash: Digest,
        events: &mut Vec<DispatcherEvent>,
    ) {
        let prev = self
            .routes
            .get(&selector)
            .map_or(Address::ZERO, |entry| entry.facet);

        if prev == facet {
            // Same facet: refresh the pin only.
            if let Some(entry) = self.routes.get_mut(&selector) {
                entry.code_hash = code_hash;
            }
            return;
        }

        if !prev.is_zero() {
            if let Some(selectors) = self.facet_selectors.get_mut(&prev) {
                selectors.remove(selector);
                events.push(DispatcherEvent::SelectorUnrouted {
                    selector,
                    facet: prev,
                });
                if selectors.is_empty() {
                    self.facet_selectors.remove(&prev);
                    self.facet_list.remove(prev);
                }
            }
        }

        if facet.is_zero() {
            self.routes.remove(&selector);
            return;
        }

        self.routes.insert(selector, RouteEntry { facet, code_hash });
        let selectors = self.facet_selectors.entry(facet).or_default();
        if selectors.is_empty() {
            self.facet_list.insert(facet);
        }
        selectors.insert(selector);
        events.push(DispatcherEvent::SelectorRouted { selector, facet });
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Active Merkle root, zero while fresh.
    #[must_use]
    pub fn active_root(&self) -> Digest {
        self.active_root
    }

    /// Active epoch, zero while fresh.
    #[must_use]
    pub fn active_epoch(&self) -> Epoch {
        self.active_epoch
    }

    /// The pending root, if one is committed.
    #[must_use]
    pub fn pending_root(&self) -> Option<PendingRoot> {
        self.pending
    }

    /// Live route entry for a selector.
    #[must_use]
    pub fn route(&self, selector: Selector) -> Option<RouteEntry> {
        self.routes.get(&selector).copied()
    }

    /// Forward lookup: the facet serving a selector, zero if absent.
    #[must_use]
    pub fn facet_address(&self, selector: Selector) -> Address {
        self.routes
            .get(&selector)
            .map_or(Address::ZERO, |entry| entry.facet)
    }

    /// Snapshot of all facets currently serving at least one selector.
    #[must_use]
    pub fn facet_addresses(&self) -> Vec<Address> {
        self.facet_list.to_vec()
    }

    /// Snapshot of the selectors a facet serves.
    #[must_use]
    pub fn facet_function_selectors(&self, facet: Address) -> Vec<Selector> {
        self.facet_selectors
            .get(&facet)
            .map_or_else(Vec::new, IndexedSet::to_vec)
    }

    /// Composed loupe view: every facet with its selectors.
    #[must_use]
    pub fn facets(&self) -> Vec<(Address, Vec<Selector>)> {
        self.facet_list
            .as_slice()
            .iter()
            .map(|&facet| (facet, self.facet_function_selectors(facet)))
            .collect()
    }

    /// Selectors touched since the last activation, in first-seen order.
    #[must_use]
    pub fn activation_selectors(&self) -> &[Selector] {
        &self.activation_selectors
    }

    /// Distinct non-zero facets the next activation must re-pin.
    #[must_use]
    pub fn pending_facets(&self) -> Vec<Address> {
        let mut facets = IndexedSet::new();
        for selector in &self.activation_selectors {
            if let Some(entry) = self.routes.get(selector) {
                facets.insert(entry.facet);
            }
        }
        facets.to_vec()
    }

    /// Returns true once an activated root, so it can never be reused.
    #[must_use]
    pub fn is_root_consumed(&self, root: Digest) -> bool {
        self.consumed_roots.contains(&root)
    }

    /// Paused flag.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Frozen flag.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Current activation grace window in seconds.
    #[must_use]
    pub fn eta_grace(&self) -> u32 {
        self.eta_grace
    }

    /// Current batch size bound.
    #[must_use]
    pub fn max_batch_size(&self) -> u32 {
        self.max_batch_size
    }

    /// Activation timelock in seconds, fixed at construction.
    #[must_use]
    pub fn activation_delay(&self) -> u64 {
        self.activation_delay
    }

    /// Returns true if `addr` holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role, addr: Address) -> bool {
        self.roles
            .get(&role)
            .is_some_and(|holders| holders.contains(&addr))
    }

    /// Late-activation alert condition: the pending root has sat past its
    /// grace-adjusted ETA for more than [`LATE_ACTIVATION_ALERT_SECS`].
    ///
    /// An observability signal, never an error.
    #[must_use]
    pub fn activation_overdue(&self, now: Timestamp) -> bool {
        self.pending.is_some_and(|pending| {
            let alert_at = pending
                .since
                .saturating_add(self.activation_delay)
                .saturating_add(u64::from(self.eta_grace))
                .saturating_add(LATE_ACTIVATION_ALERT_SECS);
            now > alert_at
        })
    }

    /// Internal view for invariant checks: the reverse index.
    #[must_use]
    pub(crate) fn facet_selector_map(&self) -> &HashMap<Address, IndexedSet<Selector>> {
        &self.facet_selectors
    }

    /// Internal view for invariant checks: the forward map.
    #[must_use]
    pub(crate) fn route_map(&self) -> &HashMap<Selector, RouteEntry> {
        &self.routes
    }
}

// =============================================================================
// TESTS
// =============================================================================
