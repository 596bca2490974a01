//! # Dispatcher Service
//!
//! Wraps the pure state machine in the runtime concerns: one write lock for
//! strict serialization, deadline-bounded EVM collaborator queries, event
//! delivery in mutation order, statistics, and structured logging with a
//! correlation id per governance operation.

use crate::adapters::{InMemoryEvm, ManualTimeSource, RecordingEventSink};
use crate::config::DispatcherConfig;
use crate::domain::errors::DispatcherError;
use crate::domain::state::{DispatcherState, PendingRoot, RouteEntry};
use crate::events::DispatcherEvent;
use crate::ports::inbound::DispatcherApi;
use crate::ports::outbound::{EventSink, EvmClient, EvmError, TimeSource};

use async_trait::async_trait;
use mf_manifest::ManifestRoute;
use shared_types::{Address, Digest, Epoch, Role, Selector};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Statistics for the dispatcher service.
#[derive(Debug, Default, Clone)]
pub struct DispatcherStats {
    /// Roots committed.
    pub commits: u64,
    /// Batches applied.
    pub batches_applied: u64,
    /// Individual routes applied.
    pub routes_applied: u64,
    /// Successful activations.
    pub activations: u64,
    /// Successful dispatch decisions.
    pub dispatches: u64,
    /// Operations rejected with an error.
    pub rejected_operations: u64,
}

/// The dispatcher service.
///
/// Generic over the outbound ports so production and tests wire different
/// collaborators without touching the core.
pub struct DispatcherService<E: EvmClient, S: EventSink, T: TimeSource> {
    evm_timeout: Duration,
    state: Arc<RwLock<DispatcherState>>,
    evm: Arc<E>,
    sink: Arc<S>,
    time: Arc<T>,
    stats: Arc<RwLock<DispatcherStats>>,
}

impl<E: EvmClient, S: EventSink, T: TimeSource> DispatcherService<E, S, T> {
    /// Creates a service over a fresh dispatcher state.
    pub fn new(
        config: DispatcherConfig,
        evm: Arc<E>,
        sink: Arc<S>,
        time: Arc<T>,
    ) -> Result<Self, DispatcherError> {
        config.validate()?;
        Ok(Self {
            evm_timeout: Duration::from_millis(config.evm_timeout_ms),
            state: Arc::new(RwLock::new(DispatcherState::new(&config))),
            evm,
            sink,
            time,
            stats: Arc::new(RwLock::new(DispatcherStats::default())),
        })
    }

    /// Current service statistics.
    pub async fn stats(&self) -> DispatcherStats {
        self.stats.read().await.clone()
    }

    /// Late-activation alert: true when the pending root has sat past its
    /// grace-adjusted ETA for over five minutes. An observability signal,
    /// never an error; logged at `warn` when raised.
    pub async fn pending_overdue(&self) -> bool {
        let now = self.time.now();
        let state = self.state.read().await;
        let overdue = state.activation_overdue(now);
        if overdue {
            if let Some(pending) = state.pending_root() {
                warn!(
                    root = %pending.root,
                    epoch = pending.epoch,
                    pending_since = pending.since,
                    now,
                    "pending root past its activation window"
                );
            }
        }
        overdue
    }

    fn emit_all(&self, events: &[DispatcherEvent]) {
        for event in events {
            self.sink.emit(event);
        }
    }

    async fn reject(&self, err: DispatcherError) -> DispatcherError {
        self.stats.write().await.rejected_operations += 1;
        err
    }

    /// Queries the collaborator for a code hash under the configured
    /// deadline.
    async fn query_code_hash(&self, facet: Address) -> Result<Digest, DispatcherError> {
        let query = self.evm.code_hash(facet);
        match tokio::time::timeout(self.evm_timeout, query).await {
            Ok(Ok(hash)) => Ok(hash),
            Ok(Err(EvmError::Unavailable(reason) | EvmError::DeployFailed(reason))) => {
                Err(DispatcherError::EvmClientUnavailable(reason))
            }
            Err(_) => Err(DispatcherError::Timeout {
                timeout_ms: u64::try_from(self.evm_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

#[async_trait]
impl<E: EvmClient, S: EventSink, T: TimeSource> DispatcherApi for DispatcherService<E, S, T> {
    #[instrument(skip(self), fields(op_id = %Uuid::new_v4()))]
    async fn commit_root(
        &self,
        caller: Address,
        root: Digest,
        epoch: Epoch,
    ) -> Result<(), DispatcherError> {
        let now = self.time.now();
        let mut state = self.state.write().await;
        match state.commit_root(caller, root, epoch, now) {
            Ok(events) => {
                info!(root = %root, epoch, now, "root committed");
                self.emit_all(&events);
                drop(state);
                self.stats.write().await.commits += 1;
                Ok(())
            }
            Err(err) => {
                warn!(root = %root, epoch, error = %err, "commit_root rejected");
                drop(state);
                Err(self.reject(err).await)
            }
        }
    }

    #[instrument(skip(self, batch), fields(op_id = %Uuid::new_v4(), batch_len = batch.len()))]
    async fn apply_routes(
        &self,
        caller: Address,
        batch: &[ManifestRoute],
    ) -> Result<u32, DispatcherError> {
        let mut state = self.state.write().await;
        match state.apply_routes(caller, batch) {
            Ok((count, events)) => {
                info!(count, "routes applied");
                self.emit_all(&events);
                drop(state);
                let mut stats = self.stats.write().await;
                stats.batches_applied += 1;
                stats.routes_applied += u64::from(count);
                Ok(count)
            }
            Err(err) => {
                warn!(error = %err, "apply_routes rejected");
                drop(state);
                Err(self.reject(err).await)
            }
        }
    }

    #[instrument(skip(self), fields(op_id = %Uuid::new_v4()))]
    async fn activate(&self, caller: Address) -> Result<Epoch, DispatcherError> {
        let now = self.time.now();
        // The write guard is held across the collaborator queries: the
        // queries are part of this mutation's precondition evaluation, and
        // mutations are totally ordered.
        let mut state = self.state.write().await;

        if let Err(err) = state.preflight_activation(caller, now) {
            warn!(error = %err, "activation preflight rejected");
            drop(state);
            return Err(self.reject(err).await);
        }

        let facets = state.pending_facets();
        let mut observed = HashMap::with_capacity(facets.len());
        for facet in facets {
            match self.query_code_hash(facet).await {
                Ok(hash) => {
                    observed.insert(facet, hash);
                }
                Err(err) => {
                    warn!(facet = %facet, error = %err, "code hash query failed");
                    drop(state);
                    return Err(self.reject(err).await);
                }
            }
        }

        match state.activate(caller, now, &observed) {
            Ok((epoch, events)) => {
                info!(epoch, "root activated");
                self.emit_all(&events);
                drop(state);
                self.stats.write().await.activations += 1;
                Ok(epoch)
            }
            Err(err) => {
                warn!(error = %err, "activation rejected");
                drop(state);
                Err(self.reject(err).await)
            }
        }
    }

    async fn dispatch(
        &self,
        selector: Selector,
        calldata: Vec<u8>,
    ) -> Result<(Address, Vec<u8>), DispatcherError> {
        let entry = {
            let state = self.state.read().await;
            match state.route_decision(selector) {
                Ok(entry) => entry,
                Err(err) => return Err(self.reject(err).await),
            }
        };

        // I3: forward only while the facet's runtime code matches the pin.
        let observed = match self.query_code_hash(entry.facet).await {
            Ok(hash) => hash,
            Err(err) => return Err(self.reject(err).await),
        };
        if observed != entry.code_hash {
            warn!(
                selector = %selector,
                facet = %entry.facet,
                expected = %entry.code_hash,
                observed = %observed,
                "dispatch blocked on code hash mismatch"
            );
            return Err(self
                .reject(DispatcherError::CodehashMismatch {
                    selector,
                    expected: entry.code_hash,
                    observed,
                })
                .await);
        }

        debug!(selector = %selector, facet = %entry.facet, "dispatch");
        self.stats.write().await.dispatches += 1;
        Ok((entry.facet, calldata))
    }

    async fn pause(&self, caller: Address) -> Result<(), DispatcherError> {
        let mut state = self.state.write().await;
        match state.pause(caller) {
            Ok(events) => {
                info!(by = %caller, "dispatch paused");
                self.emit_all(&events);
                Ok(())
            }
            Err(err) => {
                drop(state);
                Err(self.reject(err).await)
            }
        }
    }

    async fn unpause(&self, caller: Address) -> Result<(), DispatcherError> {
        let mut state = self.state.write().await;
        match state.unpause(caller) {
            Ok(events) => {
                info!(by = %caller, "dispatch unpaused");
                self.emit_all(&events);
                Ok(())
            }
            Err(err) => {
                drop(state);
                Err(self.reject(err).await)
            }
        }
    }

    async fn freeze(&self, caller: Address) -> Result<(), DispatcherError> {
        let mut state = self.state.write().await;
        match state.freeze(caller) {
            Ok(events) => {
                warn!(by = %caller, "dispatcher frozen; all further mutation rejected");
                self.emit_all(&events);
                Ok(())
            }
            Err(err) => {
                drop(state);
                Err(self.reject(err).await)
            }
        }
    }

    async fn grant_role(
        &self,
        caller: Address,
        role: Role,
        addr: Address,
    ) -> Result<(), DispatcherError> {
        let mut state = self.state.write().await;
        match state.grant_role(caller, role, addr) {
            Ok(events) => {
                info!(%role, addr = %addr, by = %caller, "role granted");
                self.emit_all(&events);
                Ok(())
            }
            Err(err) => {
                drop(state);
                Err(self.reject(err).await)
            }
        }
    }

    async fn revoke_role(
        &self,
        caller: Address,
        role: Role,
        addr: Address,
    ) -> Result<(), DispatcherError> {
        let mut state = self.state.write().await;
        match state.revoke_role(caller, role, addr) {
            Ok(events) => {
                info!(%role, addr = %addr, by = %caller, "role revoked");
                self.emit_all(&events);
                Ok(())
            }
            Err(err) => {
                drop(state);
                Err(self.reject(err).await)
            }
        }
    }

    async fn set_eta_grace(&self, caller: Address, seconds: u32) -> Result<(), DispatcherError> {
        let mut state = self.state.write().await;
        match state.set_eta_grace(caller, seconds) {
            Ok(events) => {
                info!(seconds, "eta grace updated");
                self.emit_all(&events);
                Ok(())
            }
            Err(err) => {
                drop(state);
                Err(self.reject(err).await)
            }
        }
    }

    async fn set_max_batch_size(&self, caller: Address, size: u32) -> Result<(), DispatcherError> {
        let mut state = self.state.write().await;
        match state.set_max_batch_size(caller, size) {
            Ok(events) => {
                info!(size, "max batch size updated");
                self.emit_all(&events);
                Ok(())
            }
            Err(err) => {
                drop(state);
                Err(self.reject(err).await)
            }
        }
    }

    async fn active_root(&self) -> Digest {
        self.state.read().await.active_root()
    }

    async fn active_epoch(&self) -> Epoch {
        self.state.read().await.active_epoch()
    }

    async fn pending_root(&self) -> Option<PendingRoot> {
        self.state.read().await.pending_root()
    }

    async fn route(&self, selector: Selector) -> Option<RouteEntry> {
        self.state.read().await.route(selector)
    }

    async fn facet_address(&self, selector: Selector) -> Address {
        self.state.read().await.facet_address(selector)
    }

    async fn facet_addresses(&self) -> Vec<Address> {
        self.state.read().await.facet_addresses()
    }

    async fn facet_function_selectors(&self, facet: Address) -> Vec<Selector> {
        self.state.read().await.facet_function_selectors(facet)
    }

    async fn facets(&self) -> Vec<(Address, Vec<Selector>)> {
        self.state.read().await.facets()
    }
}

/// Builds a fully-wired test service over the in-memory adapters, returning
/// the collaborators so tests can stage code, read events, and drive time.
#[must_use]
pub fn create_test_service() -> (
    DispatcherService<InMemoryEvm, RecordingEventSink, ManualTimeSource>,
    Arc<InMemoryEvm>,
    Arc<RecordingEventSink>,
    Arc<ManualTimeSource>,
) {
    let config = DispatcherConfig::for_testing();
    let evm = Arc::new(InMemoryEvm::new(config.deployer));
    let sink = Arc::new(RecordingEventSink::new());
    let time = Arc::new(ManualTimeSource::new(1000));

    let service = DispatcherService::new(
        config,
        Arc::clone(&evm),
        Arc::clone(&sink),
        Arc::clone(&time),
    )
    .expect("testing config is valid");

    (service, evm, sink, time)
}

// =============================================================================
// TESTS
// =============================================================================
