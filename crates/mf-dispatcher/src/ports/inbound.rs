//! # Driving Port (Inbound)
//!
//! The dispatcher's stable control surface. Operators, gateways, and tests
//! drive the state machine through this trait; the wire form behind it is
//! adapter-defined.

use crate::domain::errors::DispatcherError;
use crate::domain::state::{PendingRoot, RouteEntry};
use async_trait::async_trait;
use mf_manifest::ManifestRoute;
use shared_types::{Address, Digest, Epoch, Role, Selector};

/// The dispatcher control surface.
///
/// Every mutating call is totally ordered with respect to every other
/// mutating call; reads observe the most recent committed mutation.
#[async_trait]
pub trait DispatcherApi: Send + Sync {
    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Commits a root at an epoch, starting its timelock.
    async fn commit_root(
        &self,
        caller: Address,
        root: Digest,
        epoch: Epoch,
    ) -> Result<(), DispatcherError>;

    /// Applies a bounded, proven batch of routes. Atomic. Returns the
    /// applied count.
    async fn apply_routes(
        &self,
        caller: Address,
        batch: &[ManifestRoute],
    ) -> Result<u32, DispatcherError>;

    /// Activates the pending root after the timelock, re-pinning every
    /// touched route's code hash. Returns the new active epoch.
    async fn activate(&self, caller: Address) -> Result<Epoch, DispatcherError>;

    /// Resolves and integrity-checks the route for a selector, returning
    /// the facet to forward to with the unchanged calldata.
    async fn dispatch(
        &self,
        selector: Selector,
        calldata: Vec<u8>,
    ) -> Result<(Address, Vec<u8>), DispatcherError>;

    // -------------------------------------------------------------------------
    // Governance
    // -------------------------------------------------------------------------

    /// Pauses dispatch.
    async fn pause(&self, caller: Address) -> Result<(), DispatcherError>;

    /// Unpauses dispatch.
    async fn unpause(&self, caller: Address) -> Result<(), DispatcherError>;

    /// Irreversibly freezes the dispatcher.
    async fn freeze(&self, caller: Address) -> Result<(), DispatcherError>;

    /// Grants a role.
    async fn grant_role(
        &self,
        caller: Address,
        role: Role,
        addr: Address,
    ) -> Result<(), DispatcherError>;

    /// Revokes a role.
    async fn revoke_role(
        &self,
        caller: Address,
        role: Role,
        addr: Address,
    ) -> Result<(), DispatcherError>;

    /// Sets the activation grace window in seconds.
    async fn set_eta_grace(&self, caller: Address, seconds: u32) -> Result<(), DispatcherError>;

    /// Sets the batch size bound.
    async fn set_max_batch_size(&self, caller: Address, size: u32) -> Result<(), DispatcherError>;

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Active root, zero while fresh.
    async fn active_root(&self) -> Digest;

    /// Active epoch, zero while fresh.
    async fn active_epoch(&self) -> Epoch;

    /// The pending root, if any.
    async fn pending_root(&self) -> Option<PendingRoot>;

    /// Live route for a selector.
    async fn route(&self, selector: Selector) -> Option<RouteEntry>;

    /// Forward lookup: facet for a selector, zero if absent.
    async fn facet_address(&self, selector: Selector) -> Address;

    /// Snapshot of facets serving at least one selector.
    async fn facet_addresses(&self) -> Vec<Address>;

    /// Snapshot of a facet's selectors.
    async fn facet_function_selectors(&self, facet: Address) -> Vec<Selector>;

    /// Composed loupe view.
    async fn facets(&self) -> Vec<(Address, Vec<Selector>)>;
}
