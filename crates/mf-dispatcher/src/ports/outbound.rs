//! # Driven Ports (Outbound)
//!
//! Capability sets the dispatcher depends on:
//!
//! - `EvmClient`: `{code_at, code_hash, deploy}` - read-only from the core's
//!   perspective except `deploy`, which outer orchestration drives.
//! - `EventSink`: `{emit}` - receives every event in mutation order.
//! - `TimeSource`: `{now}` - wall-clock seconds; tests swap in a manual one.

use crate::events::DispatcherEvent;
use async_trait::async_trait;
use mf_codec::keccak256;
use shared_types::{Address, Digest, Timestamp};
use thiserror::Error;

/// Errors from the EVM collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvmError {
    /// The client could not serve the query.
    #[error("evm client unavailable: {0}")]
    Unavailable(String),

    /// A deployment failed.
    #[error("deploy failed: {0}")]
    DeployFailed(String),
}

/// Interface to the EVM-compatible execution layer.
///
/// Queries carry an implementation-defined deadline enforced by the caller;
/// the trait itself stays deadline-free.
#[async_trait]
pub trait EvmClient: Send + Sync {
    /// Runtime code at an address. Empty for accounts without code.
    async fn code_at(&self, address: Address) -> Result<Vec<u8>, EvmError>;

    /// Runtime code hash at an address.
    ///
    /// Defaults to hashing `code_at`; live clients usually answer this from
    /// account state directly.
    async fn code_hash(&self, address: Address) -> Result<Digest, EvmError> {
        let code = self.code_at(address).await?;
        Ok(keccak256(&code))
    }

    /// Deploys `init_code` under `salt`, returning the created address.
    async fn deploy(&self, salt: Digest, init_code: &[u8]) -> Result<Address, EvmError>;
}

/// Interface for publishing dispatcher events.
pub trait EventSink: Send + Sync {
    /// Delivers one event. Called in mutation order, before the state lock
    /// is released.
    fn emit(&self, event: &DispatcherEvent);
}

/// Interface for reading the current time.
pub trait TimeSource: Send + Sync {
    /// Seconds since the epoch-0 reference.
    fn now(&self) -> Timestamp;
}

// =============================================================================
// TESTS
// =============================================================================
