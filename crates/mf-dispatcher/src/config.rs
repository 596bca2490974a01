//! # Dispatcher Configuration
//!
//! Construction-time parameters. `activation_delay` is fixed at
//! construction; `eta_grace` and `max_batch_size` stay governable at runtime
//! by `ADMIN`.

use crate::domain::errors::DispatcherError;
use serde::{Deserialize, Serialize};
use shared_types::Address;

/// Default activation timelock in seconds.
pub const DEFAULT_ACTIVATION_DELAY_SECS: u64 = 3600;

/// Default activation grace window in seconds.
pub const DEFAULT_ETA_GRACE_SECS: u32 = 60;

/// Default maximum routes per `apply_routes` batch.
pub const DEFAULT_MAX_BATCH_SIZE: u32 = 50;

/// Default deadline for EVM collaborator queries in milliseconds.
pub const DEFAULT_EVM_TIMEOUT_MS: u64 = 5000;

/// Dispatcher configuration. Unknown keys are rejected at parse time.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatcherConfig {
    /// Minimum seconds between `commit_root` and `activate`.
    pub activation_delay: u64,

    /// Grace window subtracted from the timelock at activation.
    pub eta_grace: u32,

    /// Maximum routes per `apply_routes` batch.
    pub max_batch_size: u32,

    /// Deadline for each EVM collaborator query, in milliseconds.
    pub evm_timeout_ms: u64,

    /// Deployer address: the initial `ADMIN`.
    pub deployer: Address,

    /// Guardian address: the initial `EMERGENCY` holder.
    pub guardian: Address,
}

impl DispatcherConfig {
    /// Creates a config with production defaults for the given deployer and
    /// guardian.
    #[must_use]
    pub fn new(deployer: Address, guardian: Address) -> Self {
        Self {
            activation_delay: DEFAULT_ACTIVATION_DELAY_SECS,
            eta_grace: DEFAULT_ETA_GRACE_SECS,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            evm_timeout_ms: DEFAULT_EVM_TIMEOUT_MS,
            deployer,
            guardian,
        }
    }

    /// Create a config for testing: no timelock, tiny batches, short
    /// deadlines, fixed addresses.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            activation_delay: 0,
            eta_grace: 0,
            max_batch_size: 8,
            evm_timeout_ms: 250,
            deployer: Address::new([0xAD; 20]),
            guardian: Address::new([0xE1; 20]),
        }
    }

    /// Validates construction-time parameters.
    pub fn validate(&self) -> Result<(), DispatcherError> {
        if self.deployer.is_zero() {
            return Err(DispatcherError::InvalidConfig(
                "zero deployer address".to_string(),
            ));
        }
        if self.guardian.is_zero() {
            return Err(DispatcherError::InvalidConfig(
                "zero guardian address".to_string(),
            ));
        }
        if self.max_batch_size == 0 {
            return Err(DispatcherError::InvalidConfig(
                "max_batch_size must be positive".to_string(),
            ));
        }
        if self.evm_timeout_ms == 0 {
            return Err(DispatcherError::InvalidConfig(
                "evm_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
