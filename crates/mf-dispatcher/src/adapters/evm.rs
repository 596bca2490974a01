//! # In-Memory EVM Client
//!
//! Account-code map with CREATE2-faithful deployment. Production wires a
//! live client here; tests use this adapter to stage facets and to drive
//! code-hash drift by re-pointing an address at different code.

use crate::ports::outbound::{EvmClient, EvmError};
use async_trait::async_trait;
use mf_deploy::create2_address_from_code;
use shared_types::{Address, Digest};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory EVM state for testing and local orchestration.
#[derive(Debug)]
pub struct InMemoryEvm {
    deployer: Address,
    code: RwLock<HashMap<Address, Vec<u8>>>,
}

impl InMemoryEvm {
    /// Creates an empty EVM whose deployments originate from `deployer`.
    #[must_use]
    pub fn new(deployer: Address) -> Self {
        Self {
            deployer,
            code: RwLock::new(HashMap::new()),
        }
    }

    /// The deploying factory address.
    #[must_use]
    pub fn deployer(&self) -> Address {
        self.deployer
    }

    /// Installs runtime code at an address directly, bypassing deployment.
    /// This is the code-hash-drift lever for tests.
    pub fn set_code(&self, address: Address, code: Vec<u8>) {
        if let Ok(mut map) = self.code.write() {
            map.insert(address, code);
        }
    }

    /// Removes the code at an address.
    pub fn clear_code(&self, address: Address) {
        if let Ok(mut map) = self.code.write() {
            map.remove(&address);
        }
    }
}

#[async_trait]
impl EvmClient for InMemoryEvm {
    async fn code_at(&self, address: Address) -> Result<Vec<u8>, EvmError> {
        self.code
            .read()
            .map_err(|_| EvmError::Unavailable("code map lock poisoned".to_string()))
            .map(|map| map.get(&address).cloned().unwrap_or_default())
    }

    async fn deploy(&self, salt: Digest, init_code: &[u8]) -> Result<Address, EvmError> {
        let address = create2_address_from_code(self.deployer, salt, init_code)
            .map_err(|e| EvmError::DeployFailed(e.to_string()))?;

        let mut map = self
            .code
            .write()
            .map_err(|_| EvmError::Unavailable("code map lock poisoned".to_string()))?;
        if map.contains_key(&address) {
            return Err(EvmError::DeployFailed(format!(
                "address already occupied: {address:?}"
            )));
        }
        // The in-memory model treats init code as the runtime code.
        map.insert(address, init_code.to_vec());
        Ok(address)
    }
}

// =============================================================================
// TESTS
// =============================================================================
