//! # CREATE2-Style Address Prediction
//!
//! Address = `keccak256(0xff ‖ deployer ‖ salt ‖ keccak256(init_code))[12..]`
//!
//! Per EIP-1014. The prediction is chain-independent: any EVM-compatible
//! network deploying the same triple lands on the same address.

use crate::errors::DeployError;
use mf_codec::keccak256;
use shared_types::{Address, Digest};

/// Maximum deployable runtime/init code size in bytes (EIP-170).
pub const MAX_INIT_CODE_SIZE: usize = 24_576;

/// Predicts the deployment address for `(deployer, salt, init_code_hash)`.
#[must_use]
pub fn create2_address(deployer: Address, salt: Digest, init_code_hash: Digest) -> Address {
    let mut data = Vec::with_capacity(85);
    data.push(0xff);
    data.extend_from_slice(deployer.as_bytes());
    data.extend_from_slice(salt.as_bytes());
    data.extend_from_slice(init_code_hash.as_bytes());

    let hash = keccak256(&data);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash.as_bytes()[12..32]);
    Address::new(addr)
}

/// Predicts the deployment address from the raw init code.
///
/// Validates the code first, then hashes it and delegates to
/// [`create2_address`].
pub fn create2_address_from_code(
    deployer: Address,
    salt: Digest,
    init_code: &[u8],
) -> Result<Address, DeployError> {
    validate_init_code(init_code)?;
    Ok(create2_address(deployer, salt, keccak256(init_code)))
}

/// Validates that a byte payload is deployable: non-empty and within the
/// 24,576-byte limit.
pub fn validate_init_code(init_code: &[u8]) -> Result<(), DeployError> {
    if init_code.is_empty() {
        return Err(DeployError::EmptyInitCode);
    }
    if init_code.len() > MAX_INIT_CODE_SIZE {
        return Err(DeployError::CodeSizeExceeded {
            size: init_code.len(),
            max: MAX_INIT_CODE_SIZE,
        });
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
