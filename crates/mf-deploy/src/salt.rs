//! # Salt Derivation
//!
//! Deterministic salts over the tightly-packed encoder. Three variants:
//!
//! - **universal**: binds project tag, deployer, content hash, nonce, and
//!   version - the cross-network anchor for one logical artifact.
//! - **facet**: per-facet enhanced salt over a `"chunk:"`-prefixed inner
//!   hash of `(name, version, nonce)`.
//! - **dispatcher**: binds version, network tag, and the admin address.

use crate::errors::DeployError;
use mf_codec::PackedEncoder;
use serde::{Deserialize, Serialize};
use shared_types::{Address, Digest};

/// Derives the universal placement salt for a content-addressed artifact.
///
/// `keccak256(project_tag ‖ deployer(20) ‖ content_hash(32) ‖ be32(nonce) ‖ version)`
pub fn universal_salt(
    project_tag: &str,
    deployer: Address,
    content_hash: Digest,
    nonce: u64,
    version: &str,
) -> Result<Digest, DeployError> {
    if project_tag.is_empty() {
        return Err(DeployError::ConfigInvalid("empty project_tag".to_string()));
    }
    if version.is_empty() {
        return Err(DeployError::ConfigInvalid("empty version".to_string()));
    }
    if deployer.is_zero() {
        return Err(DeployError::ConfigInvalid("zero deployer".to_string()));
    }

    Ok(PackedEncoder::new()
        .str(project_tag)
        .address(deployer)
        .digest(content_hash)
        .uint(nonce)
        .str(version)
        .hash())
}

/// Derives the per-facet salt.
///
/// `keccak256("chunk:" ‖ keccak256(name ‖ version ‖ be32(nonce)))`
pub fn facet_salt(name: &str, version: &str, nonce: u64) -> Result<Digest, DeployError> {
    if name.is_empty() {
        return Err(DeployError::ConfigInvalid("empty name".to_string()));
    }
    if version.is_empty() {
        return Err(DeployError::ConfigInvalid("empty version".to_string()));
    }

    let inner = PackedEncoder::new()
        .str(name)
        .str(version)
        .uint(nonce)
        .hash();
    Ok(PackedEncoder::new().str("chunk:").digest(inner).hash())
}

/// Derives the dispatcher deployment salt.
///
/// `keccak256(version ‖ network_tag ‖ admin(20))`
pub fn dispatcher_salt(
    version: &str,
    network_tag: &str,
    admin: Address,
) -> Result<Digest, DeployError> {
    if version.is_empty() {
        return Err(DeployError::ConfigInvalid("empty version".to_string()));
    }
    if network_tag.is_empty() {
        return Err(DeployError::ConfigInvalid("empty network_tag".to_string()));
    }
    if admin.is_zero() {
        return Err(DeployError::ConfigInvalid("zero admin".to_string()));
    }

    Ok(PackedEncoder::new()
        .str(version)
        .str(network_tag)
        .address(admin)
        .hash())
}

// =============================================================================
// DEPLOYMENT PLAN
// =============================================================================

/// The identity a deployment derives all of its salts from. Unknown keys
/// are rejected at parse time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeploymentPlan {
    /// Project namespace tag.
    pub project_tag: String,
    /// Artifact version string.
    pub version: String,
    /// Target network tag (informational; salts stay network-independent
    /// except for the dispatcher's own placement).
    pub network_tag: String,
    /// Deployment nonce.
    pub nonce: u64,
    /// Deploying factory address.
    pub deployer: Address,
    /// Dispatcher admin address.
    pub admin: Address,
}

impl DeploymentPlan {
    /// Validates every field the salt derivations require.
    pub fn validate(&self) -> Result<(), DeployError> {
        if self.project_tag.is_empty() {
            return Err(DeployError::ConfigInvalid("empty project_tag".to_string()));
        }
        if self.version.is_empty() {
            return Err(DeployError::ConfigInvalid("empty version".to_string()));
        }
        if self.network_tag.is_empty() {
            return Err(DeployError::ConfigInvalid("empty network_tag".to_string()));
        }
        if self.deployer.is_zero() {
            return Err(DeployError::ConfigInvalid("zero deployer".to_string()));
        }
        if self.admin.is_zero() {
            return Err(DeployError::ConfigInvalid("zero admin".to_string()));
        }
        Ok(())
    }

    /// Universal salt for a payload with the given content hash.
    pub fn universal_salt(&self, content_hash: Digest) -> Result<Digest, DeployError> {
        universal_salt(
            &self.project_tag,
            self.deployer,
            content_hash,
            self.nonce,
            &self.version,
        )
    }

    /// Per-facet salt for a named facet.
    pub fn facet_salt(&self, name: &str) -> Result<Digest, DeployError> {
        facet_salt(name, &self.version, self.nonce)
    }

    /// Salt for the dispatcher's own placement.
    pub fn dispatcher_salt(&self) -> Result<Digest, DeployError> {
        dispatcher_salt(&self.version, &self.network_tag, self.admin)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mf_codec::keccak256;

    fn plan() -> DeploymentPlan {
        DeploymentPlan {
            project_tag: "manifold".to_string(),
            version: "1.2.0".to_string(),
            network_tag: "mainnet".to_string(),
            nonce: 7,
            deployer: Address::new([0x11; 20]),
            admin: Address::new([0x22; 20]),
        }
    }

    #[test]
    fn test_universal_salt_deterministic() {
        let content = keccak256(b"payload");
        let a = universal_salt("manifold", Address::new([0x11; 20]), content, 7, "1.2.0").unwrap();
        let b = universal_salt("manifold", Address::new([0x11; 20]), content, 7, "1.2.0").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_universal_salt_sensitive_to_every_field() {
        let content = keccak256(b"payload");
        let base = universal_salt("manifold", Address::new([0x11; 20]), content, 7, "1.2.0").unwrap();

        let other_tag =
            universal_salt("other", Address::new([0x11; 20]), content, 7, "1.2.0").unwrap();
        let other_deployer =
            universal_salt("manifold", Address::new([0x12; 20]), content, 7, "1.2.0").unwrap();
        let other_nonce =
            universal_salt("manifold", Address::new([0x11; 20]), content, 8, "1.2.0").unwrap();
        let other_version =
            universal_salt("manifold", Address::new([0x11; 20]), content, 7, "1.2.1").unwrap();

        assert_ne!(base, other_tag);
        assert_ne!(base, other_deployer);
        assert_ne!(base, other_nonce);
        assert_ne!(base, other_version);
    }

    #[test]
    fn test_universal_salt_rejects_bad_config() {
        let content = Digest::ZERO;
        assert!(universal_salt("", Address::new([1u8; 20]), content, 0, "v").is_err());
        assert!(universal_salt("t", Address::new([1u8; 20]), content, 0, "").is_err());
        assert!(universal_salt("t", Address::ZERO, content, 0, "v").is_err());
    }

    #[test]
    fn test_facet_salt_layout() {
        let salt = facet_salt("treasury", "1.0.0", 3).unwrap();

        let inner = PackedEncoder::new()
            .str("treasury")
            .str("1.0.0")
            .uint(3)
            .hash();
        let expected = PackedEncoder::new().str("chunk:").digest(inner).hash();
        assert_eq!(salt, expected);
    }

    #[test]
    fn test_facet_salt_differs_from_universal() {
        let content = keccak256(b"treasury");
        let universal =
            universal_salt("treasury", Address::new([1u8; 20]), content, 3, "1.0.0").unwrap();
        let facet = facet_salt("treasury", "1.0.0", 3).unwrap();
        assert_ne!(universal, facet);
    }

    #[test]
    fn test_dispatcher_salt_rejects_zero_admin() {
        assert!(matches!(
            dispatcher_salt("1.0.0", "mainnet", Address::ZERO),
            Err(DeployError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_plan_validate() {
        assert!(plan().validate().is_ok());

        let mut bad = plan();
        bad.network_tag.clear();
        assert!(bad.validate().is_err());

        let mut bad = plan();
        bad.admin = Address::ZERO;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_plan_salts_are_consistent_with_free_functions() {
        let p = plan();
        let content = keccak256(b"chunk");
        assert_eq!(
            p.universal_salt(content).unwrap(),
            universal_salt(&p.project_tag, p.deployer, content, p.nonce, &p.version).unwrap()
        );
        assert_eq!(
            p.dispatcher_salt().unwrap(),
            dispatcher_salt(&p.version, &p.network_tag, p.admin).unwrap()
        );
    }
}
