//! # Deployment Choreography
//!
//! The full placement flow: derive salts from a deployment plan, deploy
//! facets onto their predicted CREATE2 addresses, bind signatures to the
//! deployed code in a manifest, ship the manifest over the compact wire,
//! and route through the dispatcher.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mf_codec::selector_from_signature;
    use mf_deploy::{create2_address, create2_address_from_code, DeploymentPlan};
    use mf_dispatcher::config::DispatcherConfig;
    use mf_dispatcher::prelude::*;
    use mf_manifest::{FileManifestStore, InMemoryManifestStore, Manifest, ManifestBuilder, ManifestStore};
    use shared_types::{Address, Role};

    const OPERATOR: Address = Address([0x0E; 20]);

    fn plan(deployer: Address) -> DeploymentPlan {
        DeploymentPlan {
            project_tag: "manifold".to_string(),
            version: "1.0.0".to_string(),
            network_tag: "testnet".to_string(),
            nonce: 1,
            deployer,
            admin: Address::new([0xAA; 20]),
        }
    }

    #[tokio::test]
    async fn test_salt_to_dispatch_round_trip() {
        let config = DispatcherConfig::for_testing();
        let admin = config.deployer;
        let evm = Arc::new(InMemoryEvm::new(config.deployer));
        let sink = Arc::new(RecordingEventSink::new());
        let time = Arc::new(ManualTimeSource::new(1000));
        let service = DispatcherService::new(
            config,
            Arc::clone(&evm),
            Arc::clone(&sink),
            Arc::clone(&time),
        )
        .unwrap();
        service
            .grant_role(admin, Role::Commit, OPERATOR)
            .await
            .unwrap();
        service
            .grant_role(admin, Role::Apply, OPERATOR)
            .await
            .unwrap();

        let plan = plan(evm.deployer());
        plan.validate().unwrap();

        // Deploy two facets onto their predicted addresses.
        let facet_specs: [(&str, &[u8], &str); 2] = [
            ("treasury", &[0x60, 0x01], "sweep(address)"),
            ("registry", &[0x60, 0x02], "register(bytes32,address)"),
        ];

        let mut builder = ManifestBuilder::new(plan.version.clone());
        for (name, init_code, signature) in facet_specs {
            let salt = plan.facet_salt(name).unwrap();
            let predicted =
                create2_address_from_code(plan.deployer, salt, init_code).unwrap();

            let deployed = evm.deploy(salt, init_code).await.unwrap();
            assert_eq!(deployed, predicted, "deployment must realize the prediction");

            let code_hash = evm.code_hash(deployed).await.unwrap();
            builder.add_route(selector_from_signature(signature), deployed, code_hash);
        }
        let manifest = builder.build().unwrap();
        assert!(manifest.verify());

        // Ship the manifest over the compact wire before applying.
        let wire = manifest.to_compact().unwrap();
        let received = Manifest::from_compact(&wire).unwrap();
        assert_eq!(received.root, manifest.root);

        service
            .commit_root(OPERATOR, received.root, 1)
            .await
            .unwrap();
        service
            .apply_routes(OPERATOR, &received.routes)
            .await
            .unwrap();
        service.activate(OPERATOR).await.unwrap();

        // Dispatch through a signature-derived selector.
        let sweep = selector_from_signature("sweep(address)");
        let (facet, calldata) = service.dispatch(sweep, vec![0x01, 0x02]).await.unwrap();
        assert_eq!(facet, service.facet_address(sweep).await);
        assert_eq!(calldata, vec![0x01, 0x02]);
    }

    #[test]
    fn test_predictions_are_network_independent() {
        // Two "networks" with identical deployers and salts land on the same
        // address; the network tag only influences the dispatcher's own salt.
        let deployer = Address::new([0x11; 20]);
        let mut plan_a = plan(deployer);
        let mut plan_b = plan(deployer);
        plan_a.network_tag = "mainnet".to_string();
        plan_b.network_tag = "testnet".to_string();

        let salt_a = plan_a.facet_salt("treasury").unwrap();
        let salt_b = plan_b.facet_salt("treasury").unwrap();
        assert_eq!(salt_a, salt_b);

        let code_hash = mf_codec::keccak256(&[0x60, 0x01]);
        assert_eq!(
            create2_address(deployer, salt_a, code_hash),
            create2_address(deployer, salt_b, code_hash)
        );

        // The dispatcher placement does differ per network.
        assert_ne!(
            plan_a.dispatcher_salt().unwrap(),
            plan_b.dispatcher_salt().unwrap()
        );
    }

    #[test]
    fn test_manifest_store_round_trip_preserves_root() {
        let manifest = ManifestBuilder::new("1.0.0")
            .with_route(
                selector_from_signature("transfer(address,uint256)"),
                Address::new([0x01; 20]),
                mf_codec::keccak256(b"code"),
            )
            .build()
            .unwrap();

        let memory = InMemoryManifestStore::new();
        memory.write_manifest("release", &manifest).unwrap();
        assert_eq!(memory.read_manifest("release").unwrap().root, manifest.root);

        let dir = tempfile::tempdir().unwrap();
        let files = FileManifestStore::new(dir.path());
        files.write_manifest("release", &manifest).unwrap();
        let loaded = files.read_manifest("release").unwrap();
        assert_eq!(loaded, manifest);
        assert!(loaded.verify());
    }
}
