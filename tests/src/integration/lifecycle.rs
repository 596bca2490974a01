//! # Lifecycle Choreography
//!
//! End-to-end commit -> apply -> activate scenarios driven through the
//! service with the in-memory EVM, a recording event sink, and a manual
//! clock.

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use mf_codec::keccak256;
    use mf_dispatcher::config::DispatcherConfig;
    use mf_dispatcher::prelude::*;
    use mf_manifest::{Manifest, ManifestBuilder};
    use shared_types::{Address, Digest, Role, Selector};

    const OPERATOR: Address = Address([0x0E; 20]);

    type TestService = DispatcherService<InMemoryEvm, RecordingEventSink, ManualTimeSource>;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Wires a service with the given delays, OPERATOR holding COMMIT and
    /// APPLY, and the clock at 1000.
    fn build_service(
        activation_delay: u64,
        eta_grace: u32,
    ) -> (
        TestService,
        Arc<InMemoryEvm>,
        Arc<RecordingEventSink>,
        Arc<ManualTimeSource>,
        Address,
    ) {
        let mut config = DispatcherConfig::for_testing();
        config.activation_delay = activation_delay;
        config.eta_grace = eta_grace;
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
        (service, evm, sink, time, admin)
    }

    async fn grant_operator(service: &TestService, admin: Address) {
        service
            .grant_role(admin, Role::Commit, OPERATOR)
            .await
            .unwrap();
        service
            .grant_role(admin, Role::Apply, OPERATOR)
            .await
            .unwrap();
    }

    /// Single-route fixture: selector 0xb5211ec4 routed to the A11CE facet
    /// running "codeA".
    fn single_route_fixture(evm: &InMemoryEvm) -> (Selector, Address, Manifest) {
        let selector = Selector::new([0xb5, 0x21, 0x1e, 0xc4]);
        let facet = Address::from_str("0x00000000000000000000000000000000000a11ce").unwrap();
        evm.set_code(facet, b"codeA".to_vec());

        let manifest = ManifestBuilder::new("1.0.0")
            .with_route(selector, facet, keccak256(b"codeA"))
            .build()
            .unwrap();
        (selector, facet, manifest)
    }

    // =============================================================================
    // SCENARIO 1: FRESH TO ACTIVE, SINGLE ROUTE
    // =============================================================================

    #[tokio::test]
    async fn test_fresh_to_active_single_route() {
        let (service, evm, sink, _time, admin) = build_service(0, 0);
        grant_operator(&service, admin).await;
        let (selector, facet, manifest) = single_route_fixture(&evm);

        // A 1-leaf manifest's root is the hash of its single leaf, and the
        // proof is empty.
        assert_eq!(
            manifest.root,
            keccak256(&mf_codec::encode_leaf(selector, facet, keccak256(b"codeA")))
        );
        assert!(manifest.routes[0].proof.siblings.is_empty());

        service
            .commit_root(OPERATOR, manifest.root, 1)
            .await
            .unwrap();
        service
            .apply_routes(OPERATOR, &manifest.routes)
            .await
            .unwrap();
        let epoch = service.activate(OPERATOR).await.unwrap();

        assert_eq!(epoch, 1);
        assert_eq!(service.active_root().await, manifest.root);
        assert_eq!(service.active_epoch().await, 1);
        assert_eq!(service.route(selector).await.unwrap().facet, facet);

        // Committed -> RoutesApplied -> Activated, in order, after the grants.
        let names: Vec<&str> = sink.take().iter().map(DispatcherEvent::name).collect();
        assert_eq!(
            names,
            vec![
                "RoleGranted",
                "RoleGranted",
                "Committed",
                "SelectorRouted",
                "RoutesApplied",
                "Activated"
            ]
        );
    }

    // =============================================================================
    // SCENARIO 2: TIMELOCK ENFORCEMENT
    // =============================================================================

    #[tokio::test]
    async fn test_timelock_enforcement() {
        let (service, evm, _sink, time, admin) = build_service(3600, 0);
        grant_operator(&service, admin).await;
        let (_selector, _facet, manifest) = single_route_fixture(&evm);

        service
            .commit_root(OPERATOR, manifest.root, 1)
            .await
            .unwrap();
        service
            .apply_routes(OPERATOR, &manifest.routes)
            .await
            .unwrap();

        time.set(1000 + 3599);
        assert!(matches!(
            service.activate(OPERATOR).await.unwrap_err(),
            DispatcherError::ActivationNotReady { .. }
        ));

        time.set(1000 + 3600);
        assert_eq!(service.activate(OPERATOR).await.unwrap(), 1);
    }

    // =============================================================================
    // SCENARIO 3: REPLAY
    // =============================================================================

    #[tokio::test]
    async fn test_replay_of_activated_root() {
        let (service, evm, _sink, _time, admin) = build_service(0, 0);
        grant_operator(&service, admin).await;
        let (_selector, _facet, manifest) = single_route_fixture(&evm);

        service
            .commit_root(OPERATOR, manifest.root, 1)
            .await
            .unwrap();
        service
            .apply_routes(OPERATOR, &manifest.routes)
            .await
            .unwrap();
        service.activate(OPERATOR).await.unwrap();

        assert_eq!(
            service
                .commit_root(OPERATOR, manifest.root, 2)
                .await
                .unwrap_err(),
            DispatcherError::RootConsumed(manifest.root)
        );
    }

    // =============================================================================
    // SCENARIO 4: CODE-HASH DRIFT
    // =============================================================================

    #[tokio::test]
    async fn test_code_hash_drift_between_apply_and_activate() {
        let (service, evm, _sink, _time, admin) = build_service(0, 0);
        grant_operator(&service, admin).await;
        let (selector, facet, manifest) = single_route_fixture(&evm);

        service
            .commit_root(OPERATOR, manifest.root, 1)
            .await
            .unwrap();
        service
            .apply_routes(OPERATOR, &manifest.routes)
            .await
            .unwrap();

        // The facet's code changes under the pending root.
        evm.set_code(facet, b"codeB".to_vec());
        let err = service.activate(OPERATOR).await.unwrap_err();
        assert_eq!(
            err,
            DispatcherError::CodehashMismatch {
                selector,
                expected: keccak256(b"codeA"),
                observed: keccak256(b"codeB"),
            }
        );

        // State unchanged: still pending, nothing active.
        assert!(service.pending_root().await.is_some());
        assert!(service.active_root().await.is_zero());
        assert_eq!(service.active_epoch().await, 0);

        // Restoring the original code lets the next activate succeed.
        evm.set_code(facet, b"codeA".to_vec());
        assert_eq!(service.activate(OPERATOR).await.unwrap(), 1);
    }

    // =============================================================================
    // SCENARIO 5: BATCH ATOMICITY
    // =============================================================================

    #[tokio::test]
    async fn test_batch_atomicity_on_corrupted_proof() {
        let (service, evm, sink, _time, admin) = build_service(0, 0);
        grant_operator(&service, admin).await;

        let facets: Vec<Address> = (1..=3u8).map(|n| Address::new([n; 20])).collect();
        let mut builder = ManifestBuilder::new("1.0.0");
        for (i, &facet) in facets.iter().enumerate() {
            let n = u8::try_from(i + 1).unwrap();
            evm.set_code(facet, vec![n]);
            builder.add_route(Selector::new([n, 0, 0, n]), facet, keccak256(&[n]));
        }
        let manifest = builder.build().unwrap();

        service
            .commit_root(OPERATOR, manifest.root, 1)
            .await
            .unwrap();
        sink.take();

        // Corrupt the middle route's proof.
        let mut batch = manifest.routes.clone();
        batch[1].proof.siblings[0].0[7] ^= 0x01;

        let err = service.apply_routes(OPERATOR, &batch).await.unwrap_err();
        assert!(matches!(err, DispatcherError::InvalidProof { .. }));

        // The whole batch was rejected: no routes, no facets, no events.
        for route in &manifest.routes {
            assert!(service.route(route.selector).await.is_none());
        }
        assert!(service.facet_addresses().await.is_empty());
        assert!(sink.is_empty());

        // The uncorrupted batch applies cleanly afterwards.
        assert_eq!(
            service
                .apply_routes(OPERATOR, &manifest.routes)
                .await
                .unwrap(),
            3
        );
    }

    // =============================================================================
    // SCENARIO 6: RE-ROUTE CLEANS REVERSE INDEX
    // =============================================================================

    #[tokio::test]
    async fn test_reroute_cleans_reverse_index() {
        let (service, evm, _sink, time, admin) = build_service(0, 0);
        grant_operator(&service, admin).await;

        let selector = Selector::new([0x11, 0x11, 0x11, 0x11]);
        let facet_one = Address::new([0xF1; 20]);
        let facet_two = Address::new([0xF2; 20]);
        evm.set_code(facet_one, b"one".to_vec());
        evm.set_code(facet_two, b"two".to_vec());

        // Epoch 1: route to F1.
        let first = ManifestBuilder::new("1.0.0")
            .with_route(selector, facet_one, keccak256(b"one"))
            .build()
            .unwrap();
        service
            .commit_root(OPERATOR, first.root, 1)
            .await
            .unwrap();
        service.apply_routes(OPERATOR, &first.routes).await.unwrap();
        service.activate(OPERATOR).await.unwrap();
        assert_eq!(service.facet_address(selector).await, facet_one);

        // Epoch 2: re-route to F2.
        time.advance(100);
        let second = ManifestBuilder::new("2.0.0")
            .with_route(selector, facet_two, keccak256(b"two"))
            .build()
            .unwrap();
        service
            .commit_root(OPERATOR, second.root, 2)
            .await
            .unwrap();
        service.apply_routes(OPERATOR, &second.routes).await.unwrap();
        service.activate(OPERATOR).await.unwrap();

        assert!(service.facet_function_selectors(facet_one).await.is_empty());
        assert!(!service.facet_addresses().await.contains(&facet_one));
        assert_eq!(
            service.facet_function_selectors(facet_two).await,
            vec![selector]
        );
        assert!(service.facet_addresses().await.contains(&facet_two));
        assert_eq!(service.active_epoch().await, 2);
    }

    // =============================================================================
    // GOVERNANCE FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_freeze_ends_all_mutation() {
        let (service, evm, _sink, _time, admin) = build_service(0, 0);
        grant_operator(&service, admin).await;
        let (selector, _facet, manifest) = single_route_fixture(&evm);

        service
            .commit_root(OPERATOR, manifest.root, 1)
            .await
            .unwrap();
        service.freeze(admin).await.unwrap();

        assert_eq!(
            service
                .apply_routes(OPERATOR, &manifest.routes)
                .await
                .unwrap_err(),
            DispatcherError::Frozen
        );
        assert_eq!(
            service.activate(OPERATOR).await.unwrap_err(),
            DispatcherError::Frozen
        );
        assert_eq!(
            service.dispatch(selector, vec![]).await.unwrap_err(),
            DispatcherError::Frozen
        );
        assert_eq!(
            service.grant_role(admin, Role::Apply, OPERATOR).await.unwrap_err(),
            DispatcherError::Frozen
        );
    }

    #[tokio::test]
    async fn test_unauthorized_callers_rejected() {
        let (service, evm, _sink, _time, admin) = build_service(0, 0);
        let (_selector, _facet, manifest) = single_route_fixture(&evm);
        let stranger = Address::new([0x57; 20]);

        assert!(matches!(
            service
                .commit_root(stranger, manifest.root, 1)
                .await
                .unwrap_err(),
            DispatcherError::Unauthorized {
                role: Role::Commit,
                ..
            }
        ));
        assert!(matches!(
            service.pause(stranger).await.unwrap_err(),
            DispatcherError::Unauthorized {
                role: Role::Emergency,
                ..
            }
        ));
        assert!(matches!(
            service.freeze(stranger).await.unwrap_err(),
            DispatcherError::Unauthorized { role: Role::Admin, .. }
        ));
        // Admin itself lacks APPLY until granted.
        assert!(matches!(
            service.activate(admin).await.unwrap_err(),
            DispatcherError::Unauthorized { role: Role::Apply, .. }
        ));
    }
}
