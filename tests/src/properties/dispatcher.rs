//! # Dispatcher Properties
//!
//! Randomized operation sequences against the pure state machine, checking
//! the structural invariants after every successful mutation: forward and
//! reverse indexes agree, the facet list is exact, epochs never regress,
//! and activated roots never return.

#[cfg(test)]
mod tests {
    use mf_codec::keccak256;
    use mf_dispatcher::config::DispatcherConfig;
    use mf_dispatcher::domain::invariants::check_all_invariants;
    use mf_dispatcher::domain::state::DispatcherState;
    use mf_manifest::{Manifest, ManifestBuilder};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use shared_types::{Address, Digest, Role, Selector};
    use std::collections::{HashMap, HashSet};

    const OPERATOR: Address = Address([0x0E; 20]);

    fn operator_state() -> DispatcherState {
        let config = DispatcherConfig::for_testing();
        let mut state = DispatcherState::new(&config);
        state
            .grant_role(config.deployer, Role::Commit, OPERATOR)
            .unwrap();
        state
            .grant_role(config.deployer, Role::Apply, OPERATOR)
            .unwrap();
        state
    }

    /// Random manifest over a small facet/selector universe so re-routing
    /// and index cleanup get exercised constantly.
    fn random_manifest(rng: &mut StdRng, version: u64) -> Manifest {
        let count = rng.gen_range(1..=6);
        let mut selectors = HashSet::new();
        let mut builder = ManifestBuilder::new(format!("1.0.{version}"));

        while selectors.len() < count {
            let selector = Selector::new([rng.gen_range(0..8u8), 0, 0, 1]);
            if !selectors.insert(selector) {
                continue;
            }
            let facet = Address::new([rng.gen_range(1..5u8); 20]);
            // Tie the code hash to the facet so observed hashes are stable.
            builder.add_route(selector, facet, facet_code_hash(facet));
        }
        builder.build().unwrap()
    }

    fn facet_code_hash(facet: Address) -> Digest {
        keccak256(facet.as_bytes())
    }

    fn observed_for(manifest: &Manifest) -> HashMap<Address, Digest> {
        manifest
            .routes
            .iter()
            .map(|r| (r.facet, r.code_hash))
            .collect()
    }

    /// Observed hashes for the whole facet universe. Activation re-pins
    /// every selector touched since the last activation, which can reach
    /// facets a superseded pending root routed to.
    fn observed_universe() -> HashMap<Address, Digest> {
        (1..5u8)
            .map(|n| {
                let facet = Address::new([n; 20]);
                (facet, facet_code_hash(facet))
            })
            .collect()
    }

    #[test]
    fn test_invariants_hold_under_random_lifecycles() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut state = operator_state();
        let mut epoch = 0u64;
        let mut now = 1_000u64;

        for step in 0..200 {
            now += rng.gen_range(1..100);

            match rng.gen_range(0..10u8) {
                // Commit a fresh manifest most of the time.
                0..=4 => {
                    epoch += 1;
                    let manifest = random_manifest(&mut rng, epoch);
                    if state.commit_root(OPERATOR, manifest.root, epoch, now).is_err() {
                        // Root collision with a consumed root; skip this epoch.
                        epoch -= 1;
                        continue;
                    }
                    state.apply_routes(OPERATOR, &manifest.routes).unwrap();
                    state
                        .activate(OPERATOR, now, &observed_universe())
                        .unwrap();
                }
                // Apply without activating.
                5..=6 => {
                    epoch += 1;
                    let manifest = random_manifest(&mut rng, epoch + 10_000);
                    if state.commit_root(OPERATOR, manifest.root, epoch, now).is_err() {
                        epoch -= 1;
                        continue;
                    }
                    state.apply_routes(OPERATOR, &manifest.routes).unwrap();
                    // Leave it pending; a later commit supersedes it.
                    epoch -= 1;
                }
                // Pause/unpause churn.
                7 => {
                    let guardian = DispatcherConfig::for_testing().guardian;
                    if state.is_paused() {
                        state.unpause(guardian).unwrap();
                    } else {
                        state.pause(guardian).unwrap();
                    }
                }
                // Governance churn.
                _ => {
                    let admin = DispatcherConfig::for_testing().deployer;
                    state
                        .set_max_batch_size(admin, rng.gen_range(6..=16))
                        .unwrap();
                }
            }

            let violations = check_all_invariants(&state);
            assert!(
                violations.is_empty(),
                "invariant violations after step {step}: {violations:?}"
            );
        }
    }

    #[test]
    fn test_epoch_is_monotone_and_strictly_increases_on_activation() {
        let mut rng = StdRng::seed_from_u64(0xcafe);
        let mut state = operator_state();
        let mut last_epoch = 0u64;

        for round in 1..=40u64 {
            let manifest = random_manifest(&mut rng, round);
            let epoch = last_epoch + rng.gen_range(1..4);

            if state
                .commit_root(OPERATOR, manifest.root, epoch, round * 10)
                .is_err()
            {
                continue;
            }
            state.apply_routes(OPERATOR, &manifest.routes).unwrap();
            state
                .activate(OPERATOR, round * 10, &observed_for(&manifest))
                .unwrap();

            assert!(state.active_epoch() > last_epoch);
            last_epoch = state.active_epoch();
        }
    }

    #[test]
    fn test_activated_roots_never_return() {
        let mut rng = StdRng::seed_from_u64(0xbeef);
        let mut state = operator_state();
        let mut activated = Vec::new();

        for round in 1..=20u64 {
            let manifest = random_manifest(&mut rng, round);
            if state
                .commit_root(OPERATOR, manifest.root, round, round)
                .is_err()
            {
                continue;
            }
            state.apply_routes(OPERATOR, &manifest.routes).unwrap();
            state
                .activate(OPERATOR, round, &observed_for(&manifest))
                .unwrap();
            activated.push(manifest.root);

            // Every previously activated root is permanently rejected.
            for &root in &activated {
                assert!(state.is_root_consumed(root));
                assert!(matches!(
                    state.commit_root(OPERATOR, root, round + 100, round),
                    Err(mf_dispatcher::domain::errors::DispatcherError::RootConsumed(_))
                ));
            }
        }
    }

    #[test]
    fn test_facet_list_matches_reverse_index_exactly() {
        let mut rng = StdRng::seed_from_u64(0xf00d);
        let mut state = operator_state();

        for round in 1..=30u64 {
            let manifest = random_manifest(&mut rng, round);
            if state
                .commit_root(OPERATOR, manifest.root, round, round)
                .is_err()
            {
                continue;
            }
            state.apply_routes(OPERATOR, &manifest.routes).unwrap();
            state
                .activate(OPERATOR, round, &observed_for(&manifest))
                .unwrap();

            // Every listed facet serves >= 1 selector, and every routed
            // selector's facet is listed.
            for facet in state.facet_addresses() {
                assert!(!state.facet_function_selectors(facet).is_empty());
            }
            for (facet, selectors) in state.facets() {
                for selector in selectors {
                    assert_eq!(state.facet_address(selector), facet);
                }
            }
        }
    }
}
