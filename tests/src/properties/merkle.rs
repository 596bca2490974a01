//! # Merkle Properties
//!
//! Randomized checks over the commitment scheme: every built proof
//! verifies, construction is canonical under permutation, and single-byte
//! corruption is always detected.

#[cfg(test)]
mod tests {
    use mf_codec::encode_leaf_fields;
    use mf_merkle::{verify_leaf_fields, verify_route, OrderedMerkleTree};
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use shared_types::{Address, Digest, Route, Selector};
    use std::collections::HashSet;

    /// Distinct random routes; selectors are unique.
    fn random_routes(rng: &mut StdRng, count: usize) -> Vec<Route> {
        let mut seen = HashSet::new();
        let mut routes = Vec::with_capacity(count);
        while routes.len() < count {
            let selector = Selector::new(rng.gen());
            if !seen.insert(selector) {
                continue;
            }
            routes.push(Route::new(
                selector,
                Address::new(rng.gen()),
                Digest::new(rng.gen()),
            ));
        }
        routes
    }

    #[test]
    fn test_round_trip_for_random_trees() {
        let mut rng = StdRng::seed_from_u64(0xfacade);

        for _ in 0..32 {
            let count = rng.gen_range(1..=40);
            let routes = random_routes(&mut rng, count);
            let tree = OrderedMerkleTree::from_routes(&routes).unwrap();

            for route in &routes {
                let proof = tree.proof_for_route(route).unwrap();
                assert!(
                    verify_route(route, &proof, tree.root()),
                    "round trip failed at tree size {count}"
                );
            }
        }
    }

    #[test]
    fn test_root_is_canonical_under_permutation() {
        let mut rng = StdRng::seed_from_u64(0x0c0ffee);

        for _ in 0..16 {
            let count = rng.gen_range(2..=24);
            let routes = random_routes(&mut rng, count);
            let root = OrderedMerkleTree::from_routes(&routes).unwrap().root();

            for _ in 0..4 {
                let mut shuffled = routes.clone();
                shuffled.shuffle(&mut rng);
                assert_eq!(
                    OrderedMerkleTree::from_routes(&shuffled).unwrap().root(),
                    root
                );
            }
        }
    }

    #[test]
    fn test_single_byte_corruption_falsifies_proof() {
        let mut rng = StdRng::seed_from_u64(0xdeed);
        let routes = random_routes(&mut rng, 13);
        let tree = OrderedMerkleTree::from_routes(&routes).unwrap();

        for route in &routes {
            let proof = tree.proof_for_route(route).unwrap();

            // Corrupt one random byte of one random sibling.
            for _ in 0..8 {
                let mut corrupted = proof.clone();
                let level = rng.gen_range(0..corrupted.siblings.len());
                let byte = rng.gen_range(0..32);
                corrupted.siblings[level].0[byte] ^= rng.gen_range(1..=u8::MAX);
                assert!(!verify_route(route, &corrupted, tree.root()));
            }

            // Corrupt one random byte of the leaf fields.
            let fields = encode_leaf_fields(route.selector, route.facet, route.code_hash);
            for _ in 0..8 {
                let mut dirty = fields;
                let byte = rng.gen_range(0..fields.len());
                dirty[byte] ^= rng.gen_range(1..=u8::MAX);
                assert!(!verify_leaf_fields(&dirty, &proof, tree.root()));
            }
        }
    }

    #[test]
    fn test_distinct_route_sets_have_distinct_roots() {
        let mut rng = StdRng::seed_from_u64(0xabba);
        let mut roots = HashSet::new();

        for _ in 0..64 {
            let num_routes = rng.gen_range(1..=8);
            let routes = random_routes(&mut rng, num_routes);
            let root = OrderedMerkleTree::from_routes(&routes).unwrap().root();
            assert!(roots.insert(root), "root collision across random sets");
        }
    }
}
