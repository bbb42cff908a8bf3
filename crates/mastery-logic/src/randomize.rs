//! Random valid builds.
//!
//! Picks are drawn one at a time from the nodes that are selectable at that
//! moment, so the result always satisfies every selection rule. The same
//! seed always gives the same build.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::adjacency::AdjacencyMap;
use crate::node::{ActiveSet, NodeId};
use crate::rules::can_select;

/// Build up to `picks` masteries at random, stopping early once nothing is
/// selectable.
pub fn random_build(graph: &AdjacencyMap, seed: u64, picks: usize) -> ActiveSet {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut active = ActiveSet::new();

    for _ in 0..picks {
        let available: Vec<NodeId> = NodeId::all()
            .filter(|&id| can_select(id, &active, graph))
            .collect();
        match available.choose(&mut rng) {
            Some(&id) => {
                active.insert(id);
            }
            None => break,
        }
    }

    active
}
