//! Connectivity pruning for active masteries.
//!
//! After a node is removed, deeper picks that hung from it may no longer be
//! connected to their branch's tier-1 anchor. A depth-first walk from each
//! anchor over active nodes finds what is still reachable; everything else
//! in that branch is dropped. A branch with no anchor is cleared outright.

use std::collections::HashSet;

use crate::adjacency::AdjacencyMap;
use crate::node::{ActiveSet, Branch, NodeId};

/// Active nodes reachable from an active anchor of their own branch.
///
/// Walks child links (next tier, `col-1..=col+1`) and lateral links
/// (same tier, `col±1`) through active nodes only.
pub fn reachable(active: &ActiveSet, graph: &AdjacencyMap) -> HashSet<NodeId> {
    let mut seen = HashSet::new();
    for branch in Branch::ALL {
        let mut stack: Vec<NodeId> = active.in_branch(branch).filter(NodeId::is_anchor).collect();
        seen.extend(stack.iter().copied());

        while let Some(current) = stack.pop() {
            let next = graph.children(current).iter().chain(graph.lateral(current));
            for &n in next {
                if active.contains(n) && seen.insert(n) {
                    stack.push(n);
                }
            }
        }
    }
    seen
}

/// Remove every active node that is no longer connected to its anchor.
///
/// Returns the removed nodes; an empty result means nothing changed, and a
/// second call right after is always a no-op.
pub fn validate_active_connections(active: &mut ActiveSet, graph: &AdjacencyMap) -> Vec<NodeId> {
    let keep = reachable(active, graph);
    let pruned: Vec<NodeId> = active.iter().filter(|id| !keep.contains(id)).collect();

    for &id in &pruned {
        active.remove(id);
    }

    if !pruned.is_empty() {
        log::debug!(
            "Pruned {} disconnected masteries: {}",
            pruned.len(),
            pruned
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    pruned
}
