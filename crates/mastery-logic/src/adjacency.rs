//! Precomputed adjacency over the fixed tree shape.
//!
//! `AdjacencyMap` holds, per node, its parents (previous tier, columns
//! `col-1..=col+1`), children (next tier, same window) and lateral
//! neighbours (same tier, `col±1`). Edges never cross branches.

use std::collections::HashMap;

use crate::node::{Branch, NodeId};

#[derive(Debug, Clone, Default)]
struct Neighbors {
    parents: Vec<NodeId>,
    children: Vec<NodeId>,
    lateral: Vec<NodeId>,
}

/// Pre-built adjacency lists for all 66 nodes.
#[derive(Debug, Clone)]
pub struct AdjacencyMap {
    adj: HashMap<NodeId, Neighbors>,
}

impl Default for AdjacencyMap {
    fn default() -> Self {
        Self::new()
    }
}

impl AdjacencyMap {
    pub fn new() -> Self {
        let mut adj: HashMap<NodeId, Neighbors> = HashMap::new();
        for id in NodeId::all() {
            let window = |tier: u8| -> Vec<NodeId> {
                [id.column.wrapping_sub(1), id.column, id.column + 1]
                    .into_iter()
                    .filter_map(|col| NodeId::new(id.branch, tier, col))
                    .collect()
            };
            let lateral = [id.column.wrapping_sub(1), id.column + 1]
                .into_iter()
                .filter_map(|col| NodeId::new(id.branch, id.tier, col))
                .collect();
            adj.insert(
                id,
                Neighbors {
                    parents: window(id.tier.wrapping_sub(1)),
                    children: window(id.tier + 1),
                    lateral,
                },
            );
        }
        Self { adj }
    }

    /// Nodes one tier up whose selection makes `id` reachable.
    pub fn parents(&self, id: NodeId) -> &[NodeId] {
        self.adj.get(&id).map(|n| n.parents.as_slice()).unwrap_or(&[])
    }

    /// Nodes one tier down reachable from `id`.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.adj.get(&id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Same-tier neighbours of `id`.
    pub fn lateral(&self, id: NodeId) -> &[NodeId] {
        self.adj.get(&id).map(|n| n.lateral.as_slice()).unwrap_or(&[])
    }

    /// Every node of one branch known to the map.
    pub fn nodes_in(&self, branch: Branch) -> impl Iterator<Item = NodeId> + '_ {
        self.adj.keys().copied().filter(move |id| id.branch == branch)
    }

    pub fn node_count(&self) -> usize {
        self.adj.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> NodeId {
        s.parse().unwrap()
    }

    #[test]
    fn test_covers_every_node() {
        let graph = AdjacencyMap::new();
        assert_eq!(graph.node_count(), 66);
        assert_eq!(graph.nodes_in(Branch::Support).count(), 22);
    }

    #[test]
    fn test_anchor_has_no_parents() {
        let graph = AdjacencyMap::new();
        assert!(graph.parents(id("offense-1-2")).is_empty());
        assert_eq!(graph.lateral(id("offense-1-2")), &[id("offense-1-3")]);
    }

    #[test]
    fn test_anchor_children_window() {
        let graph = AdjacencyMap::new();
        assert_eq!(
            graph.children(id("offense-1-2")),
            &[id("offense-2-1"), id("offense-2-2"), id("offense-2-3")]
        );
        assert_eq!(
            graph.children(id("offense-1-3")),
            &[id("offense-2-2"), id("offense-2-3"), id("offense-2-4")]
        );
    }

    #[test]
    fn test_tier_two_edge_column_parents() {
        let graph = AdjacencyMap::new();
        // Tier 1 has no column 1, so 2-1 only hangs under 1-2
        assert_eq!(graph.parents(id("defense-2-1")), &[id("defense-1-2")]);
        assert_eq!(graph.parents(id("defense-2-4")), &[id("defense-1-3")]);
        assert_eq!(
            graph.parents(id("defense-2-2")),
            &[id("defense-1-2"), id("defense-1-3")]
        );
    }

    #[test]
    fn test_deepest_tier_has_no_children() {
        let graph = AdjacencyMap::new();
        assert!(graph.children(id("support-6-3")).is_empty());
        assert_eq!(
            graph.lateral(id("support-6-3")),
            &[id("support-6-2"), id("support-6-4")]
        );
    }

    #[test]
    fn test_parent_child_symmetry() {
        let graph = AdjacencyMap::new();
        for node in NodeId::all() {
            for &child in graph.children(node) {
                assert!(graph.parents(child).contains(&node));
            }
        }
    }
}
