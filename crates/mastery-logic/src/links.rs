//! Connection lines drawn between active masteries.
//!
//! Each active node below tier 1 is linked to one active parent, chosen in
//! the order straight above, above-left, above-right. Neighbouring active
//! nodes in the same tier are linked sideways unless both already have a
//! parent candidate above them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::node::{ActiveSet, Branch, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkKind {
    Vertical,
    Lateral,
}

/// A line from `from` to `to`. Vertical links point down the tree, lateral
/// links point right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: LinkKind,
}

/// Links for every branch of an active set.
pub fn compute_links(active: &ActiveSet) -> Vec<Link> {
    Branch::ALL
        .into_iter()
        .flat_map(|branch| branch_links(active, branch))
        .collect()
}

fn branch_links(active: &ActiveSet, branch: Branch) -> Vec<Link> {
    let mut links = Vec::new();
    let mut parent_candidates: HashMap<NodeId, usize> = HashMap::new();

    for child in active.in_branch(branch).filter(|id| id.tier > 1) {
        let above = |column: u8| {
            NodeId::new(branch, child.tier - 1, column).filter(|p| active.contains(*p))
        };
        let same = above(child.column);
        let left = child.column.checked_sub(1).and_then(above);
        let right = above(child.column + 1);

        let candidates = [same, left, right].iter().flatten().count();
        parent_candidates.insert(child, candidates);

        if let Some(parent) = same.or(left).or(right) {
            links.push(Link {
                from: parent,
                to: child,
                kind: LinkKind::Vertical,
            });
        }
    }

    // Active set iterates tier by tier, left to right
    let nodes: Vec<NodeId> = active.in_branch(branch).collect();
    for pair in nodes.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.tier != b.tier || b.column != a.column + 1 {
            continue;
        }
        let has_parent = |id: NodeId| parent_candidates.get(&id).copied().unwrap_or(0) > 0;
        if has_parent(a) && has_parent(b) {
            continue;
        }
        links.push(Link {
            from: a,
            to: b,
            kind: LinkKind::Lateral,
        });
    }

    links
}
