//! Selection rules: may a node be activated given the current active set?
//!
//! Every rule is a pure function of an [`ActiveSet`] snapshot and the
//! [`AdjacencyMap`]. Nothing here mutates state.
//!
//! # Caps
//!
//! | Scope | Limit |
//! |-------|-------|
//! | Branches represented | 2 |
//! | Tier 1, per branch | 1 |
//! | Tiers 2–5, per branch | 2 |
//! | Tiers 2–5, all branches | 3 |
//! | Tier 6, all branches | 1 |
//!
//! ```
//! use mastery_logic::adjacency::AdjacencyMap;
//! use mastery_logic::node::ActiveSet;
//! use mastery_logic::rules::can_select;
//!
//! let graph = AdjacencyMap::new();
//! let mut active = ActiveSet::new();
//! assert!(can_select("offense-1-2".parse().unwrap(), &active, &graph));
//! assert!(!can_select("offense-2-2".parse().unwrap(), &active, &graph));
//! active.insert("offense-1-2".parse().unwrap());
//! assert!(can_select("offense-2-2".parse().unwrap(), &active, &graph));
//! ```

use std::collections::BTreeSet;

use crate::adjacency::AdjacencyMap;
use crate::node::{ActiveSet, Branch, NodeId, MAX_TIER};

pub const MAX_BRANCHES: usize = 2;
pub const MAX_ANCHORS_PER_BRANCH: u8 = 1;
pub const MAX_MID_TIER_PER_BRANCH: u8 = 2;
pub const MAX_MID_TIER_GLOBAL: u8 = 3;
pub const MAX_TOP_TIER_GLOBAL: u8 = 1;

/// Occupancy counts of an active set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierCounts {
    pub branches: BTreeSet<Branch>,
    /// Index 0 unused; `global[t]` is the count at tier `t`.
    pub global: [u8; MAX_TIER as usize + 1],
    pub per_branch: [[u8; MAX_TIER as usize + 1]; 3],
}

impl TierCounts {
    pub fn of(active: &ActiveSet) -> Self {
        let mut counts = Self::default();
        for id in active.iter() {
            counts.branches.insert(id.branch);
            counts.global[id.tier as usize] += 1;
            counts.per_branch[id.branch.index()][id.tier as usize] += 1;
        }
        counts
    }

    pub fn at(&self, branch: Branch, tier: u8) -> u8 {
        self.per_branch[branch.index()][tier as usize]
    }

    pub fn global_at(&self, tier: u8) -> u8 {
        self.global[tier as usize]
    }
}

/// Adjacency half of the rules.
///
/// Tier 1 is always adjacent. Deeper nodes need an active parent in the
/// same branch, or an active lateral neighbour once their tier has been
/// started in that branch.
pub fn is_adjacent_allowed(id: NodeId, active: &ActiveSet, graph: &AdjacencyMap) -> bool {
    if id.is_anchor() {
        return true;
    }
    if graph.parents(id).iter().any(|&p| active.contains(p)) {
        return true;
    }
    let tier_started = active
        .in_branch(id.branch)
        .any(|other| other.tier == id.tier);
    tier_started && graph.lateral(id).iter().any(|&n| active.contains(n))
}

/// Can `id` be activated right now?
///
/// Already-active nodes are never selectable.
pub fn can_select(id: NodeId, active: &ActiveSet, graph: &AdjacencyMap) -> bool {
    if active.contains(id) {
        return false;
    }
    let counts = TierCounts::of(active);

    if !counts.branches.contains(&id.branch) && counts.branches.len() >= MAX_BRANCHES {
        return false;
    }
    if !is_adjacent_allowed(id, active, graph) {
        return false;
    }

    match id.tier {
        1 => counts.at(id.branch, 1) < MAX_ANCHORS_PER_BRANCH,
        MAX_TIER => counts.global_at(MAX_TIER) < MAX_TOP_TIER_GLOBAL,
        tier => {
            counts.global_at(tier) < MAX_MID_TIER_GLOBAL
                && counts.at(id.branch, tier) < MAX_MID_TIER_PER_BRANCH
        }
    }
}

/// An active set that breaks one of the structural invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    TooManyBranches(usize),
    MultipleAnchors(Branch),
    BranchTierFull { branch: Branch, tier: u8, count: u8 },
    TierFull { tier: u8, count: u8 },
    MultipleTopTier(u8),
    Unreachable(NodeId),
}

/// Check every invariant of an active set, returning all violations found.
pub fn check_invariants(active: &ActiveSet, graph: &AdjacencyMap) -> Vec<Violation> {
    let mut violations = Vec::new();
    let counts = TierCounts::of(active);

    if counts.branches.len() > MAX_BRANCHES {
        violations.push(Violation::TooManyBranches(counts.branches.len()));
    }
    for &branch in &counts.branches {
        if counts.at(branch, 1) > MAX_ANCHORS_PER_BRANCH {
            violations.push(Violation::MultipleAnchors(branch));
        }
        for tier in 2..MAX_TIER {
            let count = counts.at(branch, tier);
            if count > MAX_MID_TIER_PER_BRANCH {
                violations.push(Violation::BranchTierFull {
                    branch,
                    tier,
                    count,
                });
            }
        }
    }
    for tier in 2..MAX_TIER {
        let count = counts.global_at(tier);
        if count > MAX_MID_TIER_GLOBAL {
            violations.push(Violation::TierFull { tier, count });
        }
    }
    if counts.global_at(MAX_TIER) > MAX_TOP_TIER_GLOBAL {
        violations.push(Violation::MultipleTopTier(counts.global_at(MAX_TIER)));
    }

    let reachable = crate::connectivity::reachable(active, graph);
    for id in active.iter() {
        if !reachable.contains(&id) {
            violations.push(Violation::Unreachable(id));
        }
    }

    violations
}
