//! Node identity and the fixed shape of a mastery tree.
//!
//! Each of the three branches is a six-tier layered graph. Tier 1 has two
//! columns (2 and 3), every deeper tier has four (1 through 4). A node is
//! addressed by `(branch, tier, column)` and written `offense-2-3` in text.
//!
//! ```
//! use mastery_logic::node::{Branch, NodeId};
//!
//! let id: NodeId = "defense-3-1".parse().unwrap();
//! assert_eq!(id.branch, Branch::Defense);
//! assert_eq!(id.to_string(), "defense-3-1");
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MasteryError;

/// Deepest tier of every branch.
pub const MAX_TIER: u8 = 6;

/// One of the three independent mastery trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Branch {
    Offense = 0,
    Defense = 1,
    Support = 2,
}

impl Branch {
    /// All branches in index order.
    pub const ALL: [Branch; 3] = [Branch::Offense, Branch::Defense, Branch::Support];

    /// Stable index used by the share encoding.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: u8) -> Option<Branch> {
        match index {
            0 => Some(Branch::Offense),
            1 => Some(Branch::Defense),
            2 => Some(Branch::Support),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Branch::Offense => "offense",
            Branch::Defense => "defense",
            Branch::Support => "support",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Branch {
    type Err = MasteryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "offense" => Ok(Branch::Offense),
            "defense" => Ok(Branch::Defense),
            "support" => Ok(Branch::Support),
            other => Err(MasteryError::UnknownBranch(other.to_string())),
        }
    }
}

/// Columns that exist in a given tier.
pub fn columns(tier: u8) -> &'static [u8] {
    match tier {
        1 => &[2, 3],
        2..=MAX_TIER => &[1, 2, 3, 4],
        _ => &[],
    }
}

/// Scroll budget a node's cost is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Basic,
    Advanced,
    Divine,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Basic, Bucket::Advanced, Bucket::Divine];

    /// Tiers 1–2 are basic, 3–4 advanced, 5–6 divine.
    pub fn for_tier(tier: u8) -> Bucket {
        match tier {
            0..=2 => Bucket::Basic,
            3..=4 => Bucket::Advanced,
            _ => Bucket::Divine,
        }
    }
}

/// Structured identifier of a single mastery node.
///
/// Ordering is branch, then tier, then column, which is also the order
/// nodes are written into share codes. Deserializing checks the
/// coordinates against the tree shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawNodeId")]
pub struct NodeId {
    pub branch: Branch,
    pub tier: u8,
    pub column: u8,
}

#[derive(Deserialize)]
struct RawNodeId {
    branch: Branch,
    tier: u8,
    column: u8,
}

impl TryFrom<RawNodeId> for NodeId {
    type Error = MasteryError;

    fn try_from(raw: RawNodeId) -> Result<Self, Self::Error> {
        NodeId::new(raw.branch, raw.tier, raw.column).ok_or_else(|| {
            MasteryError::InvalidNodeId(format!("{}-{}-{}", raw.branch, raw.tier, raw.column))
        })
    }
}

impl NodeId {
    /// Build an identifier, returning `None` for coordinates outside the tree.
    pub fn new(branch: Branch, tier: u8, column: u8) -> Option<NodeId> {
        if columns(tier).contains(&column) {
            Some(NodeId {
                branch,
                tier,
                column,
            })
        } else {
            None
        }
    }

    pub fn is_anchor(&self) -> bool {
        self.tier == 1
    }

    pub fn bucket(&self) -> Bucket {
        Bucket::for_tier(self.tier)
    }

    /// Every node of one branch, tier by tier, left to right.
    pub fn branch_nodes(branch: Branch) -> impl Iterator<Item = NodeId> {
        (1..=MAX_TIER).flat_map(move |tier| {
            columns(tier).iter().map(move |&column| NodeId {
                branch,
                tier,
                column,
            })
        })
    }

    /// Every node of every branch.
    pub fn all() -> impl Iterator<Item = NodeId> {
        Branch::ALL.into_iter().flat_map(NodeId::branch_nodes)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.branch, self.tier, self.column)
    }
}

impl FromStr for NodeId {
    type Err = MasteryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MasteryError::InvalidNodeId(s.to_string());
        let mut parts = s.split('-');
        let (Some(branch), Some(tier), Some(column), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let branch: Branch = branch.parse()?;
        let tier: u8 = tier.parse().map_err(|_| invalid())?;
        let column: u8 = column.parse().map_err(|_| invalid())?;
        NodeId::new(branch, tier, column).ok_or_else(invalid)
    }
}

/// The set of currently selected nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSet {
    nodes: BTreeSet<NodeId>,
}

impl ActiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    /// Returns `true` if the node was not already active.
    pub fn insert(&mut self, id: NodeId) -> bool {
        self.nodes.insert(id)
    }

    /// Returns `true` if the node was active.
    pub fn remove(&mut self, id: NodeId) -> bool {
        self.nodes.remove(&id)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Remove every node of one branch, returning how many were removed.
    pub fn clear_branch(&mut self, branch: Branch) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|id| id.branch != branch);
        before - self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn in_branch(&self, branch: Branch) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied().filter(move |id| id.branch == branch)
    }

    /// The tier-1 node of a branch, if one is active.
    pub fn anchor(&self, branch: Branch) -> Option<NodeId> {
        self.in_branch(branch).find(NodeId::is_anchor)
    }

    /// Branches with at least one active node.
    pub fn branches(&self) -> BTreeSet<Branch> {
        self.nodes.iter().map(|id| id.branch).collect()
    }
}

impl FromIterator<NodeId> for ActiveSet {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl Extend<NodeId> for ActiveSet {
    fn extend<I: IntoIterator<Item = NodeId>>(&mut self, iter: I) {
        self.nodes.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_has_22_nodes_per_branch() {
        assert_eq!(NodeId::branch_nodes(Branch::Offense).count(), 22);
        assert_eq!(NodeId::all().count(), 66);
    }

    #[test]
    fn test_parse_and_display() {
        let id: NodeId = "support-6-4".parse().unwrap();
        assert_eq!(id, NodeId::new(Branch::Support, 6, 4).unwrap());
        assert_eq!(id.to_string(), "support-6-4");
    }

    #[test]
    fn test_parse_rejects_outside_shape() {
        assert!("offense-1-1".parse::<NodeId>().is_err());
        assert!("offense-1-4".parse::<NodeId>().is_err());
        assert!("offense-7-2".parse::<NodeId>().is_err());
        assert!("offense-0-2".parse::<NodeId>().is_err());
        assert!("utility-2-2".parse::<NodeId>().is_err());
        assert!("offense-2".parse::<NodeId>().is_err());
        assert!("offense-2-2-1".parse::<NodeId>().is_err());
        assert!("offense-x-2".parse::<NodeId>().is_err());
    }

    #[test]
    fn test_buckets_by_tier() {
        assert_eq!(Bucket::for_tier(1), Bucket::Basic);
        assert_eq!(Bucket::for_tier(2), Bucket::Basic);
        assert_eq!(Bucket::for_tier(3), Bucket::Advanced);
        assert_eq!(Bucket::for_tier(4), Bucket::Advanced);
        assert_eq!(Bucket::for_tier(5), Bucket::Divine);
        assert_eq!(Bucket::for_tier(6), Bucket::Divine);
    }

    #[test]
    fn test_deserialize_checks_shape() {
        let ok: NodeId =
            serde_json::from_str(r#"{"branch":"defense","tier":2,"column":1}"#).unwrap();
        assert_eq!(ok.to_string(), "defense-2-1");
        assert!(
            serde_json::from_str::<NodeId>(r#"{"branch":"defense","tier":9,"column":1}"#).is_err()
        );
    }

    #[test]
    fn test_active_set_branch_helpers() {
        let mut set: ActiveSet = ["offense-1-2", "offense-2-2", "defense-1-3"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        assert_eq!(set.branches().len(), 2);
        assert_eq!(set.anchor(Branch::Offense), "offense-1-2".parse().ok());
        assert_eq!(set.anchor(Branch::Support), None);
        assert_eq!(set.clear_branch(Branch::Offense), 2);
        assert_eq!(set.len(), 1);
    }
}
