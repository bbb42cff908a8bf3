//! Node catalog: cost and presentation metadata per mastery.
//!
//! The catalog document is keyed by branch; each branch holds a list of
//! tier groups, each a list of descriptors:
//!
//! ```json
//! { "offense": [[{ "id": "offense-1-2", "name": "Strength", "cost": 5, "icon": "strength" }]] }
//! ```
//!
//! Loading is forgiving. A descriptor that does not parse, or whose id lies
//! outside the tree, is skipped with a warning. Lookups of nodes without an
//! entry fall back to zero cost and blank presentation.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::node::NodeId;

/// Presentation and cost data for a single mastery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MasteryInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cost: u32,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    id: String,
    #[serde(flatten)]
    info: MasteryInfo,
}

/// Immutable lookup of catalog metadata by node.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<NodeId, MasteryInfo>,
}

impl Catalog {
    /// A catalog with no entries. Every node costs 0.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a catalog document.
    ///
    /// Only a document that is not JSON at all, or whose top two levels are
    /// not `branch -> [[...]]`, is an error.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let doc: BTreeMap<String, Vec<Vec<serde_json::Value>>> = serde_json::from_str(json)?;
        let mut entries = HashMap::new();

        for (branch_key, tiers) in doc {
            for value in tiers.into_iter().flatten() {
                let raw: RawEntry = match serde_json::from_value(value) {
                    Ok(raw) => raw,
                    Err(e) => {
                        log::warn!("Skipping malformed catalog entry under {}: {}", branch_key, e);
                        continue;
                    }
                };
                match raw.id.parse::<NodeId>() {
                    Ok(id) => {
                        if entries.insert(id, raw.info).is_some() {
                            log::warn!("Duplicate catalog entry for {}; keeping the last", id);
                        }
                    }
                    Err(e) => log::warn!("Skipping catalog entry: {}", e),
                }
            }
        }

        log::debug!("Loaded {} catalog entries", entries.len());
        Ok(Self { entries })
    }

    /// Read and parse a catalog file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn info(&self, id: NodeId) -> Option<&MasteryInfo> {
        self.entries.get(&id)
    }

    /// Cost of a node; 0 when the catalog has no entry for it.
    pub fn cost(&self, id: NodeId) -> u32 {
        self.entries.get(&id).map(|info| info.cost).unwrap_or(0)
    }

    /// Relative URL of a node's icon, if the catalog names one.
    pub fn icon_url(&self, id: NodeId) -> Option<String> {
        self.entries
            .get(&id)
            .and_then(|info| info.icon.as_deref())
            .map(|icon| format!("/style/img/masteries/{}.webp", icon))
    }

    /// Nodes of the tree that have no catalog entry.
    pub fn missing(&self) -> Vec<NodeId> {
        NodeId::all()
            .filter(|id| !self.entries.contains_key(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
