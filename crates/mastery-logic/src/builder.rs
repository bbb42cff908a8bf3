//! The mastery builder: owns the active set and runs each click as one
//! transaction.
//!
//! # Transaction
//!
//! 1. Deactivate if active; otherwise check [`can_select`] and activate.
//! 2. Prune anything no longer connected to its anchor.
//! 3. Recompute node status, scroll totals, links and the share code.
//! 4. Hand the fresh [`BuildView`] to the renderer, if one is attached.
//!
//! ```
//! use mastery_logic::builder::{MasteryBuilder, ToggleOutcome};
//! use mastery_logic::catalog::Catalog;
//! use mastery_logic::config::BuilderConfig;
//!
//! let mut builder = MasteryBuilder::new(Catalog::empty(), BuilderConfig::default());
//! let anchor = "offense-1-2".parse().unwrap();
//! let child = "offense-2-2".parse().unwrap();
//! assert!(matches!(builder.toggle(anchor), ToggleOutcome::Activated { .. }));
//! assert!(matches!(builder.toggle(child), ToggleOutcome::Activated { .. }));
//!
//! // Removing the anchor takes the child with it
//! match builder.toggle(anchor) {
//!     ToggleOutcome::Deactivated { pruned } => assert_eq!(pruned, vec![child]),
//!     other => panic!("unexpected {:?}", other),
//! }
//! assert!(builder.active().is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::adjacency::AdjacencyMap;
use crate::budget::ScrollTotals;
use crate::catalog::Catalog;
use crate::config::BuilderConfig;
use crate::connectivity::validate_active_connections;
use crate::encoding::{self, share_link};
use crate::links::{compute_links, Link};
use crate::node::{ActiveSet, Branch, NodeId};
use crate::persistence::BuildSnapshot;
use crate::randomize::random_build;
use crate::rules::{can_select, check_invariants};

/// How a node is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Selected,
    Available,
    Locked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeState {
    pub id: NodeId,
    pub status: NodeStatus,
}

/// Everything a renderer needs after a change. Derived, never
/// authoritative; rebuilt on every transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildView {
    /// One entry per node of the tree, in node order.
    pub nodes: Vec<NodeState>,
    pub totals: ScrollTotals,
    /// Totals clamped to the configured caps.
    pub display_totals: ScrollTotals,
    pub links: Vec<Link>,
    pub share_code: String,
    pub share_link: String,
}

impl BuildView {
    pub fn status(&self, id: NodeId) -> Option<NodeStatus> {
        self.nodes
            .binary_search_by_key(&id, |n| n.id)
            .ok()
            .map(|i| self.nodes[i].status)
    }

    pub fn count(&self, status: NodeStatus) -> usize {
        self.nodes.iter().filter(|n| n.status == status).count()
    }
}

/// Receives the view after every state change.
pub trait Renderer {
    fn render(&mut self, view: &BuildView);
}

impl<F: FnMut(&BuildView)> Renderer for F {
    fn render(&mut self, view: &BuildView) {
        self(view)
    }
}

/// Result of a click on a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Node turned on; `pruned` is normally empty.
    Activated { pruned: Vec<NodeId> },
    /// Node turned off, along with anything that hung from it.
    Deactivated { pruned: Vec<NodeId> },
    /// Selection refused by the rules; nothing changed.
    Rejected,
}

/// Owner of the active set for one builder page.
pub struct MasteryBuilder {
    catalog: Catalog,
    graph: AdjacencyMap,
    config: BuilderConfig,
    active: ActiveSet,
    view: BuildView,
    renderer: Option<Box<dyn Renderer>>,
}

impl MasteryBuilder {
    /// Empty builder.
    pub fn new(catalog: Catalog, config: BuilderConfig) -> Self {
        let mut builder = Self {
            catalog,
            graph: AdjacencyMap::new(),
            config,
            active: ActiveSet::new(),
            view: BuildView::default(),
            renderer: None,
        };
        builder.update_all(false);
        builder
    }

    /// Builder initialised from a share code.
    ///
    /// A code that is not base64, or that decodes to a build breaking the
    /// rules, yields an empty builder.
    pub fn from_share(catalog: Catalog, config: BuilderConfig, code: &str) -> Self {
        let mut builder = Self::new(catalog, config);
        match encoding::decode(code) {
            Ok(selection) => builder.admit(selection.nodes),
            Err(e) => log::warn!("Ignoring share code {:?}: {}", code, e),
        }
        builder
    }

    /// Builder initialised from a full share link, if it carries a code.
    pub fn from_link(catalog: Catalog, config: BuilderConfig, link: &str) -> Self {
        let code = encoding::share_code_from_link(link, &config.share_param).map(str::to_owned);
        match code {
            Some(code) => Self::from_share(catalog, config, &code),
            None => Self::new(catalog, config),
        }
    }

    /// Attach the renderer and draw the current state once.
    pub fn set_renderer(&mut self, renderer: Box<dyn Renderer>) {
        let renderer = self.renderer.insert(renderer);
        renderer.render(&self.view);
    }

    /// Click on a node.
    pub fn toggle(&mut self, id: NodeId) -> ToggleOutcome {
        if self.active.remove(id) {
            let pruned = self.update_all(true);
            log::debug!("Deactivated {} (pruned {})", id, pruned.len());
            return ToggleOutcome::Deactivated { pruned };
        }

        if !can_select(id, &self.active, &self.graph) {
            log::debug!("Rejected {}", id);
            return ToggleOutcome::Rejected;
        }

        self.active.insert(id);
        let pruned = self.update_all(true);
        log::debug!("Activated {}", id);
        ToggleOutcome::Activated { pruned }
    }

    /// Clear one tree.
    pub fn reset_branch(&mut self, branch: Branch) {
        let removed = self.active.clear_branch(branch);
        log::debug!("Reset {} ({} removed)", branch, removed);
        self.update_all(true);
    }

    /// Clear every tree.
    pub fn reset(&mut self) {
        self.active.clear();
        self.update_all(true);
    }

    /// Replace the build with a random valid one.
    pub fn randomize(&mut self, seed: u64, picks: usize) {
        self.active = random_build(&self.graph, seed, picks);
        self.update_all(true);
    }

    /// Recompute the view, pruning first when `cascade` is set, and notify
    /// the renderer. Returns the pruned nodes.
    pub fn update_all(&mut self, cascade: bool) -> Vec<NodeId> {
        let mut pruned = Vec::new();
        if cascade {
            pruned = validate_active_connections(&mut self.active, &self.graph);
            if !pruned.is_empty() {
                log::info!("Removed {} disconnected masteries", pruned.len());
            }
        }

        let nodes = NodeId::all()
            .map(|id| NodeState {
                id,
                status: self.status_of(id),
            })
            .collect::<Vec<_>>();
        let totals = ScrollTotals::of(&self.active, &self.catalog);
        let share_code = encoding::encode(&self.active);

        self.view = BuildView {
            // Branch-major iteration is already sorted
            nodes,
            totals,
            display_totals: totals.clamped(&self.config.scroll_caps),
            links: compute_links(&self.active),
            share_link: share_link(
                &self.config.share_base_url,
                &self.config.share_param,
                &share_code,
            ),
            share_code,
        };

        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&self.view);
        }
        pruned
    }

    fn status_of(&self, id: NodeId) -> NodeStatus {
        if self.active.contains(id) {
            NodeStatus::Selected
        } else if can_select(id, &self.active, &self.graph) {
            NodeStatus::Available
        } else {
            NodeStatus::Locked
        }
    }

    /// Load a build from outside (share code or save file).
    ///
    /// Missing anchors are backfilled, disconnected nodes pruned, and a
    /// build that still breaks a rule is dropped entirely.
    fn admit(&mut self, mut nodes: ActiveSet) {
        backfill_anchors(&mut nodes);
        validate_active_connections(&mut nodes, &self.graph);

        let violations = check_invariants(&nodes, &self.graph);
        if violations.is_empty() {
            self.active = nodes;
        } else {
            log::warn!("Discarding loaded build: {:?}", violations);
            self.active.clear();
        }
        self.update_all(true);
    }

    /// Capture the current build for saving.
    pub fn snapshot(&self, label: impl Into<String>) -> BuildSnapshot {
        BuildSnapshot::new(label, &self.active)
    }

    /// Replace the current build with a saved one.
    pub fn restore(&mut self, snapshot: &BuildSnapshot) {
        self.admit(snapshot.nodes.iter().copied().collect());
    }

    pub fn active(&self) -> &ActiveSet {
        &self.active
    }

    pub fn view(&self) -> &BuildView {
        &self.view
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn share_code(&self) -> &str {
        &self.view.share_code
    }

    pub fn share_link(&self) -> &str {
        &self.view.share_link
    }
}

/// Give every branch that has picks but no tier-1 node an anchor: column 2
/// when its picks lean left (mean column below 2.5), otherwise column 3.
pub fn backfill_anchors(nodes: &mut ActiveSet) {
    for branch in Branch::ALL {
        let picks: Vec<NodeId> = nodes.in_branch(branch).collect();
        if picks.is_empty() || picks.iter().any(NodeId::is_anchor) {
            continue;
        }
        let sum: u32 = picks.iter().map(|id| id.column as u32).sum();
        let column = if 2 * sum < 5 * picks.len() as u32 { 2 } else { 3 };
        if let Some(anchor) = NodeId::new(branch, 1, column) {
            log::debug!("Backfilled anchor {}", anchor);
            nodes.insert(anchor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn id(s: &str) -> NodeId {
        s.parse().unwrap()
    }

    fn set(ids: &[&str]) -> ActiveSet {
        ids.iter().map(|s| id(s)).collect()
    }

    fn builder() -> MasteryBuilder {
        MasteryBuilder::new(Catalog::empty(), BuilderConfig::default())
    }

    #[test]
    fn test_empty_view_has_anchors_available() {
        let b = builder();
        assert_eq!(b.view().nodes.len(), 66);
        assert_eq!(b.view().count(NodeStatus::Available), 6);
        assert_eq!(b.view().count(NodeStatus::Locked), 60);
        assert_eq!(b.share_code(), "");
        assert_eq!(b.share_link(), "/tools/mastery-builder/?m=");
    }

    #[test]
    fn test_rejected_toggle_changes_nothing() {
        let mut b = builder();
        let before = b.view().clone();
        assert_eq!(b.toggle(id("offense-3-1")), ToggleOutcome::Rejected);
        assert_eq!(b.view(), &before);
    }

    #[test]
    fn test_status_after_anchor() {
        let mut b = builder();
        b.toggle(id("offense-1-2"));
        let view = b.view();
        assert_eq!(view.status(id("offense-1-2")), Some(NodeStatus::Selected));
        assert_eq!(view.status(id("offense-1-3")), Some(NodeStatus::Locked));
        assert_eq!(view.status(id("offense-2-1")), Some(NodeStatus::Available));
        assert_eq!(view.status(id("offense-2-4")), Some(NodeStatus::Locked));
        assert_eq!(view.status(id("defense-1-3")), Some(NodeStatus::Available));
    }

    #[test]
    fn test_third_branch_locked() {
        let mut b = builder();
        b.toggle(id("offense-1-2"));
        b.toggle(id("defense-1-2"));
        assert_eq!(b.view().status(id("support-1-2")), Some(NodeStatus::Locked));
        assert_eq!(b.view().status(id("support-1-3")), Some(NodeStatus::Locked));
    }

    #[test]
    fn test_deactivating_middle_prunes_below() {
        let mut b = builder();
        for s in ["offense-1-2", "offense-2-2", "offense-3-2", "offense-4-2"] {
            b.toggle(id(s));
        }
        let outcome = b.toggle(id("offense-2-2"));
        assert_eq!(
            outcome,
            ToggleOutcome::Deactivated {
                pruned: vec![id("offense-3-2"), id("offense-4-2")]
            }
        );
        assert_eq!(b.active(), &set(&["offense-1-2"]));
    }

    #[test]
    fn test_reset_branch() {
        let mut b = builder();
        for s in ["offense-1-2", "offense-2-2", "defense-1-3"] {
            b.toggle(id(s));
        }
        b.reset_branch(Branch::Offense);
        assert_eq!(b.active(), &set(&["defense-1-3"]));
        b.reset();
        assert!(b.active().is_empty());
    }

    #[test]
    fn test_share_code_tracks_state() {
        let mut b = builder();
        b.toggle(id("offense-1-2"));
        b.toggle(id("offense-2-2"));
        assert_eq!(b.share_code(), "AQU");
        assert_eq!(b.share_link(), "/tools/mastery-builder/?m=AQU");
    }

    #[test]
    fn test_from_share_restores_build() {
        let b = MasteryBuilder::from_share(Catalog::empty(), BuilderConfig::default(), "AQU");
        assert_eq!(b.active(), &set(&["offense-1-2", "offense-2-2"]));
    }

    #[test]
    fn test_from_share_bad_code_starts_empty() {
        let b = MasteryBuilder::from_share(Catalog::empty(), BuilderConfig::default(), "***");
        assert!(b.active().is_empty());
    }

    #[test]
    fn test_from_share_backfills_anchor() {
        // offense-2-1 and offense-2-2 only: mean column 1.5 -> anchor at column 2
        let code = encoding::encode(&set(&["offense-2-1", "offense-2-2"]));
        let b = MasteryBuilder::from_share(Catalog::empty(), BuilderConfig::default(), &code);
        assert_eq!(
            b.active(),
            &set(&["offense-1-2", "offense-2-1", "offense-2-2"])
        );
    }

    #[test]
    fn test_backfill_prefers_right_anchor() {
        let mut nodes = set(&["defense-2-3", "defense-2-4"]);
        backfill_anchors(&mut nodes);
        assert!(nodes.contains(id("defense-1-3")));
        let mut even = set(&["support-2-2", "support-2-3"]);
        backfill_anchors(&mut even);
        // mean of exactly 2.5 goes right
        assert!(even.contains(id("support-1-3")));
    }

    #[test]
    fn test_from_share_rejects_rule_breaking_build() {
        let code = encoding::encode(&set(&["offense-1-2", "defense-1-2", "support-1-2"]));
        let b = MasteryBuilder::from_share(Catalog::empty(), BuilderConfig::default(), &code);
        assert!(b.active().is_empty());
    }

    #[test]
    fn test_from_link() {
        let b = MasteryBuilder::from_link(
            Catalog::empty(),
            BuilderConfig::default(),
            "https://example.test/tools/mastery-builder/?m=AQU",
        );
        assert_eq!(b.active().len(), 2);
        let plain = MasteryBuilder::from_link(
            Catalog::empty(),
            BuilderConfig::default(),
            "https://example.test/tools/mastery-builder/",
        );
        assert!(plain.active().is_empty());
    }

    #[test]
    fn test_renderer_sees_every_change() {
        let seen: Rc<RefCell<Vec<String>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let mut b = builder();
        b.set_renderer(Box::new(move |view: &BuildView| {
            sink.borrow_mut().push(view.share_code.clone())
        }));
        b.toggle(id("offense-1-2"));
        b.toggle(id("offense-3-3"));
        b.toggle(id("offense-2-2"));
        assert_eq!(*seen.borrow(), vec!["", "AQ", "AQU"]);
    }

    #[test]
    fn test_totals_use_catalog() {
        let catalog = Catalog::from_json_str(
            r#"{ "offense": [[{ "id": "offense-1-2", "cost": 30 }], [{ "id": "offense-2-2", "cost": 90 }]] }"#,
        )
        .unwrap();
        let mut b = MasteryBuilder::new(catalog, BuilderConfig::default());
        b.toggle(id("offense-1-2"));
        b.toggle(id("offense-2-2"));
        assert_eq!(b.view().totals.basic, 120);
        assert_eq!(b.view().display_totals.basic, 100);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut b = builder();
        b.toggle(id("support-1-3"));
        b.toggle(id("support-2-4"));
        let snapshot = b.snapshot("tank");
        b.reset();
        b.restore(&snapshot);
        assert_eq!(b.active(), &set(&["support-1-3", "support-2-4"]));
    }

    #[test]
    fn test_randomize_is_valid() {
        let mut b = builder();
        b.randomize(7, 12);
        assert!(!b.active().is_empty());
        assert!(check_invariants(b.active(), &AdjacencyMap::new()).is_empty());
    }
}
