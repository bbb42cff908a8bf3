//! Property-based invariant tests for the builder.
//!
//! Verifies, for arbitrary click sequences:
//! 1. At most two branches are ever represented
//! 2. At most one tier-1 node per branch
//! 3. Tiers 2–5 stay within 2 per branch and 3 overall
//! 4. At most one tier-6 node overall
//! 5. No active node is disconnected from its anchor
//! 6. Share codes decode back to the same build
//! 7. Pruning twice changes nothing the second time
//! 8. A rejected click leaves the view untouched

use mastery_logic::adjacency::AdjacencyMap;
use mastery_logic::builder::{MasteryBuilder, ToggleOutcome};
use mastery_logic::catalog::Catalog;
use mastery_logic::config::BuilderConfig;
use mastery_logic::connectivity::validate_active_connections;
use mastery_logic::encoding::{decode, encode};
use mastery_logic::node::{ActiveSet, Branch, NodeId};
use mastery_logic::rules::{check_invariants, TierCounts};
use proptest::prelude::*;

// ── Strategy helpers ──────────────────────────────────────────────────

fn all_nodes() -> Vec<NodeId> {
    NodeId::all().collect()
}

fn arb_clicks() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..66, 0..120)
}

fn arb_node_set() -> impl Strategy<Value = ActiveSet> {
    prop::collection::vec(0usize..66, 0..20).prop_map(|idx| {
        let nodes = all_nodes();
        idx.into_iter().map(|i| nodes[i]).collect::<ActiveSet>()
    })
}

fn run_clicks(clicks: &[usize]) -> MasteryBuilder {
    let nodes = all_nodes();
    let mut b = MasteryBuilder::new(Catalog::empty(), BuilderConfig::default());
    for &i in clicks {
        b.toggle(nodes[i]);
    }
    b
}

proptest! {
    #[test]
    fn clicks_preserve_every_invariant(clicks in arb_clicks()) {
        let nodes = all_nodes();
        let graph = AdjacencyMap::new();
        let mut b = MasteryBuilder::new(Catalog::empty(), BuilderConfig::default());
        for &i in &clicks {
            b.toggle(nodes[i]);
            let violations = check_invariants(b.active(), &graph);
            prop_assert!(violations.is_empty(), "{:?} after {}", violations, nodes[i]);
        }
    }

    #[test]
    fn caps_hold_after_clicks(clicks in arb_clicks()) {
        let b = run_clicks(&clicks);
        let counts = TierCounts::of(b.active());
        prop_assert!(counts.branches.len() <= 2);
        for branch in Branch::ALL {
            prop_assert!(counts.at(branch, 1) <= 1);
            for tier in 2..=5 {
                prop_assert!(counts.at(branch, tier) <= 2);
            }
        }
        for tier in 2..=5 {
            prop_assert!(counts.global_at(tier) <= 3);
        }
        prop_assert!(counts.global_at(6) <= 1);
    }

    #[test]
    fn share_code_roundtrip(clicks in arb_clicks()) {
        let b = run_clicks(&clicks);
        let decoded = decode(&encode(b.active())).unwrap();
        prop_assert!(decoded.skipped.is_empty());
        prop_assert_eq!(&decoded.nodes, b.active());
    }

    #[test]
    fn reload_from_share_is_identical(clicks in arb_clicks()) {
        let b = run_clicks(&clicks);
        let reloaded = MasteryBuilder::from_share(
            Catalog::empty(),
            BuilderConfig::default(),
            b.share_code(),
        );
        prop_assert_eq!(reloaded.active(), b.active());
    }

    #[test]
    fn pruning_is_idempotent(mut active in arb_node_set()) {
        let graph = AdjacencyMap::new();
        validate_active_connections(&mut active, &graph);
        let once = active.clone();
        prop_assert!(validate_active_connections(&mut active, &graph).is_empty());
        prop_assert_eq!(active, once);
    }

    #[test]
    fn rejected_click_changes_nothing(clicks in arb_clicks(), last in 0usize..66) {
        let nodes = all_nodes();
        let mut b = run_clicks(&clicks);
        let before_active = b.active().clone();
        let before_view = b.view().clone();
        if b.toggle(nodes[last]) == ToggleOutcome::Rejected {
            prop_assert_eq!(b.active(), &before_active);
            prop_assert_eq!(b.view(), &before_view);
        }
    }

    #[test]
    fn arbitrary_share_bytes_never_break_rules(bytes in prop::collection::vec(any::<u8>(), 0..24)) {
        use base64::Engine;
        let code = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes);
        let b = MasteryBuilder::from_share(Catalog::empty(), BuilderConfig::default(), &code);
        prop_assert!(check_invariants(b.active(), &AdjacencyMap::new()).is_empty());
    }
}
