//! Mastery Builder Headless Harness
//!
//! Validates the selection rules, pruning, share codes and the shipped
//! catalog without a browser. Runs entirely in-process.
//!
//! Usage:
//!   cargo run -p mastery-simtest
//!   cargo run -p mastery-simtest -- --verbose
//!   cargo run -p mastery-simtest -- --config builder.json --share AQU

use mastery_logic::adjacency::AdjacencyMap;
use mastery_logic::builder::{MasteryBuilder, NodeStatus, ToggleOutcome};
use mastery_logic::catalog::Catalog;
use mastery_logic::config::{validate_config, BuilderConfig};
use mastery_logic::encoding::{decode, encode};
use mastery_logic::node::{ActiveSet, Bucket, NodeId, MAX_TIER};
use mastery_logic::randomize::random_build;
use mastery_logic::rules::check_invariants;

// ── Catalog (same JSON the page fetches) ────────────────────────────────
const CATALOG_JSON: &str = include_str!("../../../data/masteries.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    config_path: Option<String>,
    share: Option<String>,
}

fn parse_args() -> Options {
    let mut options = Options {
        verbose: false,
        config_path: None,
        share: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" => options.verbose = true,
            "--config" => options.config_path = args.next(),
            "--share" => options.share = args.next(),
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
    }
    options
}

fn main() {
    let options = parse_args();
    let verbose = options.verbose;
    println!("=== Mastery Builder Harness ===\n");

    let config = match &options.config_path {
        Some(path) => match BuilderConfig::from_path(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Could not load config {}: {}", path, e);
                std::process::exit(2);
            }
        },
        None => BuilderConfig::default(),
    };

    let mut results = Vec::new();

    // 1. Catalog validation
    results.extend(validate_catalog(verbose));

    // 2. Configuration
    results.extend(validate_configuration(&config));

    // 3. Selection rules
    results.extend(validate_selection_rules(&config));

    // 4. Connectivity pruning
    results.extend(validate_pruning(&config));

    // 5. Share codes
    results.extend(validate_share_codes(&config));

    // 6. Random build sweep
    results.extend(validate_random_builds(verbose));

    if let Some(code) = &options.share {
        inspect_share(code, &config, verbose);
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn id(s: &str) -> NodeId {
    // Only called with literals below
    s.parse().unwrap_or_else(|e| panic!("bad literal {}: {}", s, e))
}

fn catalog() -> Catalog {
    Catalog::from_json_str(CATALOG_JSON).unwrap_or_default()
}

// ── 1. Catalog ──────────────────────────────────────────────────────────

fn validate_catalog(verbose: bool) -> Vec<TestResult> {
    println!("--- Catalog ---");
    let mut results = Vec::new();

    let catalog = match Catalog::from_json_str(CATALOG_JSON) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "catalog_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return results;
        }
    };

    let missing = catalog.missing();
    results.push(TestResult {
        name: "catalog_complete".into(),
        passed: missing.is_empty(),
        detail: if missing.is_empty() {
            format!("{} masteries loaded", catalog.len())
        } else {
            format!(
                "{} nodes without entries: {}",
                missing.len(),
                missing
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        },
    });

    let unnamed: Vec<NodeId> = NodeId::all()
        .filter(|&id| catalog.info(id).is_some_and(|info| info.name.trim().is_empty()))
        .collect();
    results.push(TestResult {
        name: "catalog_named".into(),
        passed: unnamed.is_empty(),
        detail: format!("{} entries without a name", unnamed.len()),
    });

    // Deeper tiers should never be cheaper than shallower ones
    let mut monotonic = true;
    for tier in 2..=MAX_TIER {
        let min_here = NodeId::all()
            .filter(|id| id.tier == tier)
            .map(|id| catalog.cost(id))
            .min()
            .unwrap_or(0);
        let max_above = NodeId::all()
            .filter(|id| id.tier == tier - 1)
            .map(|id| catalog.cost(id))
            .max()
            .unwrap_or(0);
        if verbose {
            println!("  tier {}: min cost {} (max above {})", tier, min_here, max_above);
        }
        if min_here < max_above {
            monotonic = false;
        }
    }
    results.push(TestResult {
        name: "catalog_cost_by_tier".into(),
        passed: monotonic,
        detail: "costs never decrease with tier".into(),
    });

    for bucket in Bucket::ALL {
        let total: u32 = NodeId::all()
            .filter(|id| id.bucket() == bucket)
            .map(|id| catalog.cost(id))
            .sum();
        if verbose {
            println!("  {:?}: {} scrolls across all nodes", bucket, total);
        }
    }

    results
}

// ── 2. Configuration ────────────────────────────────────────────────────

fn validate_configuration(config: &BuilderConfig) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let errors = validate_config(config);
    vec![TestResult {
        name: "config_valid".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            format!("share links → {}?{}=…", config.share_base_url, config.share_param)
        } else {
            format!("{:?}", errors)
        },
    }]
}

// ── 3. Selection rules ──────────────────────────────────────────────────

fn validate_selection_rules(config: &BuilderConfig) -> Vec<TestResult> {
    println!("--- Selection Rules ---");
    let mut results = Vec::new();
    let mut b = MasteryBuilder::new(catalog(), config.clone());

    results.push(TestResult {
        name: "rules_start_anchors_only".into(),
        passed: b.view().count(NodeStatus::Available) == 6,
        detail: format!("{} nodes available on an empty build", b.view().count(NodeStatus::Available)),
    });

    let fill_in = ["offense-1-2", "offense-2-2", "offense-2-3", "defense-1-2"]
        .iter()
        .all(|s| matches!(b.toggle(id(s)), ToggleOutcome::Activated { .. }));
    results.push(TestResult {
        name: "rules_fill_in".into(),
        passed: fill_in,
        detail: "offense 1-2, 2-2, 2-3 and defense 1-2 accepted".into(),
    });

    results.push(TestResult {
        name: "rules_third_branch".into(),
        passed: b.toggle(id("support-1-3")) == ToggleOutcome::Rejected,
        detail: "support rejected with offense + defense active".into(),
    });

    results.push(TestResult {
        name: "rules_second_anchor".into(),
        passed: b.toggle(id("offense-1-3")) == ToggleOutcome::Rejected,
        detail: "one tier-1 node per branch".into(),
    });

    results.push(TestResult {
        name: "rules_branch_tier_cap".into(),
        passed: b.toggle(id("offense-2-1")) == ToggleOutcome::Rejected,
        detail: "two tier-2 picks per branch".into(),
    });

    b.toggle(id("defense-2-2"));
    results.push(TestResult {
        name: "rules_global_tier_cap".into(),
        passed: b.toggle(id("defense-2-1")) == ToggleOutcome::Rejected,
        detail: "three tier-2 picks overall".into(),
    });

    for s in ["offense-3-2", "offense-4-2", "offense-5-2", "offense-6-2"] {
        b.toggle(id(s));
    }
    for s in ["defense-3-2", "defense-4-2", "defense-5-2"] {
        b.toggle(id(s));
    }
    results.push(TestResult {
        name: "rules_top_tier".into(),
        passed: b.active().contains(id("offense-6-2"))
            && b.toggle(id("defense-6-2")) == ToggleOutcome::Rejected,
        detail: "one tier-6 pick across all trees".into(),
    });

    results
}

// ── 4. Pruning ──────────────────────────────────────────────────────────

fn validate_pruning(config: &BuilderConfig) -> Vec<TestResult> {
    println!("--- Connectivity ---");
    let mut results = Vec::new();
    let mut b = MasteryBuilder::new(catalog(), config.clone());

    b.toggle(id("offense-1-2"));
    b.toggle(id("offense-2-2"));
    let outcome = b.toggle(id("offense-1-2"));
    results.push(TestResult {
        name: "prune_anchor_removed".into(),
        passed: outcome
            == ToggleOutcome::Deactivated {
                pruned: vec![id("offense-2-2")],
            }
            && b.active().is_empty(),
        detail: format!("{:?}", outcome),
    });

    for s in ["support-1-3", "support-2-3", "support-2-4", "support-3-4", "support-4-3"] {
        b.toggle(id(s));
    }
    let before = b.active().len();
    b.toggle(id("support-2-3"));
    results.push(TestResult {
        name: "prune_lateral_chain".into(),
        passed: before == 5 && b.active().len() == 4,
        detail: "2-4 still hangs under 1-3 after 2-3 goes".into(),
    });

    b.toggle(id("support-2-4"));
    results.push(TestResult {
        name: "prune_deep_chain".into(),
        passed: b.active().len() == 1,
        detail: format!("{} left after cutting the only tier-2 link", b.active().len()),
    });

    results
}

// ── 5. Share codes ──────────────────────────────────────────────────────

fn validate_share_codes(config: &BuilderConfig) -> Vec<TestResult> {
    println!("--- Share Codes ---");
    let mut results = Vec::new();

    let build: ActiveSet = [id("offense-1-2"), id("offense-2-2")].into_iter().collect();
    let code = encode(&build);
    let roundtrip = decode(&code).map(|d| d.nodes == build).unwrap_or(false);
    results.push(TestResult {
        name: "share_roundtrip".into(),
        passed: roundtrip && code == "AQU",
        detail: format!("{{offense-1-2, offense-2-2}} → {}", code),
    });

    let bad = MasteryBuilder::from_share(catalog(), config.clone(), "%%%");
    results.push(TestResult {
        name: "share_malformed".into(),
        passed: bad.active().is_empty(),
        detail: "bad base64 starts empty".into(),
    });

    let orphan = encode(&[id("defense-2-4"), id("defense-3-4")].into_iter().collect());
    let backfilled = MasteryBuilder::from_share(catalog(), config.clone(), &orphan);
    results.push(TestResult {
        name: "share_backfill".into(),
        passed: backfilled.active().contains(id("defense-1-3"))
            && backfilled.active().len() == 3,
        detail: "missing anchor restored on the right".into(),
    });

    results
}

// ── 6. Random builds ────────────────────────────────────────────────────

fn validate_random_builds(verbose: bool) -> Vec<TestResult> {
    println!("--- Random Builds ---");
    let graph = AdjacencyMap::new();
    let mut bad_seeds = Vec::new();
    let mut largest = 0;

    for seed in 0..500u64 {
        let build = random_build(&graph, seed, 30);
        largest = largest.max(build.len());
        let violations = check_invariants(&build, &graph);
        if !violations.is_empty() {
            if verbose {
                println!("  seed {}: {:?}", seed, violations);
            }
            bad_seeds.push(seed);
        }
    }

    vec![TestResult {
        name: "random_builds_valid".into(),
        passed: bad_seeds.is_empty(),
        detail: format!(
            "500 seeds, largest build {} nodes, {} invalid",
            largest,
            bad_seeds.len()
        ),
    }]
}

// ── Share inspection ────────────────────────────────────────────────────

fn inspect_share(code: &str, config: &BuilderConfig, verbose: bool) {
    println!("\n--- Share {} ---", code);
    let catalog = catalog();
    let b = MasteryBuilder::from_share(catalog, config.clone(), code);

    for node in b.active().iter() {
        let name = b
            .catalog()
            .info(node)
            .map(|info| info.name.as_str())
            .unwrap_or("?");
        println!("  {} {} ({} scrolls)", node, name, b.catalog().cost(node));
    }
    for bucket in Bucket::ALL {
        println!(
            "  {:?}: {}",
            bucket,
            b.view().totals.label(bucket, &config.scroll_caps)
        );
    }
    println!("  link: {}", b.share_link());

    if verbose {
        match serde_json::to_string_pretty(b.view()) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Could not serialize view: {}", e),
        }
    }
}
