//! Pure rule engine for the mastery tree builder.
//!
//! This crate contains all builder logic that is independent of any page,
//! DOM, or hosting service. Functions take plain data and return results,
//! making them unit-testable and usable from a WASM front end, native CLI
//! tools, or a headless harness.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`adjacency`] | Precomputed parent/child/lateral links over the tree shape |
//! | [`budget`] | Scroll totals per bucket and display caps |
//! | [`builder`] | Builder controller: toggle transaction, view, resets, loading |
//! | [`catalog`] | Mastery metadata (name, cost, icon) loaded from JSON |
//! | [`config`] | Share link and cap configuration with validation |
//! | [`connectivity`] | Reachability walk and pruning of orphaned picks |
//! | [`encoding`] | One-byte-per-node base64url share codes |
//! | [`error`] | Error types for the loaders |
//! | [`links`] | Connection lines between active nodes |
//! | [`node`] | Node ids, branches, tree shape, active set |
//! | [`persistence`] | Versioned bincode save files |
//! | [`randomize`] | Seeded random valid builds |
//! | [`rules`] | Selection constraints and invariant audit |

pub mod adjacency;
pub mod budget;
pub mod builder;
pub mod catalog;
pub mod config;
pub mod connectivity;
pub mod encoding;
pub mod error;
pub mod links;
pub mod node;
pub mod persistence;
pub mod randomize;
pub mod rules;

pub use builder::{BuildView, MasteryBuilder, NodeStatus, ToggleOutcome};
pub use error::{MasteryError, Result};
pub use node::{ActiveSet, Branch, NodeId};
