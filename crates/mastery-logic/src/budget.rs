//! Scroll totals per budget bucket.
//!
//! Costs of active nodes are summed into basic (tiers 1–2), advanced
//! (tiers 3–4) and divine (tiers 5–6). Display values are clamped to each
//! cap; the clamp never blocks a selection.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::node::{ActiveSet, Bucket};

/// Upper bound shown for each bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollCaps {
    pub basic: u32,
    pub advanced: u32,
    pub divine: u32,
}

impl Default for ScrollCaps {
    fn default() -> Self {
        Self {
            basic: 100,
            advanced: 600,
            divine: 950,
        }
    }
}

impl ScrollCaps {
    pub fn get(&self, bucket: Bucket) -> u32 {
        match bucket {
            Bucket::Basic => self.basic,
            Bucket::Advanced => self.advanced,
            Bucket::Divine => self.divine,
        }
    }
}

/// Raw spend per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollTotals {
    pub basic: u32,
    pub advanced: u32,
    pub divine: u32,
}

impl ScrollTotals {
    pub fn of(active: &ActiveSet, catalog: &Catalog) -> Self {
        let mut totals = Self::default();
        for id in active.iter() {
            let cost = catalog.cost(id);
            match id.bucket() {
                Bucket::Basic => totals.basic += cost,
                Bucket::Advanced => totals.advanced += cost,
                Bucket::Divine => totals.divine += cost,
            }
        }
        totals
    }

    pub fn get(&self, bucket: Bucket) -> u32 {
        match bucket {
            Bucket::Basic => self.basic,
            Bucket::Advanced => self.advanced,
            Bucket::Divine => self.divine,
        }
    }

    /// Spend clamped to the caps, for display.
    pub fn clamped(&self, caps: &ScrollCaps) -> ScrollTotals {
        ScrollTotals {
            basic: self.basic.min(caps.basic),
            advanced: self.advanced.min(caps.advanced),
            divine: self.divine.min(caps.divine),
        }
    }

    /// `"42 / 100"` style label for one bucket.
    pub fn label(&self, bucket: Bucket, caps: &ScrollCaps) -> String {
        let cap = caps.get(bucket);
        format!("{} / {}", self.get(bucket).min(cap), cap)
    }
}
