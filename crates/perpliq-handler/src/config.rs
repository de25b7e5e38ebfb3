//! Handler configuration.

use serde::{Deserialize, Serialize};

/// Per-handler settings, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Compute units available to one call. Default: 2,000,000.
    #[serde(default = "default_compute_budget")]
    pub compute_budget: u64,
    /// Units charged per orchestration step. Default: 5,000.
    #[serde(default = "default_step_cost")]
    pub step_cost: u64,
    /// Oldest accepted price set, in blocks behind the current block.
    /// If None, price age is not checked.
    #[serde(default)]
    pub max_price_age_blocks: Option<u64>,
}

fn default_compute_budget() -> u64 {
    2_000_000
}

fn default_step_cost() -> u64 {
    5_000
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            compute_budget: default_compute_budget(),
            step_cost: default_step_cost(),
            max_price_age_blocks: None,
        }
    }
}
