use serde::{Deserialize, Serialize};

pub mod ledger;
pub mod dataset;
pub mod loader;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Finish the episode on the step a liquidation happens.
    pub end_on_liquidation: bool,
    /// Relative tolerance for the per-step conservation check.
    pub invariant_tolerance: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            end_on_liquidation: true,
            invariant_tolerance: 1e-9,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            json: false,
            filter: "info".to_string(),
        }
    }
}
