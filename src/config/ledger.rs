use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub initial_balance: f64,
    pub leverage: f64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            initial_balance: 1000.0,
            leverage: crate::DEFAULT_LEVERAGE,
        }
    }
}
