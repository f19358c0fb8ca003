pub mod types;
pub mod ledger;
pub mod invariants;
pub mod market_data;
pub mod simulation;
pub mod error;
pub mod config;
pub mod observability;

pub use error::{Error, Result};
pub use ledger::{Portfolio, PortfolioSnapshot, PortfolioState, Position};
pub use types::Side;

// Leverage applied when none is configured
pub const DEFAULT_LEVERAGE: f64 = 1.0;

// Rows dropped per unit of the longest EMA length before a series is used
pub const EMA_WARMUP_MULTIPLIER: usize = 5;
