use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::ledger::portfolio::Portfolio;
use crate::types::side::Side;

/// One trade instruction per step. Rates follow the ledger's `[0, 1]` contract.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Hold,
    OpenLong(f64),
    OpenShort(f64),
    CloseLong(f64),
    CloseShort(f64),
}

impl Action {
    /// Map a signal in `[-1, 1]` to an open on the matching side.
    pub fn from_signal(signal: f64) -> Action {
        if signal.is_nan() {
            return Action::Hold;
        }
        let signal = signal.clamp(-1.0, 1.0);
        if signal > 0.0 {
            Action::OpenLong(signal)
        } else if signal < 0.0 {
            Action::OpenShort(-signal)
        } else {
            Action::Hold
        }
    }

    pub fn apply(self, portfolio: &mut Portfolio, price: f64) -> Result<()> {
        match self {
            Action::Hold => Ok(()),
            Action::OpenLong(rate) => portfolio.open(Side::Long, price, rate),
            Action::OpenShort(rate) => portfolio.open(Side::Short, price, rate),
            Action::CloseLong(rate) => portfolio.close(Side::Long, price, rate),
            Action::CloseShort(rate) => portfolio.close(Side::Short, price, rate),
        }
    }
}

/// Ledger-derived features handed to a strategy after each step.
///
/// Rates that are undefined because their denominator is zero read as `0.0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub long_position_rate: f64,
    pub short_position_rate: f64,
    pub long_pnl_rate: f64,
    pub short_pnl_rate: f64,
    pub free_rate: f64,
}

impl Observation {
    pub fn from_portfolio(portfolio: &Portfolio, mark: f64) -> Self {
        let equity = portfolio.equity();
        Observation {
            long_position_rate: portfolio.long_position_rate().unwrap_or(0.0),
            short_position_rate: portfolio.short_position_rate().unwrap_or(0.0),
            long_pnl_rate: portfolio.long_pnl_rate(mark).unwrap_or(0.0),
            short_pnl_rate: portfolio.short_pnl_rate(mark).unwrap_or(0.0),
            free_rate: if equity == 0.0 { 0.0 } else { portfolio.free() / equity },
        }
    }

    pub fn to_array(&self) -> [f64; 5] {
        [
            self.long_position_rate,
            self.short_position_rate,
            self.long_pnl_rate,
            self.short_pnl_rate,
            self.free_rate,
        ]
    }
}
