use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

/// What a rate argument is a fraction of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateKind {
    /// Fraction of the mark-to-market balance spent on a new fill.
    Balance,
    /// Fraction of an open position's amount being closed.
    Amount,
}

impl RateKind {
    pub fn limit_message(&self) -> &'static str {
        match self {
            RateKind::Balance => "Cannot spend more than 100% of balance",
            RateKind::Amount => "Cannot remove more than 100% of position",
        }
    }
}

/// Validate that `rate` is a finite fraction in `[0, 1]`.
///
/// NaN fails the range check, so it is rejected along with out-of-range values.
pub fn check_rate(rate: f64, kind: RateKind) -> Result<f64> {
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(Error::InvalidRate { kind, rate })
    }
}

/// Validate a mark or fill price: finite and strictly positive.
pub fn check_price(price: f64) -> Result<f64> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(Error::InvalidPrice(price))
    }
}
