use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::types::rate::check_price;
use crate::types::side::Side;

/// Single-sided exposure tracked at average cost.
///
/// All fills on one side merge into a single volume-weighted entry price;
/// there is no per-lot bookkeeping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    side: Side,
    average_price: f64,
    amount: f64,
}

impl Position {
    pub fn new(side: Side) -> Self {
        Position {
            side,
            average_price: 0.0,
            amount: 0.0,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn average_price(&self) -> f64 {
        self.average_price
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn is_flat(&self) -> bool {
        self.amount == 0.0
    }

    /// Capital basis locked in the position.
    pub fn cost(&self) -> f64 {
        self.average_price * self.amount
    }

    /// Merge a fill into the position. Returns the notional cost of the fill.
    pub fn add(&mut self, price: f64, amount: f64) -> Result<f64> {
        let price = check_price(price)?;
        if !(amount.is_finite() && amount > 0.0) {
            return Err(Error::InvalidAmount(amount));
        }

        let total = self.amount + amount;
        self.average_price = (self.average_price * self.amount + price * amount) / total;
        self.amount = total;

        Ok(price * amount)
    }

    /// Close `amount` at `price`. Returns `(cost, pnl)` where `cost` is the
    /// basis released at the pre-close average price.
    pub fn remove(&mut self, price: f64, amount: f64) -> Result<(f64, f64)> {
        let price = check_price(price)?;
        if !(amount.is_finite() && amount > 0.0) {
            return Err(Error::InvalidAmount(amount));
        }
        if amount > self.amount {
            return Err(Error::InsufficientPosition {
                requested: amount,
                available: self.amount,
            });
        }

        self.amount -= amount;

        let cost = self.average_price * amount;
        let pnl = (price - self.average_price) * amount * self.side.sign();

        if self.amount == 0.0 {
            // No phantom entry price on an empty leg
            self.average_price = 0.0;
        }

        Ok((cost, pnl))
    }

    pub fn unrealized_pnl(&self, mark: f64) -> f64 {
        (mark - self.average_price) * self.amount * self.side.sign()
    }

    /// Unrealized P&L as a fraction of cost. Fails on a flat position.
    pub fn pnl_rate(&self, mark: f64) -> Result<f64> {
        let cost = self.cost();
        if cost == 0.0 {
            return Err(Error::DivisionByZero);
        }
        Ok(self.unrealized_pnl(mark) / cost)
    }

    pub fn reset(&mut self) {
        self.average_price = 0.0;
        self.amount = 0.0;
    }
}
