use serde::{Deserialize, Serialize};
use crate::config::ledger::LedgerConfig;
use crate::error::{Error, Result};
use crate::ledger::position::Position;
use crate::observability::metrics::{
    LIQUIDATIONS_EXECUTED, POSITIONS_CLOSED, POSITIONS_OPENED, RATES_REJECTED,
};
use crate::types::rate::{check_price, check_rate, RateKind};
use crate::types::side::Side;

/// Which legs currently carry exposure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortfolioState {
    Flat,
    LongOnly,
    ShortOnly,
    Hedged,
}

/// Read-only view of a portfolio at one mark price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub mark: f64,
    pub state: PortfolioState,
    pub free: f64,
    pub equity: f64,
    pub balance: f64,
    pub realized_pnl: f64,
    pub long: Position,
    pub short: Position,
}

/// Leveraged two-leg ledger.
///
/// `free` is kept unleveraged: one unit of free margin controls `leverage`
/// units of notional. Opens debit `cost / leverage`, closes credit the released
/// basis the same way and add realized P&L at full value. The identity
/// `equity == free * leverage + long.cost + short.cost` holds after every call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    initial_balance: f64,
    leverage: f64,
    free: f64,
    realized_pnl: f64,
    long: Position,
    short: Position,
}

impl Portfolio {
    pub fn new(initial_balance: f64, leverage: f64) -> Result<Self> {
        if !(initial_balance.is_finite() && initial_balance > 0.0) {
            return Err(Error::InvalidInitialBalance(initial_balance));
        }
        if !(leverage.is_finite() && leverage >= 1.0) {
            return Err(Error::InvalidLeverage(leverage));
        }

        Ok(Portfolio {
            initial_balance,
            leverage,
            free: initial_balance,
            realized_pnl: 0.0,
            long: Position::new(Side::Long),
            short: Position::new(Side::Short),
        })
    }

    pub fn from_config(config: &LedgerConfig) -> Result<Self> {
        Self::new(config.initial_balance, config.leverage)
    }

    pub fn reset(&mut self) {
        self.free = self.initial_balance;
        self.realized_pnl = 0.0;
        self.long.reset();
        self.short.reset();
    }

    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    pub fn leverage(&self) -> f64 {
        self.leverage
    }

    pub fn long(&self) -> &Position {
        &self.long
    }

    pub fn short(&self) -> &Position {
        &self.short
    }

    pub fn position(&self, side: Side) -> &Position {
        match side {
            Side::Long => &self.long,
            Side::Short => &self.short,
        }
    }

    fn position_mut(&mut self, side: Side) -> &mut Position {
        match side {
            Side::Long => &mut self.long,
            Side::Short => &mut self.short,
        }
    }

    /// Cumulative unleveraged realized P&L since construction or reset.
    pub fn realized_pnl(&self) -> f64 {
        self.realized_pnl
    }

    /// Free margin in leveraged terms: the notional available for new exposure.
    pub fn free(&self) -> f64 {
        self.free * self.leverage
    }

    /// Free margin in unleveraged terms, the unit liquidation is measured in.
    pub fn free_margin(&self) -> f64 {
        self.free
    }

    /// Account value at cost basis, excluding unrealized P&L.
    pub fn equity(&self) -> f64 {
        self.free * self.leverage + self.long.cost() + self.short.cost()
    }

    /// Mark-to-market account value. New fills are sized off this.
    pub fn balance(&self, mark: f64) -> f64 {
        self.equity() + self.long.unrealized_pnl(mark) + self.short.unrealized_pnl(mark)
    }

    pub fn add_long(&mut self, price: f64, balance_rate: f64) -> Result<()> {
        self.open(Side::Long, price, balance_rate)
    }

    pub fn add_short(&mut self, price: f64, balance_rate: f64) -> Result<()> {
        self.open(Side::Short, price, balance_rate)
    }

    pub fn remove_long(&mut self, price: f64, amount_rate: f64) -> Result<()> {
        self.close(Side::Long, price, amount_rate)
    }

    pub fn remove_short(&mut self, price: f64, amount_rate: f64) -> Result<()> {
        self.close(Side::Short, price, amount_rate)
    }

    /// Spend `balance_rate` of the current balance on `side` at `price`.
    ///
    /// Sizing is not re-checked against the remaining free margin, so opening
    /// against floating gains on the other leg can drive `free` negative.
    pub fn open(&mut self, side: Side, price: f64, balance_rate: f64) -> Result<()> {
        let balance_rate = check_rate(balance_rate, RateKind::Balance).map_err(rejected)?;
        let price = check_price(price)?;

        let amount = self.balance(price) * balance_rate / price;
        if amount.is_nan() || amount <= 0.0 {
            tracing::debug!("Skipping {} open: sized amount {} at {}", side, amount, price);
            return Ok(());
        }

        let leverage = self.leverage;
        let cost = self.position_mut(side).add(price, amount)?;
        self.free -= cost / leverage;

        POSITIONS_OPENED.with_label_values(&[side.as_str()]).inc();
        tracing::debug!(
            "Opened {}: amount={}, price={}, cost={}, free={}",
            side, amount, price, cost, self.free
        );

        Ok(())
    }

    /// Close `amount_rate` of the `side` leg at `price`.
    pub fn close(&mut self, side: Side, price: f64, amount_rate: f64) -> Result<()> {
        let amount_rate = check_rate(amount_rate, RateKind::Amount).map_err(rejected)?;
        let price = check_price(price)?;

        let amount = self.position(side).amount() * amount_rate;
        if amount == 0.0 {
            return Ok(());
        }

        let leverage = self.leverage;
        let (cost, pnl) = self.position_mut(side).remove(price, amount)?;
        self.free += cost / leverage;
        self.free += pnl;
        self.realized_pnl += pnl;

        POSITIONS_CLOSED.with_label_values(&[side.as_str()]).inc();
        tracing::debug!(
            "Closed {}: amount={}, price={}, cost={}, pnl={}, free={}",
            side, amount, price, cost, pnl, self.free
        );

        Ok(())
    }

    pub fn position_rate(&self, side: Side) -> Result<f64> {
        let equity = self.equity();
        if equity == 0.0 {
            return Err(Error::DivisionByZero);
        }
        Ok(self.position(side).cost() / equity)
    }

    pub fn long_position_rate(&self) -> Result<f64> {
        self.position_rate(Side::Long)
    }

    pub fn short_position_rate(&self) -> Result<f64> {
        self.position_rate(Side::Short)
    }

    pub fn long_pnl_rate(&self, mark: f64) -> Result<f64> {
        self.long.pnl_rate(mark)
    }

    pub fn short_pnl_rate(&self, mark: f64) -> Result<f64> {
        self.short.pnl_rate(mark)
    }

    /// Wipe the account when combined unrealized losses meet or exceed the
    /// unleveraged free margin. Returns whether liquidation happened.
    ///
    /// Callers are expected to run this once per price update.
    pub fn liquidate(&mut self, mark: f64) -> bool {
        let combined_pnl = self.long.unrealized_pnl(mark) + self.short.unrealized_pnl(mark);
        if combined_pnl < 0.0 && combined_pnl.abs() >= self.free {
            tracing::warn!(
                "Liquidating portfolio at {}: combined_pnl={}, free={}, long={}, short={}",
                mark, combined_pnl, self.free, self.long.amount(), self.short.amount()
            );

            self.long.reset();
            self.short.reset();
            self.free = 0.0;
            // Whole account value is lost; keeps equity == leverage * (initial + realized)
            self.realized_pnl = -self.initial_balance;

            LIQUIDATIONS_EXECUTED.inc();
            return true;
        }
        false
    }

    pub fn state(&self) -> PortfolioState {
        match (self.long.is_flat(), self.short.is_flat()) {
            (true, true) => PortfolioState::Flat,
            (false, true) => PortfolioState::LongOnly,
            (true, false) => PortfolioState::ShortOnly,
            (false, false) => PortfolioState::Hedged,
        }
    }

    pub fn snapshot(&self, mark: f64) -> PortfolioSnapshot {
        PortfolioSnapshot {
            mark,
            state: self.state(),
            free: self.free(),
            equity: self.equity(),
            balance: self.balance(mark),
            realized_pnl: self.realized_pnl,
            long: self.long.clone(),
            short: self.short.clone(),
        }
    }
}

fn rejected(e: Error) -> Error {
    RATES_REJECTED.inc();
    e
}
