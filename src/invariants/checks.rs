use crate::error::{Error, InvariantViolation, Result};
use crate::ledger::portfolio::Portfolio;
use crate::ledger::position::Position;

pub struct InvariantChecks;

impl InvariantChecks {
    /// Check that equity equals `leverage * (initial_balance + realized_pnl)`,
    /// i.e. no value appeared or vanished outside booked P&L.
    ///
    /// `tolerance` is relative to the magnitudes summed into equity, so that
    /// large offsetting legs do not turn rounding noise into a violation.
    pub fn check_conservation(portfolio: &Portfolio, tolerance: f64) -> Result<()> {
        let leverage = portfolio.leverage();
        let equity = portfolio.equity();
        let expected = leverage * (portfolio.initial_balance() + portfolio.realized_pnl());

        let scale = (portfolio.free_margin() * leverage).abs()
            + portfolio.long().cost()
            + portfolio.short().cost()
            + (leverage * portfolio.realized_pnl()).abs()
            + leverage * portfolio.initial_balance();
        let bound = tolerance * scale.max(1.0);

        if (equity - expected).abs() > bound {
            return Err(Error::InvariantViolation(InvariantViolation {
                invariant: "conservation",
                details: format!(
                    "equity {} differs from leverage * (initial + realized) {}",
                    equity, expected
                ),
            }));
        }

        Ok(())
    }

    /// Check amount/average price consistency of a single leg
    pub fn check_position_consistency(position: &Position) -> Result<()> {
        let amount = position.amount();
        let price = position.average_price();

        let details = if !amount.is_finite() || !price.is_finite() {
            Some(format!("non-finite state: amount={}, average_price={}", amount, price))
        } else if amount < 0.0 || price < 0.0 {
            Some(format!("negative state: amount={}, average_price={}", amount, price))
        } else if (amount == 0.0) != (price == 0.0) {
            Some(format!("phantom state: amount={}, average_price={}", amount, price))
        } else {
            None
        };

        match details {
            Some(details) => Err(Error::InvariantViolation(InvariantViolation {
                invariant: "position_consistency",
                details: format!("{} leg {}", position.side(), details),
            })),
            None => Ok(()),
        }
    }

    pub fn check_all(portfolio: &Portfolio, tolerance: f64) -> Result<()> {
        Self::check_position_consistency(portfolio.long())?;
        Self::check_position_consistency(portfolio.short())?;
        Self::check_conservation(portfolio, tolerance)?;

        if portfolio.free_margin() < 0.0 {
            tracing::warn!("Free margin is negative: {}", portfolio.free_margin());
        }

        Ok(())
    }
}
