use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, Opts, Registry};
use crate::error::Result;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Ledger metrics
    pub static ref POSITIONS_OPENED: IntCounterVec = IntCounterVec::new(
        Opts::new("positions_opened_total", "Fills merged into a position leg"),
        &["side"]
    ).unwrap();

    pub static ref POSITIONS_CLOSED: IntCounterVec = IntCounterVec::new(
        Opts::new("positions_closed_total", "Partial or full closes of a position leg"),
        &["side"]
    ).unwrap();

    pub static ref RATES_REJECTED: IntCounter = IntCounter::new(
        "rates_rejected_total",
        "Open/close requests rejected for a rate outside [0, 1]"
    ).unwrap();

    // Liquidation metrics
    pub static ref LIQUIDATIONS_EXECUTED: IntCounter = IntCounter::new(
        "liquidations_executed_total",
        "Total number of liquidations"
    ).unwrap();

    // Simulation metrics
    pub static ref EPISODES_COMPLETED: IntCounter = IntCounter::new(
        "episodes_completed_total",
        "Episodes run to completion"
    ).unwrap();
}

pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(POSITIONS_OPENED.clone()))?;
    REGISTRY.register(Box::new(POSITIONS_CLOSED.clone()))?;
    REGISTRY.register(Box::new(RATES_REJECTED.clone()))?;
    REGISTRY.register(Box::new(LIQUIDATIONS_EXECUTED.clone()))?;
    REGISTRY.register(Box::new(EPISODES_COMPLETED.clone()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liquidation_counter_moves() {
        let before = LIQUIDATIONS_EXECUTED.get();
        let mut portfolio = crate::ledger::Portfolio::new(1000.0, 10.0).unwrap();
        portfolio.add_long(100.0, 0.5).unwrap();
        assert!(portfolio.liquidate(90.0));
        assert!(LIQUIDATIONS_EXECUTED.get() >= before + 1);
    }

    #[test]
    fn test_register_exposes_families_once() {
        register_metrics().unwrap();
        let names: Vec<String> = REGISTRY.gather().iter().map(|f| f.get_name().to_string()).collect();
        assert!(names.contains(&"liquidations_executed_total".to_string()));
        assert!(names.contains(&"episodes_completed_total".to_string()));

        assert!(matches!(register_metrics(), Err(crate::error::Error::MetricsError(_))));
    }
}
