use proptest::prelude::*;
use MarginLedger::invariants::checks::InvariantChecks;
use MarginLedger::{Portfolio, Side};

#[derive(Clone, Debug)]
enum Op {
    Open(Side, f64, f64),
    Close(Side, f64, f64),
    Liquidate(f64),
}

fn side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Long), Just(Side::Short)]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (side(), 50.0..150.0f64, 0.0..=1.0f64).prop_map(|(s, p, r)| Op::Open(s, p, r)),
        (side(), 50.0..150.0f64, 0.0..=1.0f64).prop_map(|(s, p, r)| Op::Close(s, p, r)),
        (50.0..150.0f64).prop_map(Op::Liquidate),
    ]
}

fn apply(pf: &mut Portfolio, op: &Op) {
    match *op {
        Op::Open(side, price, rate) => pf.open(side, price, rate).unwrap(),
        Op::Close(side, price, rate) => pf.close(side, price, rate).unwrap(),
        Op::Liquidate(price) => {
            pf.liquidate(price);
        }
    }
}

/// Error budget scaled by the magnitudes that feed into equity.
fn budget(pf: &Portfolio) -> f64 {
    let scale = pf.free().abs()
        + pf.long().cost()
        + pf.short().cost()
        + (pf.leverage() * pf.realized_pnl()).abs()
        + pf.leverage() * pf.initial_balance();
    1e-9 * scale.max(1.0)
}

proptest! {
    #[test]
    fn equity_tracks_realized_pnl(
        leverage in 1.0..10.0f64,
        ops in prop::collection::vec(op(), 1..40),
    ) {
        let mut pf = Portfolio::new(1000.0, leverage).unwrap();

        for op in &ops {
            apply(&mut pf, op);

            let expected = pf.leverage() * (pf.initial_balance() + pf.realized_pnl());
            prop_assert!(
                (pf.equity() - expected).abs() <= budget(&pf),
                "equity={} expected={} after {:?}", pf.equity(), expected, op
            );

            InvariantChecks::check_position_consistency(pf.long()).unwrap();
            InvariantChecks::check_position_consistency(pf.short()).unwrap();
        }
    }

    #[test]
    fn zero_rates_are_no_ops(
        leverage in 1.0..10.0f64,
        setup in prop::collection::vec(op(), 0..10),
        price in 50.0..150.0f64,
        s in side(),
    ) {
        let mut pf = Portfolio::new(1000.0, leverage).unwrap();
        for op in &setup {
            apply(&mut pf, op);
        }
        let before = pf.clone();

        pf.open(s, price, 0.0).unwrap();
        pf.close(s, price, 0.0).unwrap();
        prop_assert_eq!(pf, before);
    }

    #[test]
    fn liquidation_matches_threshold(
        leverage in 1.0..20.0f64,
        rate in 0.01..=1.0f64,
        mark in 1.0..200.0f64,
    ) {
        let mut pf = Portfolio::new(1000.0, leverage).unwrap();
        pf.add_long(100.0, rate).unwrap();

        let loss = (pf.long().average_price() - mark) * pf.long().amount();
        let free = pf.free_margin();
        let should_fire = loss > 0.0 && loss >= free;

        prop_assert_eq!(pf.liquidate(mark), should_fire);
        if should_fire {
            prop_assert_eq!(pf.equity(), 0.0);
        }
    }
}
