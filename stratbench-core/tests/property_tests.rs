//! Property tests for the account ledger invariants.

use chrono::NaiveDate;
use proptest::prelude::*;

use stratbench_core::{Account, AccountConfig, TradeAction};

#[derive(Debug, Clone)]
enum Op {
    Buy(f64, f64),
    Sell(f64, f64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0.5f64..500.0, 0.1f64..=1.0).prop_map(|(p, f)| Op::Buy(p, f)),
        (0.5f64..500.0, 0.1f64..=1.0).prop_map(|(p, f)| Op::Sell(p, f)),
    ]
}

fn run_ops(ops: &[Op]) -> Account {
    let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut account = Account::new("TEST", AccountConfig::default());
    for (i, op) in ops.iter().enumerate() {
        match *op {
            Op::Buy(price, fraction) => account.buy(price, date, i, fraction).unwrap(),
            Op::Sell(price, fraction) => account.sell(price, date, i, fraction).unwrap(),
        }
    }
    account
}

proptest! {
    /// Positive-price buys and sells can never drive cash negative.
    #[test]
    fn cash_never_goes_negative(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let account = run_ops(&ops);
        prop_assert!(account.cash() >= 0.0, "cash went negative: {}", account.cash());
        for tx in account.transactions() {
            prop_assert!(tx.cash_after >= 0.0);
        }
    }

    /// Every executed buy is a whole number of 100-share lots.
    #[test]
    fn buys_are_lot_multiples(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let account = run_ops(&ops);
        for tx in account.transactions() {
            if tx.action == TradeAction::Buy {
                prop_assert_eq!(tx.shares % 100, 0);
                prop_assert!(tx.shares > 0);
            }
        }
    }

    /// Reset always returns the account to zero profit and a clean ledger.
    #[test]
    fn reset_zeroes_profit(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut account = run_ops(&ops);
        account.reset();
        prop_assert_eq!(account.profit_pct(), 0.0);
        prop_assert_eq!(account.shares(), 0);
        prop_assert!(account.transactions().is_empty());
    }

    /// Fees are always non-negative and proportional to notional value.
    #[test]
    fn fees_are_consistent(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let account = run_ops(&ops);
        for tx in account.transactions() {
            let rate = match tx.action {
                TradeAction::Buy => 0.0003,
                TradeAction::Sell => 0.0008,
            };
            let expected = rate * tx.price * tx.shares as f64;
            prop_assert!((tx.fee - expected).abs() < 1e-6);
        }
    }
}
