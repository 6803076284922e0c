//! Backtest loop: drive a strategy's signals through a fresh account.
//!
//! One pass per (series, ParameterSet): recompute factors, walk bars from
//! warm-up to the end evaluating buy before sell, then force-liquidate any
//! open holding at the final close so profit reflects realized cash.

use thiserror::Error;

use crate::account::{Account, AccountConfig, AccountError};
use crate::domain::PriceSeries;
use crate::factors::{FactorError, FactorFrame};
use crate::params::{ParamError, ParameterSet};
use crate::strategy::{FactorView, Signal, Strategy};

/// Errors from a single backtest run.
#[derive(Debug, Error)]
pub enum BacktestError {
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Factor(#[from] FactorError),
    #[error(transparent)]
    Param(#[from] ParamError),
}

/// Completed run: the finished account, its realized profit, the standing
/// signal at the last bar, and the factor frame for inspection.
#[derive(Debug, Clone)]
pub struct BacktestOutcome {
    pub account: Account,
    pub profit_pct: f64,
    pub last_signal: Signal,
    pub factors: FactorFrame,
    pub warm_up: usize,
}

/// Run one deterministic backtest.
///
/// The account is created fresh; a rejected buy (lot rounds to zero, cost
/// exceeds cash) simply advances to the next bar — there are no retries.
pub fn run_backtest(
    strategy: &dyn Strategy,
    series: &PriceSeries,
    params: &ParameterSet,
    config: &AccountConfig,
) -> Result<BacktestOutcome, BacktestError> {
    let factors = strategy.calculate_factors(series, params)?;
    let view = FactorView::new(series, &factors);
    let warm_up = strategy.warm_up_length(params);

    let mut account = Account::new(series.symbol(), config.clone());
    for i in warm_up..series.len() {
        let bar = series.bar(i);
        if strategy.buy_signal(&view, params, i) {
            account.buy(bar.close, bar.date, i, 1.0)?;
        } else if strategy.sell_signal(&view, params, i) {
            account.sell(bar.close, bar.date, i, 1.0)?;
        }
    }

    // Close any open position at the final bar so profit is fully realized.
    if account.shares() > 0 {
        let last = series.last_bar();
        account.sell(last.close, last.date, series.len() - 1, 1.0)?;
    }

    let last_index = series.len() - 1;
    let last_signal = if strategy.buy_signal(&view, params, last_index) {
        Signal::Buy
    } else if strategy.sell_signal(&view, params, last_index) {
        Signal::Sell
    } else {
        Signal::Hold
    };

    let profit_pct = account.profit_pct();
    Ok(BacktestOutcome {
        account,
        profit_pct,
        last_signal,
        factors,
        warm_up,
    })
}
