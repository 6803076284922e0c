//! Grid-search optimizer over a strategy's parameter space.
//!
//! Exhaustive sweep of the Cartesian grid in declaration order, tracking the
//! best realized profit with strict `>` so the first combination seen wins
//! ties. Winners are persisted to the parameter store keyed by
//! (strategy, symbol); a later run finds the persisted set and skips the
//! sweep unless forced.

use thiserror::Error;
use tracing::{debug, info};

use stratbench_core::{
    run_backtest, AccountConfig, BacktestError, BacktestOutcome, ParameterSet, PriceSeries,
    Strategy,
};

use crate::param_store::{ParamStore, StoreError};

/// Errors from one optimization run.
#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error(transparent)]
    Backtest(#[from] BacktestError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("parameter grid for '{0}' is empty")]
    EmptyGrid(String),
}

/// Winning parameters and the backtest that selected them.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub params: ParameterSet,
    pub profit_pct: f64,
    pub outcome: BacktestOutcome,
    /// Combinations actually backtested.
    pub evaluated: usize,
    /// Combinations rejected by `validate_params` without a backtest.
    pub skipped: usize,
}

/// Sweep the full grid and return the best parameters.
///
/// Does not consult or write any store; see [`optimize`] for the persisted
/// variant.
pub fn grid_search(
    strategy: &dyn Strategy,
    series: &PriceSeries,
    config: &AccountConfig,
) -> Result<OptimizationResult, OptimizeError> {
    let mut best: Option<OptimizationResult> = None;
    let mut evaluated = 0usize;
    let mut skipped = 0usize;

    for params in strategy.param_space().combinations() {
        if !strategy.validate_params(&params) {
            skipped += 1;
            continue;
        }
        let outcome = run_backtest(strategy, series, &params, config)?;
        evaluated += 1;
        debug!(
            strategy = strategy.name(),
            symbol = series.symbol(),
            params = %params,
            profit_pct = outcome.profit_pct,
            "grid candidate evaluated"
        );
        let better = match &best {
            Some(b) => outcome.profit_pct > b.profit_pct,
            None => true,
        };
        if better {
            best = Some(OptimizationResult {
                params,
                profit_pct: outcome.profit_pct,
                outcome,
                evaluated: 0,
                skipped: 0,
            });
        }
    }

    let mut result = best.ok_or_else(|| OptimizeError::EmptyGrid(strategy.name().to_string()))?;
    result.evaluated = evaluated;
    result.skipped = skipped;
    Ok(result)
}

/// Optimize with persistence.
///
/// When the store already holds a tuned set for (strategy, symbol) and
/// `force` is false, that set is backtested directly and no sweep runs.
/// Otherwise the grid is searched and the winner saved.
pub fn optimize(
    strategy: &dyn Strategy,
    series: &PriceSeries,
    config: &AccountConfig,
    store: &ParamStore,
    force: bool,
) -> Result<OptimizationResult, OptimizeError> {
    if !force {
        if let Some(params) = store.load(strategy.name(), series.symbol())? {
            let outcome = run_backtest(strategy, series, &params, config)?;
            let profit_pct = outcome.profit_pct;
            return Ok(OptimizationResult {
                params,
                profit_pct,
                outcome,
                evaluated: 1,
                skipped: 0,
            });
        }
    }

    let result = grid_search(strategy, series, config)?;
    store.save(strategy.name(), series.symbol(), &result.params)?;
    info!(
        strategy = strategy.name(),
        symbol = series.symbol(),
        params = %result.params,
        profit_pct = result.profit_pct,
        evaluated = result.evaluated,
        skipped = result.skipped,
        "optimization finished"
    );
    Ok(result)
}
