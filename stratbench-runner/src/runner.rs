//! StrategyRunner: one strategy bound to one symbol's series.

use stratbench_core::{
    run_backtest, AccountConfig, BacktestError, BacktestOutcome, ParameterSet, PriceSeries,
    Strategy,
};

use crate::optimizer::{self, OptimizationResult, OptimizeError};
use crate::param_store::ParamStore;
use crate::report::ReportRow;

/// Evaluates and optimizes a single (strategy, symbol) pair.
pub struct StrategyRunner<'a> {
    strategy: &'a dyn Strategy,
    series: &'a PriceSeries,
    config: AccountConfig,
}

impl<'a> StrategyRunner<'a> {
    pub fn new(strategy: &'a dyn Strategy, series: &'a PriceSeries, config: AccountConfig) -> Self {
        Self {
            strategy,
            series,
            config,
        }
    }

    pub fn strategy(&self) -> &dyn Strategy {
        self.strategy
    }

    /// One backtest with explicit parameters.
    pub fn evaluate(&self, params: &ParameterSet) -> Result<BacktestOutcome, BacktestError> {
        run_backtest(self.strategy, self.series, params, &self.config)
    }

    /// Persisted grid-search; see [`optimizer::optimize`].
    pub fn optimize(
        &self,
        store: &ParamStore,
        force: bool,
    ) -> Result<OptimizationResult, OptimizeError> {
        optimizer::optimize(self.strategy, self.series, &self.config, store, force)
    }

    /// Assemble the report entry for a finished run.
    pub fn report_row(&self, params: &ParameterSet, outcome: &BacktestOutcome) -> ReportRow {
        let last = self.series.last_bar();
        ReportRow {
            symbol: self.series.symbol().to_string(),
            strategy: self.strategy.name().to_string(),
            description: self.strategy.description().to_string(),
            params: params.clone(),
            signal: outcome.last_signal,
            price: last.close,
            profit_pct: outcome.profit_pct,
            date: last.date,
            bar_index: self.series.len() - 1,
            fingerprint: self.series.fingerprint(),
            factors: outcome.factors.snapshot(self.series.len() - 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratbench_core::data::{random_walk_series, SeriesSource, SyntheticSource};
    use stratbench_core::strategy::MaCrossover;

    #[test]
    fn evaluate_accepts_defaults() {
        let series = random_walk_series("600000", 120, 7);
        let runner = StrategyRunner::new(&MaCrossover, &series, AccountConfig::default());
        let outcome = runner.evaluate(&MaCrossover.default_params()).unwrap();
        assert_eq!(outcome.account.shares(), 0);
    }

    #[test]
    fn report_row_reflects_series_and_outcome() {
        let source = SyntheticSource::new(120);
        let series = source.fetch("600000").unwrap();
        let runner = StrategyRunner::new(&MaCrossover, &series, AccountConfig::default());
        let params = MaCrossover.default_params();
        let outcome = runner.evaluate(&params).unwrap();
        let row = runner.report_row(&params, &outcome);

        assert_eq!(row.symbol, "600000");
        assert_eq!(row.strategy, "ma_crossover");
        assert_eq!(row.price, series.last_bar().close);
        assert_eq!(row.date, series.last_bar().date);
        assert_eq!(row.fingerprint, series.fingerprint());
        assert!(row.factors.iter().any(|(n, _)| n == "short_mavg"));
    }
}
