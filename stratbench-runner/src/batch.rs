//! Batch orchestration: one task per symbol on a bounded worker pool.
//!
//! Every task owns its series, factor frames and accounts outright; the only
//! shared structure is the mutex-guarded result sink, so rows land in
//! completion order. A failing symbol is logged and recorded, never fatal to
//! its siblings.

use std::sync::{Arc, Mutex};

use anyhow::Context;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

use stratbench_core::data::SeriesSource;
use stratbench_core::{Signal, Strategy, TradeAction};

use crate::config::RunnerConfig;
use crate::notify::Notifier;
use crate::param_store::{ParamStore, StoreError};
use crate::report::{BatchReport, ReportRow, TaskFailure};
use crate::runner::StrategyRunner;
use crate::trade_store::TradeStore;

/// Errors raised before any task runs; per-task failures are collected in
/// the report instead.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Runs every strategy against every requested symbol.
pub struct BatchOrchestrator {
    source: Arc<dyn SeriesSource>,
    strategies: Vec<Arc<dyn Strategy>>,
    config: RunnerConfig,
    param_store: ParamStore,
    trade_store: Option<TradeStore>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl BatchOrchestrator {
    /// Build an orchestrator over the full strategy roster.
    pub fn new(
        source: Arc<dyn SeriesSource>,
        strategies: Vec<Arc<dyn Strategy>>,
        config: RunnerConfig,
    ) -> Result<Self, BatchError> {
        let param_store = ParamStore::open(&config.stores.param_dir)?;
        Ok(Self {
            source,
            strategies,
            config,
            param_store,
            trade_store: None,
            notifier: None,
        })
    }

    /// Persist Buy/Sell rows into a trade store after each run.
    pub fn with_trade_store(mut self, store: TradeStore) -> Self {
        self.trade_store = Some(store);
        self
    }

    /// Notify on every non-Hold row after each run.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    fn run_symbol(&self, symbol: &str) -> anyhow::Result<Vec<ReportRow>> {
        let series = self.source.fetch(symbol)?;
        let force = self.config.optimizer.force_reoptimize;
        let mut rows = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            let runner = StrategyRunner::new(
                strategy.as_ref(),
                &series,
                self.config.account.clone(),
            );
            let result = runner
                .optimize(&self.param_store, force)
                .with_context(|| format!("optimizing {}", strategy.name()))?;
            rows.push(runner.report_row(&result.params, &result.outcome));
        }
        Ok(rows)
    }

    /// Run the batch, one task per symbol, bounded by `batch.max_workers`.
    ///
    /// Row order is completion order; callers needing determinism use
    /// [`BatchReport::sorted_rows`].
    pub fn run(&self, symbols: &[String]) -> Result<BatchReport, BatchError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.batch.max_workers)
            .build()?;

        let rows: Mutex<Vec<ReportRow>> = Mutex::new(Vec::new());
        let failures: Mutex<Vec<TaskFailure>> = Mutex::new(Vec::new());

        pool.install(|| {
            symbols.par_iter().for_each(|symbol| {
                match self.run_symbol(symbol) {
                    Ok(mut symbol_rows) => {
                        let mut sink = rows.lock().unwrap_or_else(|e| e.into_inner());
                        sink.append(&mut symbol_rows);
                    }
                    Err(err) => {
                        warn!(symbol = %symbol, error = %err, "symbol task failed");
                        let mut sink = failures.lock().unwrap_or_else(|e| e.into_inner());
                        sink.push(TaskFailure {
                            symbol: symbol.clone(),
                            message: format!("{err:#}"),
                        });
                    }
                }
            });
        });

        let report = BatchReport {
            rows: rows.into_inner().unwrap_or_else(|e| e.into_inner()),
            failures: failures.into_inner().unwrap_or_else(|e| e.into_inner()),
        };
        info!(
            rows = report.rows.len(),
            failures = report.failures.len(),
            "batch finished"
        );

        self.record_trades(&report)?;
        if let Some(notifier) = &self.notifier {
            for row in &report.rows {
                notifier.notify(row);
            }
        }
        Ok(report)
    }

    /// Upsert every actionable row into the trade store, if one is attached.
    fn record_trades(&self, report: &BatchReport) -> Result<(), BatchError> {
        let Some(store) = &self.trade_store else {
            return Ok(());
        };
        for row in &report.rows {
            let action = match row.signal {
                Signal::Buy => TradeAction::Buy,
                Signal::Sell => TradeAction::Sell,
                Signal::Hold => continue,
            };
            // Non-finite factor values serialize as null.
            let info = serde_json::json!({
                "name": row.strategy,
                "description": row.description,
                "parameters": row.params,
                "action": row.signal.to_string(),
                "profit": row.profit_pct,
                "factors": row.factors,
            })
            .to_string();
            store.upsert(
                &row.symbol,
                row.date,
                &self.config.batch.universe,
                &row.strategy,
                action,
                row.price,
                &info,
            )?;
        }
        Ok(())
    }
}
