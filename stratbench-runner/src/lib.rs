//! StratBench Runner — orchestration around the core engine.
//!
//! - Grid-search optimizer with durable winning parameters
//! - JSON-directory parameter and trade-record stores
//! - Per-symbol `StrategyRunner` and the bounded-pool `BatchOrchestrator`
//! - CSV report export and the `Notifier` boundary
//! - TOML configuration with full defaults

pub mod batch;
pub mod config;
pub mod notify;
pub mod optimizer;
pub mod param_store;
pub mod report;
pub mod runner;
pub mod trade_store;

pub use batch::{BatchError, BatchOrchestrator};
pub use config::{BatchConfig, ConfigError, OptimizerConfig, RunnerConfig, StoreConfig};
pub use notify::{trade_summary, LogNotifier, Notifier};
pub use optimizer::{grid_search, optimize, OptimizationResult, OptimizeError};
pub use param_store::{ParamStore, StoreError};
pub use report::{BatchReport, ReportError, ReportRow, TaskFailure};
pub use runner::StrategyRunner;
pub use trade_store::{StrategyRecord, TradeStore};
