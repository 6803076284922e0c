//! StratBench Core — strategy evaluation engine.
//!
//! This crate contains the computational heart of the system:
//! - Domain types (bars, price series, transactions)
//! - Typed parameters and the discretized search space
//! - Factor columns and rolling primitives
//! - The `Strategy` trait with six concrete signal rules
//! - The cash-accurate `Account` ledger (lot sizing, asymmetric commissions)
//! - The deterministic backtest loop
//! - The `SeriesSource` data boundary with CSV and synthetic implementations

pub mod account;
pub mod backtest;
pub mod data;
pub mod domain;
pub mod factors;
pub mod params;
pub mod strategy;

pub use account::{Account, AccountConfig, AccountError};
pub use backtest::{run_backtest, BacktestError, BacktestOutcome};
pub use domain::{Bar, PriceSeries, SeriesError, TradeAction, Transaction};
pub use factors::{FactorError, FactorFrame};
pub use params::{ParamError, ParamSpace, ParamSpec, ParamValue, ParameterSet};
pub use strategy::{all_strategies, FactorView, Signal, Strategy};
