//! The `Strategy` trait and its concrete variants.
//!
//! A strategy supplies three hooks the backtester drives: factor computation
//! over the whole series, and per-bar buy/sell rules over the factor-augmented
//! rows with bounded lookback. Signal rules are stateless given the bar index;
//! they must return `false` (never panic) below warm-up or wherever a required
//! factor is still NaN.

pub mod bollinger;
pub mod kdj;
pub mod ma_crossover;
pub mod macd;
pub mod price_deviation;
pub mod volume_ma;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::PriceSeries;
use crate::factors::{FactorError, FactorFrame};
use crate::params::{ParamSpace, ParameterSet};

pub use bollinger::Bollinger;
pub use kdj::Kdj;
pub use ma_crossover::MaCrossover;
pub use macd::Macd;
pub use price_deviation::PriceDeviation;
pub use volume_ma::VolumeMa;

/// Per-bar decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Buy => write!(f, "Buy"),
            Signal::Sell => write!(f, "Sell"),
            Signal::Hold => write!(f, "Hold"),
        }
    }
}

/// Read-only view over a series and its computed factors, handed to signal
/// rules bar by bar.
#[derive(Debug, Clone, Copy)]
pub struct FactorView<'a> {
    pub series: &'a PriceSeries,
    pub factors: &'a FactorFrame,
}

impl<'a> FactorView<'a> {
    pub fn new(series: &'a PriceSeries, factors: &'a FactorFrame) -> Self {
        Self { series, factors }
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn close(&self, index: usize) -> f64 {
        self.series.bar(index).close
    }

    pub fn volume(&self, index: usize) -> f64 {
        self.series.bar(index).volume as f64
    }

    /// Factor value at one bar; NaN for a missing column.
    pub fn factor(&self, name: &str, index: usize) -> f64 {
        self.factors.value(name, index)
    }
}

/// A rule-based trading strategy: factor pipeline + signal rules + the
/// discretized parameter space the optimizer searches.
pub trait Strategy: Send + Sync {
    /// Short stable identifier, used as the persistence key.
    fn name(&self) -> &'static str;

    /// One-line human description for reports.
    fn description(&self) -> &'static str;

    /// Compile-time default parameters, used when no tuned set is persisted.
    fn default_params(&self) -> ParameterSet;

    /// Ranges and steps the optimizer enumerates.
    fn param_space(&self) -> ParamSpace;

    /// Cross-parameter validity predicate. Invalid combinations are skipped
    /// by the optimizer without being backtested.
    fn validate_params(&self, _params: &ParameterSet) -> bool {
        true
    }

    /// First bar index at which every required factor is populated and the
    /// rule's own lookback is satisfied. Signals below this index are false.
    fn warm_up_length(&self, params: &ParameterSet) -> usize;

    /// Derive all factor columns from the raw series. Pure; recomputed on
    /// every parameter change, never cached across runs.
    fn calculate_factors(
        &self,
        series: &PriceSeries,
        params: &ParameterSet,
    ) -> Result<FactorFrame, FactorError>;

    fn buy_signal(&self, view: &FactorView<'_>, params: &ParameterSet, index: usize) -> bool;

    fn sell_signal(&self, view: &FactorView<'_>, params: &ParameterSet, index: usize) -> bool;
}

/// The built-in strategy set, in report order.
pub fn all_strategies() -> Vec<Arc<dyn Strategy>> {
    vec![
        Arc::new(MaCrossover),
        Arc::new(Bollinger),
        Arc::new(Kdj),
        Arc::new(Macd),
        Arc::new(VolumeMa),
        Arc::new(PriceDeviation),
    ]
}
