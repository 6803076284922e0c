//! Dual moving-average strategy with derivative turn detection.
//!
//! Tracks a short and a long rolling mean of the close plus their first
//! differences. Buys when the short line turns up below the long line (short
//! derivative flips from <= 0 to > 0 while the long line is also rising);
//! sells on the mirrored turn down above the long line.

use crate::domain::PriceSeries;
use crate::factors::{diff_or_zero, rolling_mean, FactorError, FactorFrame};
use crate::params::{ParamError, ParamSpace, ParamSpec, ParameterSet};

use super::{FactorView, Strategy};

const SHORT_MAVG: &str = "short_mavg";
const LONG_MAVG: &str = "long_mavg";
const SHORT_DERIV: &str = "short_mavg_derivative";
const LONG_DERIV: &str = "long_mavg_derivative";

struct Windows {
    short: usize,
    long: usize,
}

impl Windows {
    fn decode(params: &ParameterSet) -> Result<Self, ParamError> {
        Ok(Self {
            short: params.window("short_window")?,
            long: params.window("long_window")?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MaCrossover;

impl Strategy for MaCrossover {
    fn name(&self) -> &'static str {
        "ma_crossover"
    }

    fn description(&self) -> &'static str {
        "Short/long moving averages; trade on derivative turns across the long line"
    }

    fn default_params(&self) -> ParameterSet {
        ParameterSet::new()
            .with("short_window", 5)
            .with("long_window", 20)
    }

    fn param_space(&self) -> ParamSpace {
        ParamSpace::new(vec![
            ParamSpec::int_step("short_window", 3, 12, 2),
            ParamSpec::int_step("long_window", 12, 40, 2),
        ])
    }

    fn validate_params(&self, params: &ParameterSet) -> bool {
        match (params.window("short_window"), params.window("long_window")) {
            (Ok(short), Ok(long)) => short < long,
            _ => false,
        }
    }

    fn warm_up_length(&self, params: &ParameterSet) -> usize {
        // Long mean is populated from long-1, so its derivative is first
        // real at long; the short-side lookback fills well before that.
        params.window("long_window").unwrap_or(usize::MAX)
    }

    fn calculate_factors(
        &self,
        series: &PriceSeries,
        params: &ParameterSet,
    ) -> Result<FactorFrame, FactorError> {
        let w = match Windows::decode(params) {
            Ok(w) => w,
            Err(_) => return Ok(FactorFrame::new(series.len())),
        };
        let closes = series.closes();
        let short = rolling_mean(&closes, w.short);
        let long = rolling_mean(&closes, w.long);

        let mut frame = FactorFrame::new(series.len());
        frame.insert(SHORT_DERIV, diff_or_zero(&short))?;
        frame.insert(LONG_DERIV, diff_or_zero(&long))?;
        frame.insert(SHORT_MAVG, short)?;
        frame.insert(LONG_MAVG, long)?;
        Ok(frame)
    }

    fn buy_signal(&self, view: &FactorView<'_>, _params: &ParameterSet, i: usize) -> bool {
        if i < 2 {
            return false;
        }
        let short = view.factor(SHORT_MAVG, i);
        let long = view.factor(LONG_MAVG, i);
        if short.is_nan() || long.is_nan() {
            return false;
        }
        short < long
            && view.factor(LONG_DERIV, i) > 0.0
            && view.factor(SHORT_DERIV, i) > 0.0
            && view.factor(SHORT_DERIV, i - 1) <= 0.0
            && view.factor(SHORT_DERIV, i - 2) < 0.0
    }

    fn sell_signal(&self, view: &FactorView<'_>, _params: &ParameterSet, i: usize) -> bool {
        if i < 2 {
            return false;
        }
        let short = view.factor(SHORT_MAVG, i);
        let long = view.factor(LONG_MAVG, i);
        if short.is_nan() || long.is_nan() {
            return false;
        }
        short > long
            && view.factor(LONG_DERIV, i) < 0.0
            && view.factor(SHORT_DERIV, i) < 0.0
            && view.factor(SHORT_DERIV, i - 1) >= 0.0
            && view.factor(SHORT_DERIV, i - 2) > 0.0
    }
}
