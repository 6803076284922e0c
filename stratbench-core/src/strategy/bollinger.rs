//! Bollinger band strategy: band touch with reversal, squeeze and expansion
//! breakouts.
//!
//! Middle band is the rolling mean of the close; upper/lower are the middle
//! +/- a multiplier times the rolling (sample) standard deviation.

use crate::domain::PriceSeries;
use crate::factors::{rolling_mean, rolling_std, FactorError, FactorFrame};
use crate::params::{ParamError, ParamSpace, ParamSpec, ParameterSet};

use super::{FactorView, Strategy};

const MIDDLE: &str = "moving_avg";
const STD: &str = "std";
const UPPER: &str = "upper";
const LOWER: &str = "lower";

/// Band-width contraction threshold for the squeeze rule.
const SQUEEZE_RATIO: f64 = 0.8;
/// Band-width growth threshold for the expansion rule.
const EXPANSION_RATIO: f64 = 1.2;

struct BollParams {
    window: usize,
    mult: f64,
}

impl BollParams {
    fn decode(params: &ParameterSet) -> Result<Self, ParamError> {
        Ok(Self {
            window: params.window("window")?,
            mult: params.float("std")?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Bollinger;

impl Bollinger {
    fn band_width(view: &FactorView<'_>, i: usize) -> f64 {
        view.factor(UPPER, i) - view.factor(LOWER, i)
    }
}

impl Strategy for Bollinger {
    fn name(&self) -> &'static str {
        "boll"
    }

    fn description(&self) -> &'static str {
        "Bollinger bands: touch-and-reverse plus squeeze/expansion breakouts"
    }

    fn default_params(&self) -> ParameterSet {
        ParameterSet::new().with("window", 20).with("std", 2.0)
    }

    fn param_space(&self) -> ParamSpace {
        ParamSpace::new(vec![
            ParamSpec::int("window", 5, 40),
            ParamSpec::float_step("std", 0.5, 3.0, 0.2),
        ])
    }

    fn warm_up_length(&self, params: &ParameterSet) -> usize {
        params.window("window").unwrap_or(usize::MAX)
    }

    fn calculate_factors(
        &self,
        series: &PriceSeries,
        params: &ParameterSet,
    ) -> Result<FactorFrame, FactorError> {
        let p = match BollParams::decode(params) {
            Ok(p) => p,
            Err(_) => return Ok(FactorFrame::new(series.len())),
        };
        let closes = series.closes();
        let middle = rolling_mean(&closes, p.window);
        let std = rolling_std(&closes, p.window);
        let upper: Vec<f64> = middle
            .iter()
            .zip(&std)
            .map(|(m, s)| m + s * p.mult)
            .collect();
        let lower: Vec<f64> = middle
            .iter()
            .zip(&std)
            .map(|(m, s)| m - s * p.mult)
            .collect();

        let mut frame = FactorFrame::new(series.len());
        frame.insert(MIDDLE, middle)?;
        frame.insert(STD, std)?;
        frame.insert(UPPER, upper)?;
        frame.insert(LOWER, lower)?;
        Ok(frame)
    }

    fn buy_signal(&self, view: &FactorView<'_>, _params: &ParameterSet, i: usize) -> bool {
        if i == 0 || view.factor(LOWER, i).is_nan() {
            return false;
        }
        let close = view.close(i);
        let prev_close = view.close(i - 1);

        // Lower-band touch with a reversal bar.
        if close <= view.factor(LOWER, i) && close > prev_close {
            return true;
        }

        if i > 1 {
            let prev_width = Self::band_width(view, i - 1);
            let width = Self::band_width(view, i);
            let above_middle = close > view.factor(MIDDLE, i) && close > prev_close;
            // Breakout after a squeeze, or trend continuation on expansion.
            if width < prev_width * SQUEEZE_RATIO && above_middle {
                return true;
            }
            if width > prev_width * EXPANSION_RATIO && above_middle {
                return true;
            }
        }
        false
    }

    fn sell_signal(&self, view: &FactorView<'_>, _params: &ParameterSet, i: usize) -> bool {
        if i == 0 || view.factor(UPPER, i).is_nan() {
            return false;
        }
        let close = view.close(i);
        let prev_close = view.close(i - 1);

        if close >= view.factor(UPPER, i) && close < prev_close {
            return true;
        }

        if i > 1 {
            let prev_width = Self::band_width(view, i - 1);
            let width = Self::band_width(view, i);
            let below_middle = close < view.factor(MIDDLE, i) && close < prev_close;
            if width < prev_width * SQUEEZE_RATIO && below_middle {
                return true;
            }
            if width > prev_width * EXPANSION_RATIO && below_middle {
                return true;
            }
        }
        false
    }
}
