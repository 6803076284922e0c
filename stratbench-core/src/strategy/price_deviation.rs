//! Mean-reversion on percent deviation from a rolling mean.
//!
//! Deviation = (close - moving_avg) / moving_avg * 100. A drop of `percent`
//! or more below the mean buys; a rise of `percent` or more above it sells.
//! Non-strict comparisons: hitting the threshold exactly triggers.

use crate::domain::PriceSeries;
use crate::factors::{rolling_mean, FactorError, FactorFrame};
use crate::params::{ParamError, ParamSpace, ParamSpec, ParameterSet};

use super::{FactorView, Strategy};

const MAVG: &str = "moving_avg";
const DEVIATION: &str = "percent";

/// Bars past the rolling window before the rule becomes active.
const GUARD_LAG: usize = 2;

struct PdParams {
    window: usize,
    percent: f64,
}

impl PdParams {
    fn decode(params: &ParameterSet) -> Result<Self, ParamError> {
        Ok(Self {
            window: params.window("window")?,
            percent: params.float("percent")?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PriceDeviation;

impl Strategy for PriceDeviation {
    fn name(&self) -> &'static str {
        "pd"
    }

    fn description(&self) -> &'static str {
        "Mean reversion: buy when close sags percent below its mean, sell when it stretches above"
    }

    fn default_params(&self) -> ParameterSet {
        ParameterSet::new().with("window", 5).with("percent", 10)
    }

    fn param_space(&self) -> ParamSpace {
        ParamSpace::new(vec![
            ParamSpec::int("window", 3, 35),
            ParamSpec::int("percent", 2, 20),
        ])
    }

    fn warm_up_length(&self, params: &ParameterSet) -> usize {
        params
            .window("window")
            .map_or(usize::MAX, |w| w + GUARD_LAG)
    }

    fn calculate_factors(
        &self,
        series: &PriceSeries,
        params: &ParameterSet,
    ) -> Result<FactorFrame, FactorError> {
        let p = match PdParams::decode(params) {
            Ok(p) => p,
            Err(_) => return Ok(FactorFrame::new(series.len())),
        };
        let closes = series.closes();
        let mavg = rolling_mean(&closes, p.window);
        let deviation: Vec<f64> = closes
            .iter()
            .zip(&mavg)
            .map(|(c, m)| (c - m) * 100.0 / m)
            .collect();

        let mut frame = FactorFrame::new(series.len());
        frame.insert(MAVG, mavg)?;
        frame.insert(DEVIATION, deviation)?;
        Ok(frame)
    }

    fn buy_signal(&self, view: &FactorView<'_>, params: &ParameterSet, i: usize) -> bool {
        let Ok(p) = PdParams::decode(params) else {
            return false;
        };
        if i < p.window + GUARD_LAG {
            return false;
        }
        let deviation = view.factor(DEVIATION, i);
        !deviation.is_nan() && deviation <= -p.percent
    }

    fn sell_signal(&self, view: &FactorView<'_>, params: &ParameterSet, i: usize) -> bool {
        let Ok(p) = PdParams::decode(params) else {
            return false;
        };
        if i < p.window + GUARD_LAG {
            return false;
        }
        let deviation = view.factor(DEVIATION, i);
        !deviation.is_nan() && deviation >= p.percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testutil::series_from_closes;

    #[test]
    fn deviation_is_percent_of_mean() {
        let closes = vec![100.0, 100.0, 100.0, 100.0, 100.0, 110.0];
        let series = series_from_closes(&closes);
        let params = PriceDeviation.default_params();
        let frame = PriceDeviation.calculate_factors(&series, &params).unwrap();
        // mean(100,100,100,100,110) = 102; (110-102)/102*100
        let expected = (110.0 - 102.0) / 102.0 * 100.0;
        assert!((frame.value(DEVIATION, 5) - expected).abs() < 1e-9);
    }

    #[test]
    fn buy_on_deep_sag_sell_on_stretch() {
        let mut closes = vec![100.0; 10];
        closes.push(85.0); // well below a ~97 mean -> deviation < -10%
        let mut high = vec![100.0; 10];
        high.push(115.0);
        let params = PriceDeviation.default_params();

        let sag = series_from_closes(&closes);
        let frame = PriceDeviation.calculate_factors(&sag, &params).unwrap();
        let view = FactorView::new(&sag, &frame);
        assert!(PriceDeviation.buy_signal(&view, &params, 10));
        assert!(!PriceDeviation.sell_signal(&view, &params, 10));

        let stretch = series_from_closes(&high);
        let frame = PriceDeviation.calculate_factors(&stretch, &params).unwrap();
        let view = FactorView::new(&stretch, &frame);
        assert!(PriceDeviation.sell_signal(&view, &params, 10));
        assert!(!PriceDeviation.buy_signal(&view, &params, 10));
    }

    #[test]
    fn quiet_inside_guard_lag() {
        let mut closes = vec![100.0; 6];
        closes[5] = 80.0;
        let series = series_from_closes(&closes);
        let params = PriceDeviation.default_params();
        let frame = PriceDeviation.calculate_factors(&series, &params).unwrap();
        let view = FactorView::new(&series, &frame);
        for i in 0..PriceDeviation.warm_up_length(&params) {
            assert!(!PriceDeviation.buy_signal(&view, &params, i));
            assert!(!PriceDeviation.sell_signal(&view, &params, i));
        }
    }
}
