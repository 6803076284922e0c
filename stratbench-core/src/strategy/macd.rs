//! MACD strategy: DIF/DEA crosses and histogram sign changes.
//!
//! DIF = EMA(close, short) - EMA(close, long); DEA = EMA(DIF, middle);
//! histogram = 2 * (DIF - DEA). Buys on DIF crossing above DEA (non-strict
//! prior comparison) or the histogram turning positive; sells on the mirror.

use crate::domain::PriceSeries;
use crate::factors::{ewm_mean, FactorError, FactorFrame};
use crate::params::{ParamError, ParamSpace, ParamSpec, ParameterSet};

use super::{FactorView, Strategy};

const EMA_SHORT: &str = "ema_short";
const EMA_LONG: &str = "ema_long";
const DIF: &str = "dif";
const DEA: &str = "dea";
const HIST: &str = "macd";

struct MacdParams {
    short: usize,
    long: usize,
    middle: usize,
}

impl MacdParams {
    fn decode(params: &ParameterSet) -> Result<Self, ParamError> {
        Ok(Self {
            short: params.window("short")?,
            long: params.window("long")?,
            middle: params.window("middle")?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Macd;

impl Strategy for Macd {
    fn name(&self) -> &'static str {
        "macd"
    }

    fn description(&self) -> &'static str {
        "MACD: DIF/DEA crosses and histogram sign flips"
    }

    fn default_params(&self) -> ParameterSet {
        ParameterSet::new()
            .with("short", 12)
            .with("long", 26)
            .with("middle", 9)
    }

    fn param_space(&self) -> ParamSpace {
        ParamSpace::new(vec![
            ParamSpec::int("short", 2, 30),
            ParamSpec::int("long", 3, 60),
            ParamSpec::int("middle", 2, 30),
        ])
    }

    fn validate_params(&self, params: &ParameterSet) -> bool {
        match (params.window("short"), params.window("long")) {
            (Ok(short), Ok(long)) => short < long,
            _ => false,
        }
    }

    fn warm_up_length(&self, _params: &ParameterSet) -> usize {
        // Seeded EMAs are defined from bar 0; the cross rules need one bar.
        1
    }

    fn calculate_factors(
        &self,
        series: &PriceSeries,
        params: &ParameterSet,
    ) -> Result<FactorFrame, FactorError> {
        let p = match MacdParams::decode(params) {
            Ok(p) => p,
            Err(_) => return Ok(FactorFrame::new(series.len())),
        };
        let closes = series.closes();
        let ema_short = ewm_mean(&closes, p.short);
        let ema_long = ewm_mean(&closes, p.long);
        let dif: Vec<f64> = ema_short
            .iter()
            .zip(&ema_long)
            .map(|(s, l)| s - l)
            .collect();
        let dea = ewm_mean(&dif, p.middle);
        let hist: Vec<f64> = dif.iter().zip(&dea).map(|(d, e)| 2.0 * (d - e)).collect();

        let mut frame = FactorFrame::new(series.len());
        frame.insert(EMA_SHORT, ema_short)?;
        frame.insert(EMA_LONG, ema_long)?;
        frame.insert(DIF, dif)?;
        frame.insert(DEA, dea)?;
        frame.insert(HIST, hist)?;
        Ok(frame)
    }

    fn buy_signal(&self, view: &FactorView<'_>, _params: &ParameterSet, i: usize) -> bool {
        if i == 0 {
            return false;
        }
        let dif = view.factor(DIF, i);
        let dea = view.factor(DEA, i);
        if dif.is_nan() || dea.is_nan() {
            return false;
        }
        // Golden cross.
        if dif > dea && view.factor(DIF, i - 1) <= view.factor(DEA, i - 1) {
            return true;
        }
        // Histogram turning positive.
        view.factor(HIST, i) > 0.0 && view.factor(HIST, i - 1) <= 0.0
    }

    fn sell_signal(&self, view: &FactorView<'_>, _params: &ParameterSet, i: usize) -> bool {
        if i == 0 {
            return false;
        }
        let dif = view.factor(DIF, i);
        let dea = view.factor(DEA, i);
        if dif.is_nan() || dea.is_nan() {
            return false;
        }
        // Death cross.
        if dif < dea && view.factor(DIF, i - 1) >= view.factor(DEA, i - 1) {
            return true;
        }
        // Histogram turning negative.
        view.factor(HIST, i) < 0.0 && view.factor(HIST, i - 1) >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testutil::series_from_closes;

    #[test]
    fn factors_have_expected_columns() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let series = series_from_closes(&closes);
        let params = Macd.default_params();
        let frame = Macd.calculate_factors(&series, &params).unwrap();
        for name in [EMA_SHORT, EMA_LONG, DIF, DEA, HIST] {
            assert!(frame.column(name).is_ok(), "missing {name}");
        }
        // In a steady uptrend the short EMA leads the long one.
        assert!(frame.value(DIF, 39) > 0.0);
    }

    #[test]
    fn buy_fires_when_dif_crosses_above_dea() {
        // Decline long enough to pull DIF below DEA, then a sustained rally.
        let mut closes: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
        closes.extend((0..15).map(|i| 71.0 + 3.0 * i as f64));
        let series = series_from_closes(&closes);
        let params = Macd.default_params();
        let frame = Macd.calculate_factors(&series, &params).unwrap();
        let view = FactorView::new(&series, &frame);

        let fired = (1..closes.len()).any(|i| Macd.buy_signal(&view, &params, i));
        assert!(fired, "expected a golden cross during the rally");
    }

    #[test]
    fn sell_fires_when_dif_crosses_below_dea() {
        let mut closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        closes.extend((0..15).map(|i| 128.0 - 3.0 * i as f64));
        let series = series_from_closes(&closes);
        let params = Macd.default_params();
        let frame = Macd.calculate_factors(&series, &params).unwrap();
        let view = FactorView::new(&series, &frame);

        let fired = (1..closes.len()).any(|i| Macd.sell_signal(&view, &params, i));
        assert!(fired, "expected a death cross during the selloff");
    }

    #[test]
    fn validate_rejects_short_not_below_long() {
        let bad = Macd
            .default_params()
            .with("short", 26)
            .with("long", 26);
        assert!(!Macd.validate_params(&bad));
        assert!(Macd.validate_params(&Macd.default_params()));
    }
}
