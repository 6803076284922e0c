//! Volume moving-average strategy.
//!
//! Buys on a volume surge: volume above twice its rolling mean. Sells when
//! the close drops below the rolling mean of the close, three bars after the
//! buy window opens.

use crate::domain::PriceSeries;
use crate::factors::{rolling_mean, FactorError, FactorFrame};
use crate::params::{ParamSpace, ParamSpec, ParameterSet};

use super::{FactorView, Strategy};

const VOLUME_MAVG: &str = "volume_mavg";
const PRICE_MAVG: &str = "price_mavg";

/// Volume must exceed this multiple of its rolling mean to trigger a buy.
const SURGE_MULTIPLE: f64 = 2.0;

/// Extra bars the sell rule waits past the buy warm-up.
const SELL_LAG: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeMa;

impl Strategy for VolumeMa {
    fn name(&self) -> &'static str {
        "vma"
    }

    fn description(&self) -> &'static str {
        "Volume surge above 2x its moving average buys; close under its mean sells"
    }

    fn default_params(&self) -> ParameterSet {
        ParameterSet::new().with("window", 5)
    }

    fn param_space(&self) -> ParamSpace {
        ParamSpace::new(vec![ParamSpec::int("window", 3, 50)])
    }

    fn warm_up_length(&self, params: &ParameterSet) -> usize {
        params.window("window").unwrap_or(usize::MAX)
    }

    fn calculate_factors(
        &self,
        series: &PriceSeries,
        params: &ParameterSet,
    ) -> Result<FactorFrame, FactorError> {
        let window = match params.window("window") {
            Ok(w) => w,
            Err(_) => return Ok(FactorFrame::new(series.len())),
        };
        let mut frame = FactorFrame::new(series.len());
        frame.insert(VOLUME_MAVG, rolling_mean(&series.volumes(), window))?;
        frame.insert(PRICE_MAVG, rolling_mean(&series.closes(), window))?;
        Ok(frame)
    }

    fn buy_signal(&self, view: &FactorView<'_>, params: &ParameterSet, i: usize) -> bool {
        let Ok(window) = params.window("window") else {
            return false;
        };
        if i < window {
            return false;
        }
        let mavg = view.factor(VOLUME_MAVG, i);
        if mavg.is_nan() {
            return false;
        }
        view.volume(i) > SURGE_MULTIPLE * mavg
    }

    fn sell_signal(&self, view: &FactorView<'_>, params: &ParameterSet, i: usize) -> bool {
        let Ok(window) = params.window("window") else {
            return false;
        };
        if i < window + SELL_LAG {
            return false;
        }
        let mavg = view.factor(PRICE_MAVG, i);
        if mavg.is_nan() {
            return false;
        }
        view.close(i) < mavg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testutil::series_with_volumes;

    #[test]
    fn buy_fires_on_volume_surge() {
        let closes = vec![100.0; 10];
        let mut volumes = vec![10_000u64; 10];
        volumes[8] = 30_000; // 3x the trailing mean
        let series = series_with_volumes(&closes, &volumes);
        let params = VolumeMa.default_params();
        let frame = VolumeMa.calculate_factors(&series, &params).unwrap();
        let view = FactorView::new(&series, &frame);

        assert!(VolumeMa.buy_signal(&view, &params, 8));
        assert!(!VolumeMa.buy_signal(&view, &params, 7));
    }

    #[test]
    fn buy_false_inside_warm_up() {
        let closes = vec![100.0; 10];
        let mut volumes = vec![10_000u64; 10];
        volumes[3] = 100_000;
        let series = series_with_volumes(&closes, &volumes);
        let params = VolumeMa.default_params();
        let frame = VolumeMa.calculate_factors(&series, &params).unwrap();
        let view = FactorView::new(&series, &frame);

        for i in 0..VolumeMa.warm_up_length(&params) {
            assert!(!VolumeMa.buy_signal(&view, &params, i));
        }
    }

    #[test]
    fn sell_fires_when_close_drops_under_its_mean() {
        let mut closes = vec![100.0; 12];
        closes[11] = 90.0;
        let volumes = vec![10_000u64; 12];
        let series = series_with_volumes(&closes, &volumes);
        let params = VolumeMa.default_params();
        let frame = VolumeMa.calculate_factors(&series, &params).unwrap();
        let view = FactorView::new(&series, &frame);

        assert!(VolumeMa.sell_signal(&view, &params, 11));
        // Inside the sell lag the same condition stays quiet.
        assert!(!VolumeMa.sell_signal(&view, &params, 7));
    }
}
