//! KDJ stochastic oscillator strategy.
//!
//! RSV positions the close inside the rolling high/low range (the range
//! windows shrink at the front, so the oscillator is defined from bar 0).
//! K and D are recursive smoothings seeded at 50; J = 3K - 2D. Trades on
//! K/D crosses gated by the 50 midline: golden cross below 50 buys, death
//! cross above 50 sells.

use crate::domain::PriceSeries;
use crate::factors::{rolling_max, rolling_min, FactorError, FactorFrame};
use crate::params::{ParamError, ParamSpace, ParamSpec, ParameterSet};

use super::{FactorView, Strategy};

const K: &str = "k";
const D: &str = "d";
const J: &str = "j";
const RSV: &str = "rsv";

struct KdjParams {
    n: usize,
    m1: f64,
    m2: f64,
}

impl KdjParams {
    fn decode(params: &ParameterSet) -> Result<Self, ParamError> {
        Ok(Self {
            n: params.window("n")?,
            m1: params.int("m1")? as f64,
            m2: params.int("m2")? as f64,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Kdj;

impl Strategy for Kdj {
    fn name(&self) -> &'static str {
        "kdj"
    }

    fn description(&self) -> &'static str {
        "KDJ oscillator: K/D golden cross below 50 buys, death cross above 50 sells"
    }

    fn default_params(&self) -> ParameterSet {
        ParameterSet::new().with("n", 9).with("m1", 3).with("m2", 3)
    }

    fn param_space(&self) -> ParamSpace {
        ParamSpace::new(vec![
            ParamSpec::int("n", 5, 10),
            ParamSpec::int("m1", 2, 20),
            ParamSpec::int("m2", 2, 20),
        ])
    }

    fn warm_up_length(&self, _params: &ParameterSet) -> usize {
        // The shrinking range windows make K/D defined from bar 0; the cross
        // rules only need one bar of lookback.
        1
    }

    fn calculate_factors(
        &self,
        series: &PriceSeries,
        params: &ParameterSet,
    ) -> Result<FactorFrame, FactorError> {
        let p = match KdjParams::decode(params) {
            Ok(p) => p,
            Err(_) => return Ok(FactorFrame::new(series.len())),
        };
        let n = series.len();
        let lows = rolling_min(&series.lows(), p.n);
        let highs = rolling_max(&series.highs(), p.n);

        let mut rsv = vec![50.0; n];
        for i in 0..n {
            let range = highs[i] - lows[i];
            // A perfectly flat window has no range; hold the oscillator
            // neutral instead of dividing by zero.
            if range > 0.0 {
                rsv[i] = (series.bar(i).close - lows[i]) / range * 100.0;
            }
        }

        let mut k = vec![50.0; n];
        let mut d = vec![50.0; n];
        for i in 1..n {
            if p.m1 < 1.0 || p.m2 < 1.0 {
                break;
            }
            k[i] = ((p.m1 - 1.0) / p.m1) * k[i - 1] + rsv[i] / p.m1;
            d[i] = ((p.m2 - 1.0) / p.m2) * d[i - 1] + k[i] / p.m2;
        }
        let j: Vec<f64> = k.iter().zip(&d).map(|(k, d)| 3.0 * k - 2.0 * d).collect();

        let mut frame = FactorFrame::new(n);
        frame.insert(RSV, rsv)?;
        frame.insert(K, k)?;
        frame.insert(D, d)?;
        frame.insert(J, j)?;
        Ok(frame)
    }

    fn buy_signal(&self, view: &FactorView<'_>, _params: &ParameterSet, i: usize) -> bool {
        if i == 0 {
            return false;
        }
        let k = view.factor(K, i);
        let d = view.factor(D, i);
        if k.is_nan() || d.is_nan() {
            return false;
        }
        k >= d && view.factor(K, i - 1) < view.factor(D, i - 1) && k < 50.0
    }

    fn sell_signal(&self, view: &FactorView<'_>, _params: &ParameterSet, i: usize) -> bool {
        if i == 0 {
            return false;
        }
        let k = view.factor(K, i);
        let d = view.factor(D, i);
        if k.is_nan() || d.is_nan() {
            return false;
        }
        k <= d && view.factor(K, i - 1) > view.factor(D, i - 1) && k > 50.0
    }
}
