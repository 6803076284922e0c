//! Seeded synthetic price series for tests and demos.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{Bar, PriceSeries};

use super::{SeriesSource, SourceError};

/// Generate a bounded random-walk series.
///
/// Deterministic for a given seed; closes drift by up to ±2% per bar and are
/// floored at 1.0 so prices stay positive.
pub fn random_walk_series(symbol: &str, bars: usize, seed: u64) -> PriceSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut close = 100.0_f64;
    let mut out = Vec::with_capacity(bars);
    for i in 0..bars {
        let open = close;
        let drift: f64 = rng.gen_range(-0.02..0.02);
        close = (close * (1.0 + drift)).max(1.0);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.005));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.005));
        let volume = rng.gen_range(50_000..500_000);
        out.push(Bar {
            date: base + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume,
        });
    }
    // bars >= 1 always yields a valid chronological series.
    PriceSeries::new(symbol, out).expect("synthetic series is well formed")
}

/// In-memory source serving one generated series per symbol.
///
/// The seed is derived from the symbol so different symbols get different
/// walks that stay reproducible across runs.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    bars: usize,
}

impl SyntheticSource {
    pub fn new(bars: usize) -> Self {
        Self { bars }
    }
}

impl SeriesSource for SyntheticSource {
    fn fetch(&self, symbol: &str) -> Result<PriceSeries, SourceError> {
        let seed = blake3::hash(symbol.as_bytes()).as_bytes()[..8]
            .try_into()
            .map(u64::from_le_bytes)
            .unwrap_or(0);
        Ok(random_walk_series(symbol, self.bars, seed))
    }
}
