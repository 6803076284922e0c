//! Bar and PriceSeries — the fundamental market data units.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV bar for a single symbol on a single day.
///
/// Immutable once constructed. All prices are in the instrument's quote
/// currency; volume is in shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Basic OHLCV sanity check: high >= low, high bounds open/close, prices positive.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

/// Errors from PriceSeries construction.
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("price series for '{0}' is empty")]
    Empty(String),
    #[error("price series for '{symbol}' is out of order at {date} (bar {index})")]
    OutOfOrder {
        symbol: String,
        date: NaiveDate,
        index: usize,
    },
    #[error("price series for '{symbol}' has duplicate date {date}")]
    DuplicateDate { symbol: String, date: NaiveDate },
}

/// Ordered historical bars for one instrument.
///
/// Construction validates the chronological invariant: at least one bar,
/// strictly increasing dates, no duplicates. A series is owned by exactly one
/// runner task during a backtest and is never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(SeriesError::Empty(symbol));
        }
        for (i, pair) in bars.windows(2).enumerate() {
            if pair[1].date == pair[0].date {
                return Err(SeriesError::DuplicateDate {
                    symbol,
                    date: pair[1].date,
                });
            }
            if pair[1].date < pair[0].date {
                return Err(SeriesError::OutOfOrder {
                    symbol,
                    date: pair[1].date,
                    index: i + 1,
                });
            }
        }
        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bar(&self, index: usize) -> &Bar {
        &self.bars[index]
    }

    /// The final bar. Construction guarantees at least one.
    pub fn last_bar(&self) -> &Bar {
        self.bars.last().unwrap()
    }

    /// Close column as an owned vector (input to rolling factor computation).
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume as f64).collect()
    }

    /// Content-addressable fingerprint over symbol, dates, and closes.
    ///
    /// Used for report provenance: two reports produced from the same input
    /// data carry the same fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.symbol.as_bytes());
        for bar in &self.bars {
            hasher.update(bar.date.to_string().as_bytes());
            hasher.update(&bar.close.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: NaiveDate, close: f64) -> Bar {
        Bar {
            date,
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn bar_is_sane() {
        assert!(bar(day(2), 100.0).is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut b = bar(day(2), 100.0);
        b.high = b.low - 1.0;
        assert!(!b.is_sane());
    }

    #[test]
    fn series_rejects_empty() {
        let err = PriceSeries::new("TEST", vec![]).unwrap_err();
        assert!(matches!(err, SeriesError::Empty(_)));
    }

    #[test]
    fn series_rejects_duplicate_dates() {
        let bars = vec![bar(day(2), 10.0), bar(day(2), 11.0)];
        let err = PriceSeries::new("TEST", bars).unwrap_err();
        assert!(matches!(err, SeriesError::DuplicateDate { .. }));
    }

    #[test]
    fn series_rejects_out_of_order_dates() {
        let bars = vec![bar(day(3), 10.0), bar(day(2), 11.0)];
        let err = PriceSeries::new("TEST", bars).unwrap_err();
        assert!(matches!(err, SeriesError::OutOfOrder { index: 1, .. }));
    }

    #[test]
    fn series_fingerprint_is_stable_and_content_sensitive() {
        let a = PriceSeries::new("TEST", vec![bar(day(2), 10.0), bar(day(3), 11.0)]).unwrap();
        let b = PriceSeries::new("TEST", vec![bar(day(2), 10.0), bar(day(3), 11.0)]).unwrap();
        let c = PriceSeries::new("TEST", vec![bar(day(2), 10.0), bar(day(3), 11.5)]).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
