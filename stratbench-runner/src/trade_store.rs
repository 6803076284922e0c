//! Trade-record store: one JSON file per (symbol, date, strategy) key.
//!
//! `upsert` is the only write path. A fresh key is inserted with
//! `update_count = 0`; re-saving the same key refreshes the action, price and
//! strategy_info, bumps `update_count` and stamps `last_trade_time`, so a
//! re-run after new data always reflects the latest signal.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use stratbench_core::TradeAction;

use crate::param_store::StoreError;

/// A persisted trade signal for one (symbol, date, strategy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRecord {
    pub date: NaiveDate,
    pub symbol: String,
    /// Market index / universe the symbol was selected from.
    pub source_index: String,
    pub strategy: String,
    pub action: TradeAction,
    pub price: f64,
    pub last_trade_time: DateTime<Utc>,
    pub update_count: u64,
    /// Free-form context, e.g. the tuned parameters that produced the signal.
    pub strategy_info: String,
}

/// Directory-backed store of strategy trade records.
#[derive(Debug, Clone)]
pub struct TradeStore {
    dir: PathBuf,
}

impl TradeStore {
    /// Opens the store, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        Ok(Self { dir })
    }

    fn path_for(&self, symbol: &str, date: NaiveDate, strategy: &str) -> PathBuf {
        self.dir.join(format!("{symbol}__{date}__{strategy}.json"))
    }

    /// Load the record for a key; `None` when never saved.
    pub fn load(
        &self,
        symbol: &str,
        date: NaiveDate,
        strategy: &str,
    ) -> Result<Option<StrategyRecord>, StoreError> {
        let path = self.path_for(symbol, date, strategy);
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
        let record = serde_json::from_str(&json).map_err(|e| StoreError::corrupt(&path, e))?;
        Ok(Some(record))
    }

    /// Insert-or-update a record, returning the row as persisted.
    ///
    /// The caller supplies the signal fields; key fields (symbol, date,
    /// strategy) select the row, and `update_count`/`last_trade_time` are
    /// managed here.
    pub fn upsert(
        &self,
        symbol: &str,
        date: NaiveDate,
        source_index: &str,
        strategy: &str,
        action: TradeAction,
        price: f64,
        strategy_info: &str,
    ) -> Result<StrategyRecord, StoreError> {
        let now = Utc::now();
        let record = match self.load(symbol, date, strategy)? {
            Some(mut existing) => {
                existing.action = action;
                existing.price = price;
                existing.source_index = source_index.to_string();
                existing.strategy_info = strategy_info.to_string();
                existing.last_trade_time = now;
                existing.update_count += 1;
                existing
            }
            None => StrategyRecord {
                date,
                symbol: symbol.to_string(),
                source_index: source_index.to_string(),
                strategy: strategy.to_string(),
                action,
                price,
                last_trade_time: now,
                update_count: 0,
                strategy_info: strategy_info.to_string(),
            },
        };
        let path = self.path_for(symbol, date, strategy);
        let json =
            serde_json::to_string_pretty(&record).map_err(|e| StoreError::corrupt(&path, e))?;
        std::fs::write(&path, json).map_err(|e| StoreError::io(&path, e))?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn first_upsert_inserts_with_zero_count() {
        let dir = tempfile::tempdir().unwrap();
        let store = TradeStore::open(dir.path()).unwrap();

        let rec = store
            .upsert("600000", date(), "CSI300", "macd", TradeAction::Buy, 9.98, "{}")
            .unwrap();
        assert_eq!(rec.update_count, 0);
        assert_eq!(rec.action, TradeAction::Buy);
        assert_eq!(rec.source_index, "CSI300");

        let loaded = store.load("600000", date(), "macd").unwrap().unwrap();
        assert_eq!(loaded, rec);
    }

    #[test]
    fn second_upsert_refreshes_and_bumps_count() {
        let dir = tempfile::tempdir().unwrap();
        let store = TradeStore::open(dir.path()).unwrap();

        let first = store
            .upsert("600000", date(), "CSI300", "macd", TradeAction::Buy, 9.98, "old")
            .unwrap();
        let second = store
            .upsert("600000", date(), "CSI500", "macd", TradeAction::Sell, 10.25, "new")
            .unwrap();

        assert_eq!(second.update_count, 1);
        assert_eq!(second.action, TradeAction::Sell);
        assert_eq!(second.price, 10.25);
        assert_eq!(second.source_index, "CSI500");
        assert_eq!(second.strategy_info, "new");
        assert!(second.last_trade_time >= first.last_trade_time);

        // Still one row for the key on disk.
        let loaded = store.load("600000", date(), "macd").unwrap().unwrap();
        assert_eq!(loaded, second);
    }

    #[test]
    fn distinct_keys_get_distinct_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = TradeStore::open(dir.path()).unwrap();

        store
            .upsert("600000", date(), "CSI300", "macd", TradeAction::Buy, 9.0, "")
            .unwrap();
        store
            .upsert("600000", date(), "CSI300", "kdj", TradeAction::Sell, 9.0, "")
            .unwrap();

        let a = store.load("600000", date(), "macd").unwrap().unwrap();
        let b = store.load("600000", date(), "kdj").unwrap().unwrap();
        assert_eq!(a.update_count, 0);
        assert_eq!(b.update_count, 0);
        assert_ne!(a.action, b.action);
    }
}
