//! Durable parameter store: one JSON file per (strategy, symbol).
//!
//! Loading a missing key returns `None` so callers fall back to the
//! strategy's compile-time defaults; saving overwrites the prior record
//! entirely (no history kept).

use std::path::{Path, PathBuf};

use thiserror::Error;

use stratbench_core::ParameterSet;

/// Errors from the durable stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store record at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn corrupt(path: &Path, source: serde_json::Error) -> Self {
        StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Directory-backed store of tuned parameter sets.
#[derive(Debug, Clone)]
pub struct ParamStore {
    dir: PathBuf,
}

impl ParamStore {
    /// Opens the store, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        Ok(Self { dir })
    }

    fn path_for(&self, strategy: &str, symbol: &str) -> PathBuf {
        self.dir.join(format!("{strategy}__{symbol}.json"))
    }

    pub fn contains(&self, strategy: &str, symbol: &str) -> bool {
        self.path_for(strategy, symbol).exists()
    }

    /// Load the tuned set for a pair; `None` when never optimized.
    pub fn load(&self, strategy: &str, symbol: &str) -> Result<Option<ParameterSet>, StoreError> {
        let path = self.path_for(strategy, symbol);
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
        let params = serde_json::from_str(&json).map_err(|e| StoreError::corrupt(&path, e))?;
        Ok(Some(params))
    }

    /// Overwrite the stored set for a pair.
    pub fn save(
        &self,
        strategy: &str,
        symbol: &str,
        params: &ParameterSet,
    ) -> Result<(), StoreError> {
        let path = self.path_for(strategy, symbol);
        let json =
            serde_json::to_string_pretty(params).map_err(|e| StoreError::corrupt(&path, e))?;
        std::fs::write(&path, json).map_err(|e| StoreError::io(&path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParamStore::open(dir.path()).unwrap();
        assert!(store.load("ma_crossover", "600000").unwrap().is_none());
        assert!(!store.contains("ma_crossover", "600000"));
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParamStore::open(dir.path()).unwrap();
        let params = ParameterSet::new()
            .with("short_window", 7)
            .with("std", 1.8);
        store.save("boll", "600000", &params).unwrap();

        let loaded = store.load("boll", "600000").unwrap().unwrap();
        assert_eq!(loaded, params);
        assert!(store.contains("boll", "600000"));
    }

    #[test]
    fn save_overwrites_entirely() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParamStore::open(dir.path()).unwrap();
        let first = ParameterSet::new().with("window", 5).with("percent", 10);
        let second = ParameterSet::new().with("window", 9);
        store.save("pd", "600000", &first).unwrap();
        store.save("pd", "600000", &second).unwrap();

        let loaded = store.load("pd", "600000").unwrap().unwrap();
        assert_eq!(loaded, second);
        assert!(loaded.get("percent").is_err());
    }

    #[test]
    fn pairs_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParamStore::open(dir.path()).unwrap();
        let a = ParameterSet::new().with("window", 5);
        let b = ParameterSet::new().with("window", 8);
        store.save("pd", "600000", &a).unwrap();
        store.save("pd", "000001", &b).unwrap();

        assert_eq!(store.load("pd", "600000").unwrap().unwrap(), a);
        assert_eq!(store.load("pd", "000001").unwrap().unwrap(), b);
    }
}
