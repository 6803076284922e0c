//! Runner configuration loaded from TOML.
//!
//! Every field has a default so an empty file (or no file at all) yields a
//! working configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use stratbench_core::AccountConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level runner configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub account: AccountConfig,
    pub optimizer: OptimizerConfig,
    pub batch: BatchConfig,
    pub stores: StoreConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Re-run the grid search even when tuned parameters are persisted.
    pub force_reoptimize: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker-pool ceiling for the batch orchestrator.
    pub max_workers: usize,
    /// Market index / universe the symbol list was drawn from; recorded on
    /// every persisted trade row.
    pub universe: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_workers: 6,
            universe: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub param_dir: PathBuf,
    pub trade_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            param_dir: PathBuf::from("data/params"),
            trade_dir: PathBuf::from("data/trades"),
        }
    }
}

impl RunnerConfig {
    /// Load from a TOML file. A missing file is not an error; defaults apply.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
