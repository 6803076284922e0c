//! Data boundary: where price series come from.
//!
//! Fetching and caching market data is an external collaborator; the core
//! only defines the `SeriesSource` seam plus two in-tree implementations —
//! a CSV file loader and a seeded synthetic generator for tests and demos.

pub mod csv;
pub mod synthetic;

use thiserror::Error;

use crate::domain::{PriceSeries, SeriesError};

pub use self::csv::CsvSource;
pub use synthetic::{random_walk_series, SyntheticSource};

/// Errors crossing the data boundary.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no data available for symbol '{0}'")]
    UnknownSymbol(String),
    #[error(transparent)]
    Series(#[from] SeriesError),
    #[error("failed to read bars for '{symbol}': {source}")]
    Io {
        symbol: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed bar data for '{symbol}': {message}")]
    Malformed { symbol: String, message: String },
}

/// Provider of historical bars, one call per symbol.
///
/// Implementations do not retry; a malformed or empty series is a hard
/// failure surfaced to the caller.
pub trait SeriesSource: Send + Sync {
    fn fetch(&self, symbol: &str) -> Result<PriceSeries, SourceError>;
}
