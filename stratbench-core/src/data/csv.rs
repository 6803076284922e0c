//! CSV bar loader: one `<symbol>.csv` per instrument in a data directory.
//!
//! Expected header: `date,open,high,low,close,volume` with ISO dates.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::{Bar, PriceSeries};

use super::{SeriesSource, SourceError};

#[derive(Debug, Deserialize)]
struct CsvBar {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

impl From<CsvBar> for Bar {
    fn from(row: CsvBar) -> Self {
        Bar {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

/// Directory-backed series source.
#[derive(Debug, Clone)]
pub struct CsvSource {
    data_dir: PathBuf,
}

impl CsvSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{symbol}.csv"))
    }
}

impl SeriesSource for CsvSource {
    fn fetch(&self, symbol: &str) -> Result<PriceSeries, SourceError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(SourceError::UnknownSymbol(symbol.to_string()));
        }
        let bars = read_bars(&path, symbol)?;
        Ok(PriceSeries::new(symbol, bars)?)
    }
}

fn read_bars(path: &Path, symbol: &str) -> Result<Vec<Bar>, SourceError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| malformed(symbol, e))?;
    let mut bars = Vec::new();
    for record in reader.deserialize::<CsvBar>() {
        let row = record.map_err(|e| malformed(symbol, e))?;
        bars.push(row.into());
    }
    Ok(bars)
}

fn malformed(symbol: &str, err: csv::Error) -> SourceError {
    SourceError::Malformed {
        symbol: symbol.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_a_well_formed_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("600000.csv"),
            "date,open,high,low,close,volume\n\
             2024-01-02,10.0,10.5,9.8,10.2,120000\n\
             2024-01-03,10.2,10.6,10.1,10.4,98000\n",
        )
        .unwrap();

        let source = CsvSource::new(dir.path());
        let series = source.fetch("600000").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.bar(1).close, 10.4);
    }

    #[test]
    fn missing_symbol_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvSource::new(dir.path());
        assert!(matches!(
            source.fetch("nope").unwrap_err(),
            SourceError::UnknownSymbol(_)
        ));
    }

    #[test]
    fn empty_file_is_a_series_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("empty.csv"),
            "date,open,high,low,close,volume\n",
        )
        .unwrap();
        let source = CsvSource::new(dir.path());
        assert!(matches!(
            source.fetch("empty").unwrap_err(),
            SourceError::Series(_)
        ));
    }

    #[test]
    fn garbage_rows_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("bad.csv"),
            "date,open,high,low,close,volume\nnot-a-date,x,y,z,w,v\n",
        )
        .unwrap();
        let source = CsvSource::new(dir.path());
        assert!(matches!(
            source.fetch("bad").unwrap_err(),
            SourceError::Malformed { .. }
        ));
    }
}
