//! Batch report rows and CSV export.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Write;
use thiserror::Error;

use stratbench_core::{ParameterSet, Signal};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv export failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv export produced invalid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// One evaluated (symbol, strategy) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub symbol: String,
    pub strategy: String,
    pub description: String,
    pub params: ParameterSet,
    /// Standing signal at the last bar.
    pub signal: Signal,
    /// Last close, the price a triggered signal would execute at.
    pub price: f64,
    pub profit_pct: f64,
    /// Date of the last bar.
    pub date: NaiveDate,
    /// Index of the last bar within its series.
    pub bar_index: usize,
    /// Content hash of the input series, for provenance.
    pub fingerprint: String,
    /// Factor values at the last bar.
    pub factors: Vec<(String, f64)>,
}

impl ReportRow {
    fn factors_field(&self) -> String {
        let mut out = String::new();
        for (i, (name, value)) in self.factors.iter().enumerate() {
            if i > 0 {
                out.push_str("; ");
            }
            out.push_str(&format!("{name}={value:.4}"));
        }
        out
    }
}

/// A failed per-symbol task, excluded from the rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFailure {
    pub symbol: String,
    pub message: String,
}

/// Aggregate of one batch run. Rows are in completion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub rows: Vec<ReportRow>,
    pub failures: Vec<TaskFailure>,
}

impl BatchReport {
    /// Rows sorted by (symbol, strategy) for deterministic output.
    pub fn sorted_rows(&self) -> Vec<&ReportRow> {
        let mut rows: Vec<&ReportRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| (&a.symbol, &a.strategy).cmp(&(&b.symbol, &b.strategy)));
        rows
    }

    /// Export all rows as CSV. Factor snapshots collapse into one
    /// `name=value; ...` column so the header stays fixed across strategies.
    pub fn to_csv<W: Write>(&self, writer: W) -> Result<(), ReportError> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record([
            "symbol",
            "strategy",
            "description",
            "params",
            "signal",
            "price",
            "profit_pct",
            "date",
            "fingerprint",
            "factors",
        ])?;
        for row in self.sorted_rows() {
            csv.write_record([
                row.symbol.as_str(),
                row.strategy.as_str(),
                row.description.as_str(),
                &row.params.to_string(),
                &row.signal.to_string(),
                &format!("{:.4}", row.price),
                &format!("{:.4}", row.profit_pct),
                &row.date.to_string(),
                row.fingerprint.as_str(),
                &row.factors_field(),
            ])?;
        }
        csv.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String, ReportError> {
        let mut buf = Vec::new();
        self.to_csv(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}
