//! Domain types: bars, series, transactions.

pub mod bar;
pub mod transaction;

pub use bar::{Bar, PriceSeries, SeriesError};
pub use transaction::{TradeAction, Transaction};
