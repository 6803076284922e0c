//! Notification boundary for triggered signals.
//!
//! Delivery channels live behind the `Notifier` trait; the in-tree
//! implementation only logs. A row with a standing Hold signal produces no
//! notification.

use tracing::info;

use stratbench_core::Signal;

use crate::report::ReportRow;

/// Build the per-trigger text a notifier sends.
pub fn trade_summary(row: &ReportRow) -> String {
    format!(
        "{signal} {symbol} @ {price:.2} on {date} [{strategy}: {params}] profit {profit:.2}%",
        signal = row.signal,
        symbol = row.symbol,
        price = row.price,
        date = row.date,
        strategy = row.strategy,
        params = row.params,
        profit = row.profit_pct,
    )
}

/// Consumer of trade notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, row: &ReportRow);
}

/// Log-only notifier.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, row: &ReportRow) {
        if row.signal == Signal::Hold {
            return;
        }
        info!(
            symbol = %row.symbol,
            strategy = %row.strategy,
            signal = %row.signal,
            "{}",
            trade_summary(row)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stratbench_core::ParameterSet;

    #[test]
    fn summary_names_signal_symbol_and_strategy() {
        let row = ReportRow {
            symbol: "600000".to_string(),
            strategy: "macd".to_string(),
            description: "test".to_string(),
            params: ParameterSet::new().with("short_window", 12),
            signal: Signal::Buy,
            price: 9.98,
            profit_pct: 2.09,
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            bar_index: 119,
            fingerprint: "abc".to_string(),
            factors: vec![],
        };
        let text = trade_summary(&row);
        assert!(text.starts_with("Buy 600000 @ 9.98"));
        assert!(text.contains("macd"));
        assert!(text.contains("short_window=12"));
    }
}
