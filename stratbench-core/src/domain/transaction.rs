//! Transaction — one executed trade in the account ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of an executed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "Buy"),
            TradeAction::Sell => write!(f, "Sell"),
        }
    }
}

/// One row of the account's append-only transaction log.
///
/// Never mutated after creation; `cash_after` is the account cash balance
/// immediately after the trade settled (commission included).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub action: TradeAction,
    pub symbol: String,
    pub price: f64,
    pub shares: u64,
    pub cash_after: f64,
    pub fee: f64,
    pub bar_index: usize,
}
