//! Account — cash-accurate trade simulation with lot and commission rules.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{TradeAction, Transaction};

/// Errors from account operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AccountError {
    #[error("price must be positive, got {0}")]
    NonPositivePrice(f64),
}

/// Cash, commission, and lot settings for a simulated account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub initial_cash: f64,
    pub buy_commission: f64,
    pub sell_commission: f64,
    pub lot_size: u64,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            initial_cash: 1_000_000.0,
            buy_commission: 0.0003,
            sell_commission: 0.0008,
            lot_size: 100,
        }
    }
}

/// Ledger simulating one symbol's trading: cash, lot-constrained holdings,
/// commissions, and an append-only transaction log.
///
/// Created fresh per (symbol, ParameterSet) evaluation and mutated only by
/// `buy`/`sell`. Profit is realized cash only; open positions are not marked
/// to market unless asked via `equity`.
#[derive(Debug, Clone)]
pub struct Account {
    symbol: String,
    config: AccountConfig,
    cash: f64,
    holdings: HashMap<String, u64>,
    transactions: Vec<Transaction>,
}

impl Account {
    pub fn new(symbol: impl Into<String>, config: AccountConfig) -> Self {
        Self {
            symbol: symbol.into(),
            cash: config.initial_cash,
            config,
            holdings: HashMap::new(),
            transactions: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn initial_cash(&self) -> f64 {
        self.config.initial_cash
    }

    /// Shares currently held for this account's symbol.
    pub fn shares(&self) -> u64 {
        self.holdings.get(&self.symbol).copied().unwrap_or(0)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Buy at `price`, committing `position_fraction` of available cash.
    ///
    /// Shares are rounded down to the lot size; if the lot-rounded count is
    /// zero or the commission-inclusive cost exceeds cash, the call is a
    /// no-op (no transaction appended). A non-positive price is an error.
    pub fn buy(
        &mut self,
        price: f64,
        date: NaiveDate,
        bar_index: usize,
        position_fraction: f64,
    ) -> Result<(), AccountError> {
        if price <= 0.0 {
            return Err(AccountError::NonPositivePrice(price));
        }

        let affordable = (self.cash * position_fraction / price).floor() as u64;
        let shares = affordable / self.config.lot_size * self.config.lot_size;
        if shares == 0 {
            return Ok(());
        }

        let notional = shares as f64 * price;
        let cost = notional * (1.0 + self.config.buy_commission);
        if cost > self.cash {
            return Ok(());
        }

        self.cash -= cost;
        *self.holdings.entry(self.symbol.clone()).or_insert(0) += shares;
        self.transactions.push(Transaction {
            date,
            action: TradeAction::Buy,
            symbol: self.symbol.clone(),
            price,
            shares,
            cash_after: self.cash,
            fee: self.config.buy_commission * notional,
            bar_index,
        });
        Ok(())
    }

    /// Sell `position_fraction` of the held shares at `price`.
    ///
    /// A no-op when nothing is held; a non-positive price is an error.
    pub fn sell(
        &mut self,
        price: f64,
        date: NaiveDate,
        bar_index: usize,
        position_fraction: f64,
    ) -> Result<(), AccountError> {
        if price <= 0.0 {
            return Err(AccountError::NonPositivePrice(price));
        }

        let held = self.shares();
        let shares = (held as f64 * position_fraction).floor() as u64;
        if shares == 0 {
            return Ok(());
        }

        let notional = shares as f64 * price;
        let revenue = notional * (1.0 - self.config.sell_commission);
        self.cash += revenue;
        if let Some(h) = self.holdings.get_mut(&self.symbol) {
            *h -= shares;
        }
        self.transactions.push(Transaction {
            date,
            action: TradeAction::Sell,
            symbol: self.symbol.clone(),
            price,
            shares,
            cash_after: self.cash,
            fee: self.config.sell_commission * notional,
            bar_index,
        });
        Ok(())
    }

    /// Realized profit as a percentage of initial cash.
    pub fn profit_pct(&self) -> f64 {
        (self.cash - self.config.initial_cash) / self.config.initial_cash * 100.0
    }

    /// Cash plus holdings marked to the given price.
    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.shares() as f64 * price
    }

    /// Restore initial cash, clear holdings and the transaction log.
    pub fn reset(&mut self) {
        self.cash = self.config.initial_cash;
        self.holdings.clear();
        self.transactions.clear();
    }
}
