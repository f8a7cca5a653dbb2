//! Open positions and closed trades.

use std::fmt;

use chrono::NaiveDateTime;

use crate::domain::bar::ticks_between;
use crate::domain::numeric::round_to;

pub const PRICE_DECIMALS: i32 = 4;
pub const CASH_DECIMALS: i32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub ticker: String,
    pub entry_price: f64,
    pub entry_timestamp: NaiveDateTime,
    pub allocated_cash: f64,
    pub shares: f64,
}

impl Position {
    pub fn open(
        ticker: &str,
        entry_price: f64,
        entry_timestamp: NaiveDateTime,
        allocated_cash: f64,
    ) -> Self {
        Position {
            ticker: ticker.to_string(),
            entry_price,
            entry_timestamp,
            allocated_cash,
            shares: allocated_cash / entry_price,
        }
    }

    /// Fractional return at `price` relative to entry (0.05 = +5%).
    pub fn pnl_fraction(&self, price: f64) -> f64 {
        (price - self.entry_price) / self.entry_price
    }

    pub fn should_stop_loss(&self, price: f64, stop_loss_pct: f64) -> bool {
        self.pnl_fraction(price) <= -stop_loss_pct
    }

    pub fn should_take_profit(&self, price: f64, take_profit_pct: f64) -> bool {
        self.pnl_fraction(price) >= take_profit_pct
    }

    /// Close at `exit_price`. Returns the rounded trade record together with
    /// the full-precision PnL used for the cash book.
    pub fn close(
        &self,
        exit_price: f64,
        exit_timestamp: NaiveDateTime,
        reason: ExitReason,
        bar_interval_secs: i64,
    ) -> (Trade, f64) {
        let fraction = self.pnl_fraction(exit_price);
        let pnl = fraction * self.allocated_cash;
        let trade = Trade {
            ticker: self.ticker.clone(),
            entry_datetime: self.entry_timestamp,
            exit_datetime: exit_timestamp,
            entry_price: round_to(self.entry_price, PRICE_DECIMALS),
            exit_price: round_to(exit_price, PRICE_DECIMALS),
            return_pct: round_to(fraction * 100.0, PRICE_DECIMALS),
            pnl: round_to(pnl, CASH_DECIMALS),
            allocated_cash: round_to(self.allocated_cash, CASH_DECIMALS),
            shares: round_to(self.shares, PRICE_DECIMALS),
            holding_ticks: ticks_between(self.entry_timestamp, exit_timestamp, bar_interval_secs),
            exit_reason: reason,
        };
        (trade, pnl)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExitReason {
    Signal,
    StopLoss,
    TakeProfit,
}

impl ExitReason {
    pub fn label(self) -> &'static str {
        match self {
            ExitReason::Signal => "signal",
            ExitReason::StopLoss => "stop loss",
            ExitReason::TakeProfit => "take profit",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A closed round trip as it appears in the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub ticker: String,
    pub entry_datetime: NaiveDateTime,
    pub exit_datetime: NaiveDateTime,
    pub entry_price: f64,
    pub exit_price: f64,
    pub return_pct: f64,
    pub pnl: f64,
    pub allocated_cash: f64,
    pub shares: f64,
    pub holding_ticks: f64,
    pub exit_reason: ExitReason,
}
