//! Trade simulation over a time-ordered stream of signaled bars.
//!
//! Each ticker moves `Flat -> Long -> Flat`. All tickers draw from one shared
//! cash pool and every entry commits the whole pool, so at most one position
//! is open at any time.
//!
//! Per bar, for the bar's ticker:
//! 1. Exit check (when long): sell signal, then stop loss, then take profit,
//!    first match wins the exit reason.
//! 2. Entry check: buy signal, no open position for the ticker, cash > 0.

use tracing::debug;

use crate::domain::bar::BAR_INTERVAL_SECS;
use crate::domain::portfolio::Portfolio;
use crate::domain::position::{ExitReason, Position, Trade};
use crate::domain::signal::{Signal, SignaledBar};

pub const DEFAULT_STOP_LOSS_PCT: f64 = 0.05;
pub const DEFAULT_TAKE_PROFIT_PCT: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub initial_capital: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub bar_interval_secs: i64,
}

impl SimulationConfig {
    pub fn new(initial_capital: f64) -> Self {
        SimulationConfig {
            initial_capital,
            stop_loss_pct: DEFAULT_STOP_LOSS_PCT,
            take_profit_pct: DEFAULT_TAKE_PROFIT_PCT,
            bar_interval_secs: BAR_INTERVAL_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// Closed trades, ordered by entry time.
    pub trades: Vec<Trade>,
    pub portfolio: Portfolio,
}

#[derive(Debug, Clone)]
pub struct TradeSimulator {
    config: SimulationConfig,
    portfolio: Portfolio,
    trades: Vec<Trade>,
}

impl TradeSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        TradeSimulator {
            config,
            portfolio: Portfolio::new(config.initial_capital),
            trades: Vec::new(),
        }
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Sort by `(timestamp, ticker)`, process every bar, and finish.
    pub fn run(mut self, mut bars: Vec<SignaledBar>) -> SimulationResult {
        bars.sort_by(|a, b| {
            a.bar
                .bar
                .timestamp
                .cmp(&b.bar.bar.timestamp)
                .then_with(|| a.bar.bar.ticker.cmp(&b.bar.bar.ticker))
        });
        for bar in &bars {
            self.step(bar);
        }
        self.finish()
    }

    /// Apply one bar. Bars must arrive in `(timestamp, ticker)` order.
    pub fn step(&mut self, signaled: &SignaledBar) {
        let bar = &signaled.bar.bar;
        let price = bar.close;

        if let Some(reason) = self.exit_reason(&bar.ticker, signaled.signal, price) {
            self.close_position(&bar.ticker, price, bar.timestamp, reason);
        }

        if signaled.signal == Signal::Buy
            && !self.portfolio.has_position(&bar.ticker)
            && self.portfolio.cash > 0.0
        {
            let position =
                Position::open(&bar.ticker, price, bar.timestamp, self.portfolio.cash);
            debug!(
                ticker = %position.ticker,
                price,
                allocated = position.allocated_cash,
                at = %position.entry_timestamp,
                "open position"
            );
            self.portfolio.add_position(position);
        }
    }

    fn exit_reason(&self, ticker: &str, signal: Signal, price: f64) -> Option<ExitReason> {
        let position = self.portfolio.get_position(ticker)?;
        if signal == Signal::Sell {
            Some(ExitReason::Signal)
        } else if position.should_stop_loss(price, self.config.stop_loss_pct) {
            Some(ExitReason::StopLoss)
        } else if position.should_take_profit(price, self.config.take_profit_pct) {
            Some(ExitReason::TakeProfit)
        } else {
            None
        }
    }

    fn close_position(
        &mut self,
        ticker: &str,
        price: f64,
        timestamp: chrono::NaiveDateTime,
        reason: ExitReason,
    ) {
        let Some(position) = self.portfolio.get_position(ticker) else {
            return;
        };
        let (trade, pnl) = position.close(price, timestamp, reason, self.config.bar_interval_secs);
        self.portfolio.settle_position(ticker, pnl);
        debug!(
            ticker = %trade.ticker,
            price,
            pnl = trade.pnl,
            reason = %trade.exit_reason,
            at = %trade.exit_datetime,
            "close position"
        );
        self.trades.push(trade);
    }

    /// Consume the simulator. Positions still open stay in the portfolio and
    /// produce no trade.
    pub fn finish(mut self) -> SimulationResult {
        self.trades.sort_by_key(|t| t.entry_datetime);
        SimulationResult {
            trades: self.trades,
            portfolio: self.portfolio,
        }
    }
}
