//! Performance metrics over the closed-trade ledger.

use std::collections::BTreeMap;

use super::position::{ExitReason, Trade};

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub cumulative_pnl: f64,
    pub effective_return_pct: f64,
    pub total_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    pub win_rate: f64,
    pub avg_return_pct: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub avg_holding_ticks: f64,
    pub exits_by_signal: usize,
    pub exits_by_stop_loss: usize,
    pub exits_by_take_profit: usize,
}

impl Metrics {
    pub fn compute(trades: &[Trade], initial_capital: f64) -> Self {
        let cumulative_pnl: f64 = trades.iter().map(|t| t.pnl).sum();
        let effective_return_pct = if initial_capital > 0.0 {
            cumulative_pnl / initial_capital * 100.0
        } else {
            0.0
        };

        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut exits_by_signal = 0usize;
        let mut exits_by_stop_loss = 0usize;
        let mut exits_by_take_profit = 0usize;

        for trade in trades {
            let pnl = trade.pnl;
            if pnl > 0.0 {
                trades_won += 1;
                largest_win = largest_win.max(pnl);
            } else if pnl < 0.0 {
                trades_lost += 1;
                largest_loss = largest_loss.max(pnl.abs());
            } else {
                trades_breakeven += 1;
            }

            match trade.exit_reason {
                ExitReason::Signal => exits_by_signal += 1,
                ExitReason::StopLoss => exits_by_stop_loss += 1,
                ExitReason::TakeProfit => exits_by_take_profit += 1,
            }
        }

        let total_trades = trades.len();
        let (win_rate, avg_return_pct, avg_holding_ticks) = if total_trades > 0 {
            let n = total_trades as f64;
            (
                trades_won as f64 / n,
                trades.iter().map(|t| t.return_pct).sum::<f64>() / n,
                trades.iter().map(|t| t.holding_ticks).sum::<f64>() / n,
            )
        } else {
            (0.0, 0.0, 0.0)
        };

        Metrics {
            cumulative_pnl,
            effective_return_pct,
            total_trades,
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate,
            avg_return_pct,
            largest_win,
            largest_loss,
            avg_holding_ticks,
            exits_by_signal,
            exits_by_stop_loss,
            exits_by_take_profit,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickerResult {
    pub ticker: String,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub total_pnl: f64,
    pub win_rate: f64,
}

impl TickerResult {
    /// Per-ticker summary, ordered by ticker.
    pub fn compute_per_ticker(trades: &[Trade]) -> Vec<TickerResult> {
        let mut by_ticker: BTreeMap<&str, (usize, usize, f64)> = BTreeMap::new();
        for trade in trades {
            let entry = by_ticker.entry(trade.ticker.as_str()).or_insert((0, 0, 0.0));
            entry.0 += 1;
            if trade.pnl > 0.0 {
                entry.1 += 1;
            }
            entry.2 += trade.pnl;
        }

        by_ticker
            .into_iter()
            .map(|(ticker, (total, won, pnl))| TickerResult {
                ticker: ticker.to_string(),
                total_trades: total,
                winning_trades: won,
                total_pnl: pnl,
                win_rate: won as f64 / total as f64,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn make_trade(ticker: &str, pnl: f64, ticks: f64, reason: ExitReason) -> Trade {
        Trade {
            ticker: ticker.into(),
            entry_datetime: at(2),
            exit_datetime: at(3),
            entry_price: 100.0,
            exit_price: 100.0 + pnl / 10.0,
            return_pct: pnl / 10.0,
            pnl,
            allocated_cash: 1000.0,
            shares: 10.0,
            holding_ticks: ticks,
            exit_reason: reason,
        }
    }

    #[test]
    fn metrics_no_trades() {
        let m = Metrics::compute(&[], 1000.0);
        assert_eq!(m.total_trades, 0);
        assert_eq!(m.cumulative_pnl, 0.0);
        assert_eq!(m.effective_return_pct, 0.0);
        assert_eq!(m.win_rate, 0.0);
        assert_eq!(m.avg_holding_ticks, 0.0);
    }

    #[test]
    fn metrics_pnl_and_return() {
        let trades = vec![
            make_trade("A", 50.0, 4.0, ExitReason::Signal),
            make_trade("A", -20.0, 2.0, ExitReason::StopLoss),
        ];
        let m = Metrics::compute(&trades, 1000.0);
        assert_relative_eq!(m.cumulative_pnl, 30.0);
        assert_relative_eq!(m.effective_return_pct, 3.0);
        assert_relative_eq!(m.avg_return_pct, 1.5);
        assert_relative_eq!(m.avg_holding_ticks, 3.0);
    }

    #[test]
    fn metrics_win_loss_breakdown() {
        let trades = vec![
            make_trade("A", 50.0, 1.0, ExitReason::Signal),
            make_trade("A", 120.0, 1.0, ExitReason::TakeProfit),
            make_trade("B", -60.0, 1.0, ExitReason::StopLoss),
            make_trade("B", 0.0, 1.0, ExitReason::Signal),
        ];
        let m = Metrics::compute(&trades, 1000.0);
        assert_eq!(m.total_trades, 4);
        assert_eq!(m.trades_won, 2);
        assert_eq!(m.trades_lost, 1);
        assert_eq!(m.trades_breakeven, 1);
        assert_relative_eq!(m.win_rate, 0.5);
        assert_relative_eq!(m.largest_win, 120.0);
        assert_relative_eq!(m.largest_loss, 60.0);
    }

    #[test]
    fn metrics_exit_reason_counts() {
        let trades = vec![
            make_trade("A", 1.0, 1.0, ExitReason::Signal),
            make_trade("A", 1.0, 1.0, ExitReason::Signal),
            make_trade("A", -1.0, 1.0, ExitReason::StopLoss),
            make_trade("A", 1.0, 1.0, ExitReason::TakeProfit),
        ];
        let m = Metrics::compute(&trades, 1000.0);
        assert_eq!(m.exits_by_signal, 2);
        assert_eq!(m.exits_by_stop_loss, 1);
        assert_eq!(m.exits_by_take_profit, 1);
    }

    #[test]
    fn per_ticker_results_sorted() {
        let trades = vec![
            make_trade("MSFT", 10.0, 1.0, ExitReason::Signal),
            make_trade("AAPL", -5.0, 1.0, ExitReason::StopLoss),
            make_trade("MSFT", -2.0, 1.0, ExitReason::Signal),
        ];
        let results = TickerResult::compute_per_ticker(&trades);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].ticker, "AAPL");
        assert_eq!(results[0].total_trades, 1);
        assert_eq!(results[0].winning_trades, 0);
        assert_relative_eq!(results[0].total_pnl, -5.0);
        assert_eq!(results[1].ticker, "MSFT");
        assert_eq!(results[1].total_trades, 2);
        assert_relative_eq!(results[1].win_rate, 0.5);
        assert_relative_eq!(results[1].total_pnl, 8.0);
    }
}
