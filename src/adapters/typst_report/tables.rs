//! Table formatting for reports.
//!
//! Provides functions to generate Typst markup for:
//! - Simulation inputs (strategy, windows, conditions, risk)
//! - Results summary and exit-reason breakdown
//! - Per-ticker summary
//! - Trade table and still-open positions

use std::collections::BTreeMap;

use crate::domain::metrics::{Metrics, TickerResult};
use crate::domain::position::{Position, Trade};
use crate::domain::strategy::StrategyConfig;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Escape characters that carry markup meaning inside a Typst content block.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(
            ch,
            '\\' | '*' | '_' | '#' | '$' | '[' | ']' | '<' | '>' | '@' | '`' | '~'
        ) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn money(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}\\${}.{:02}", sign, grouped, cents % 100)
}

fn pnl_cell(value: f64) -> String {
    let color = if value >= 0.0 { "green" } else { "red" };
    format!("text(fill: {}, [{}])", color, money(value))
}

pub fn render_inputs(strategy: &StrategyConfig) -> String {
    let rows = [
        ("Strategy", escape(&strategy.name)),
        ("Description", escape(&strategy.description)),
        ("Tickers", escape(&strategy.tickers.join(", "))),
        ("Short Window", strategy.short_window.to_string()),
        ("Long Window", strategy.long_window.to_string()),
        (
            "Date Range",
            format!("{} to {}", strategy.start_date, strategy.end_date),
        ),
        ("Buy Condition", escape(&strategy.buy_condition)),
        ("Sell Condition", escape(&strategy.sell_condition)),
        ("Initial Capital", money(strategy.capital)),
        ("Rebalance", escape(&strategy.rebalance)),
        ("Position Sizing", escape(&strategy.sizing_method)),
        (
            "Stop Loss",
            format!("{:.2}%", strategy.stop_loss_pct * 100.0),
        ),
        (
            "Take Profit",
            format!("{:.2}%", strategy.take_profit_pct * 100.0),
        ),
    ];

    let mut out = String::from("#table(\n  columns: 2,\n  align: (left, left),\n");
    out.push_str("  [*Input*], [*Value*],\n");
    for (label, value) in rows {
        out.push_str(&format!("  [{}], [{}],\n", label, value));
    }
    out.push_str(")\n");
    out
}

pub fn render_summary(metrics: &Metrics) -> String {
    let mut out = String::from("#table(\n  columns: 2,\n  align: (left, right),\n");
    out.push_str("  [*Metric*], [*Value*],\n");
    out.push_str(&format!(
        "  [Cumulative PnL], {},\n",
        pnl_cell(metrics.cumulative_pnl)
    ));
    out.push_str(&format!(
        "  [Effective Return], [{:.2}%],\n",
        metrics.effective_return_pct
    ));
    out.push_str(&format!(
        "  [Number of Operations], [{}],\n",
        metrics.total_trades
    ));
    out.push_str(&format!(
        "  [Won / Lost / Breakeven], [{} / {} / {}],\n",
        metrics.trades_won, metrics.trades_lost, metrics.trades_breakeven
    ));
    out.push_str(&format!(
        "  [Win Rate], [{:.1}%],\n",
        metrics.win_rate * 100.0
    ));
    out.push_str(&format!(
        "  [Average Return], [{:.2}%],\n",
        metrics.avg_return_pct
    ));
    out.push_str(&format!(
        "  [Largest Win], [{}],\n",
        money(metrics.largest_win)
    ));
    out.push_str(&format!(
        "  [Largest Loss], [{}],\n",
        money(-metrics.largest_loss)
    ));
    out.push_str(&format!(
        "  [Average Holding], [{:.1} ticks],\n",
        metrics.avg_holding_ticks
    ));
    out.push_str(")\n");
    out
}

pub fn render_exit_breakdown(metrics: &Metrics) -> String {
    let mut out = String::from("#table(\n  columns: 2,\n  align: (left, right),\n");
    out.push_str("  [*Exit Reason*], [*Count*],\n");
    out.push_str(&format!("  [signal], [{}],\n", metrics.exits_by_signal));
    out.push_str(&format!("  [stop loss], [{}],\n", metrics.exits_by_stop_loss));
    out.push_str(&format!(
        "  [take profit], [{}],\n",
        metrics.exits_by_take_profit
    ));
    out.push_str(")\n");
    out
}

pub fn render_ticker_summary(results: &[TickerResult]) -> String {
    if results.is_empty() {
        return "_No closed trades._\n".to_string();
    }

    let mut out = String::from("#table(\n  columns: 4,\n  align: (left, right, right, right),\n");
    out.push_str("  [*Ticker*], [*Trades*], [*Win Rate*], [*Total PnL*],\n");
    for r in results {
        out.push_str(&format!(
            "  [{}], [{}], [{:.1}%], {},\n",
            escape(&r.ticker),
            r.total_trades,
            r.win_rate * 100.0,
            pnl_cell(r.total_pnl)
        ));
    }
    out.push_str(")\n");
    out
}

pub fn render_trade_table(trades: &[Trade]) -> String {
    if trades.is_empty() {
        return "_No trades executed._\n".to_string();
    }

    let mut out = String::from(
        "#table(\n  columns: 7,\n  align: (left, left, right, right, right, right, left),\n",
    );
    out.push_str(
        "  [*Ticker*], [*Exit Time*], [*Return*], [*PnL*], [*Shares*], [*Ticks*], [*Exit Reason*],\n",
    );
    for trade in trades {
        out.push_str(&format!(
            "  [{}], [{}], [{:.2}%], {}, [{:.4}], [{}], [{}],\n",
            escape(&trade.ticker),
            trade.exit_datetime.format(DATETIME_FORMAT),
            trade.return_pct,
            pnl_cell(trade.pnl),
            trade.shares,
            trade.holding_ticks,
            trade.exit_reason
        ));
    }
    out.push_str(")\n");
    out
}

pub fn render_open_positions(positions: &BTreeMap<String, Position>) -> String {
    if positions.is_empty() {
        return "_None._\n".to_string();
    }

    let mut out = String::from("#table(\n  columns: 4,\n  align: (left, left, right, right),\n");
    out.push_str("  [*Ticker*], [*Entry Time*], [*Entry Price*], [*Allocated*],\n");
    for pos in positions.values() {
        out.push_str(&format!(
            "  [{}], [{}], [{:.4}], [{}],\n",
            escape(&pos.ticker),
            pos.entry_timestamp.format(DATETIME_FORMAT),
            pos.entry_price,
            money(pos.allocated_cash)
        ));
    }
    out.push_str(")\n");
    out
}
