//! Typst report generation.
//!
//! Resolves the `{{PLACEHOLDER}}` markers of a Typst template (the built-in
//! default or a caller-supplied one) using the helpers in `tables`, and
//! writes the final `.typ` file.

pub mod default_template;
pub mod tables;

use std::fs;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SignalTraderError;
use crate::domain::metrics::TickerResult;
use crate::domain::strategy::StrategyConfig;
use crate::ports::report_port::ReportPort;

/// Context for resolving template placeholders.
pub struct ReportContext<'a> {
    pub strategy: &'a StrategyConfig,
    pub result: &'a BacktestResult,
    pub ticker_results: &'a [TickerResult],
}

/// Resolve all `{{PLACEHOLDER}}`s in the given template string and return
/// the final Typst markup.
pub fn resolve(template: &str, ctx: &ReportContext) -> String {
    let title = format!("Backtest Report: {}", tables::escape(&ctx.strategy.name));
    let description = if ctx.strategy.description.is_empty() {
        String::new()
    } else {
        tables::escape(&ctx.strategy.description)
    };

    template
        .replace("{{TITLE}}", &title)
        .replace("{{DESCRIPTION}}", &description)
        .replace("{{INPUTS_TABLE}}", &tables::render_inputs(ctx.strategy))
        .replace("{{SUMMARY_TABLE}}", &tables::render_summary(&ctx.result.metrics))
        .replace(
            "{{EXIT_BREAKDOWN}}",
            &tables::render_exit_breakdown(&ctx.result.metrics),
        )
        .replace(
            "{{TICKER_SUMMARY}}",
            &tables::render_ticker_summary(ctx.ticker_results),
        )
        .replace("{{TRADE_TABLE}}", &tables::render_trade_table(&ctx.result.trades))
        .replace(
            "{{OPEN_POSITIONS}}",
            &tables::render_open_positions(&ctx.result.open_positions),
        )
}

#[derive(Default)]
pub struct TypstReportAdapter {
    template: Option<String>,
}

impl TypstReportAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(template: String) -> Self {
        Self {
            template: Some(template),
        }
    }
}

impl ReportPort for TypstReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        strategy: &StrategyConfig,
        output_path: &str,
    ) -> Result<(), SignalTraderError> {
        let ticker_results = TickerResult::compute_per_ticker(&result.trades);
        let ctx = ReportContext {
            strategy,
            result,
            ticker_results: &ticker_results,
        };
        let template = self
            .template
            .as_deref()
            .unwrap_or(default_template::template());
        let content = resolve(template, &ctx);

        fs::write(output_path, content).map_err(|e| SignalTraderError::Report {
            reason: format!("failed to write {}: {}", output_path, e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::Metrics;
    use crate::domain::position::{ExitReason, Trade};
    use crate::domain::strategy::{DEFAULT_REBALANCE, DEFAULT_SIZING_METHOD};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn sample_strategy() -> StrategyConfig {
        StrategyConfig {
            name: "RSI Reversal".into(),
            description: "Buy oversold, sell overbought".into(),
            tickers: vec!["ABC".into()],
            short_window: 5,
            long_window: 20,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            buy_condition: "rsi < 30".into(),
            sell_condition: "rsi > 70".into(),
            capital: 10_000.0,
            rebalance: DEFAULT_REBALANCE.into(),
            sizing_method: DEFAULT_SIZING_METHOD.into(),
            stop_loss_pct: 0.05,
            take_profit_pct: 0.15,
            data_path: PathBuf::from("data"),
        }
    }

    fn sample_result() -> BacktestResult {
        let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let trades = vec![Trade {
            ticker: "ABC".into(),
            entry_datetime: day.and_hms_opt(9, 30, 0).unwrap(),
            exit_datetime: day.and_hms_opt(12, 0, 0).unwrap(),
            entry_price: 50.0,
            exit_price: 57.5,
            return_pct: 15.0,
            pnl: 1500.0,
            allocated_cash: 10_000.0,
            shares: 200.0,
            holding_ticks: 10.0,
            exit_reason: ExitReason::TakeProfit,
        }];
        let metrics = Metrics::compute(&trades, 10_000.0);
        BacktestResult {
            trades,
            open_positions: BTreeMap::new(),
            final_cash: 11_500.0,
            metrics,
            bars_processed: 120,
        }
    }

    #[test]
    fn resolve_replaces_all_placeholders() {
        let strategy = sample_strategy();
        let result = sample_result();
        let ticker_results = TickerResult::compute_per_ticker(&result.trades);
        let ctx = ReportContext {
            strategy: &strategy,
            result: &result,
            ticker_results: &ticker_results,
        };

        let out = resolve(default_template::template(), &ctx);
        for placeholder in default_template::PLACEHOLDERS {
            assert!(!out.contains(placeholder), "{} left unresolved", placeholder);
        }
        assert!(out.contains("= Backtest Report: RSI Reversal"));
        assert!(out.contains("[Buy Condition], [rsi \\< 30]"));
        assert!(out.contains("[take profit], [1],"));
        assert!(out.contains("_None._"));
    }

    #[test]
    fn custom_template() {
        let strategy = sample_strategy();
        let result = sample_result();
        let ctx = ReportContext {
            strategy: &strategy,
            result: &result,
            ticker_results: &[],
        };
        let out = resolve("Title: {{TITLE}}\nUnknown: {{OTHER}}", &ctx);
        assert_eq!(out, "Title: Backtest Report: RSI Reversal\nUnknown: {{OTHER}}");
    }

    #[test]
    fn adapter_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.typ");
        let adapter = TypstReportAdapter::new();
        adapter
            .write(&sample_result(), &sample_strategy(), path.to_str().unwrap())
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("#set page"));
        assert!(content.contains("[ABC], [1], [100.0%]"));
    }

    #[test]
    fn adapter_reports_write_failure() {
        let adapter = TypstReportAdapter::with_template("x".into());
        let err = adapter
            .write(&sample_result(), &sample_strategy(), "/nonexistent/dir/r.typ")
            .unwrap_err();
        assert!(matches!(err, SignalTraderError::Report { .. }));
    }
}
