//! Backtest pipeline.
//!
//! indicators -> signals -> simulation -> metrics, with the buy and sell
//! predicates compiled before any bar is touched.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::domain::bar::Bar;
use crate::domain::error::SignalTraderError;
use crate::domain::indicator::compute_indicators;
use crate::domain::metrics::Metrics;
use crate::domain::position::{Position, Trade};
use crate::domain::signal::{CompiledLogic, evaluate_signals};
use crate::domain::simulator::TradeSimulator;
use crate::domain::strategy::StrategyConfig;
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    /// Closed trades ordered by entry time.
    pub trades: Vec<Trade>,
    /// Positions still open when the bars ran out.
    pub open_positions: BTreeMap<String, Position>,
    pub final_cash: f64,
    pub metrics: Metrics,
    /// Bars that survived moving-average warmup and reached the simulator.
    pub bars_processed: usize,
}

pub fn run_backtest(
    bars: &[Bar],
    config: &StrategyConfig,
) -> Result<BacktestResult, SignalTraderError> {
    let logic = CompiledLogic::compile(&config.buy_condition, &config.sell_condition)?;
    Ok(run_compiled(bars, config, &logic))
}

/// Same as [`run_backtest`] for predicates that were already compiled.
pub fn run_compiled(bars: &[Bar], config: &StrategyConfig, logic: &CompiledLogic) -> BacktestResult {
    info!(bars = bars.len(), "computing indicators");
    let augmented = compute_indicators(bars, &config.indicator_params());
    let bars_processed = augmented.len();
    if bars_processed == 0 && !bars.is_empty() {
        warn!(
            long_window = config.long_window,
            "no bars left after moving-average warmup"
        );
    }

    let signaled = evaluate_signals(augmented, logic);
    info!(bars = bars_processed, "simulating trades");
    let sim = TradeSimulator::new(config.simulation_config()).run(signaled);

    let metrics = Metrics::compute(&sim.trades, config.capital);
    info!(
        trades = metrics.total_trades,
        open = sim.portfolio.open_positions.len(),
        pnl = metrics.cumulative_pnl,
        "backtest complete"
    );

    BacktestResult {
        trades: sim.trades,
        open_positions: sim.portfolio.open_positions,
        final_cash: sim.portfolio.cash,
        metrics,
        bars_processed,
    }
}

/// Fetch bars for every configured ticker. Tickers without data are skipped
/// with a warning; other data errors abort.
pub fn load_bars(
    data: &dyn DataPort,
    config: &StrategyConfig,
) -> Result<Vec<Bar>, SignalTraderError> {
    let mut bars = Vec::new();
    for ticker in &config.tickers {
        match data.fetch_bars(ticker, config.start_date, config.end_date) {
            Ok(fetched) if fetched.is_empty() => {
                warn!(%ticker, "no bars in date range, skipping");
            }
            Ok(fetched) => {
                info!(%ticker, bars = fetched.len(), "loaded bars");
                bars.extend(fetched);
            }
            Err(SignalTraderError::NoData { .. }) => {
                warn!(%ticker, "no data file, skipping");
            }
            Err(e) => return Err(e),
        }
    }

    if bars.is_empty() {
        return Err(SignalTraderError::NoData {
            ticker: config.tickers.join(", "),
        });
    }
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::{DEFAULT_REBALANCE, DEFAULT_SIZING_METHOD};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::path::PathBuf;

    fn ts(i: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
            + chrono::Duration::minutes(15 * i)
    }

    fn make_bar(ticker: &str, i: i64, close: f64) -> Bar {
        Bar {
            ticker: ticker.into(),
            timestamp: ts(i),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        }
    }

    fn config(buy: &str, sell: &str) -> StrategyConfig {
        StrategyConfig {
            name: "test".into(),
            description: String::new(),
            tickers: vec!["ABC".into()],
            short_window: 1,
            long_window: 1,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            buy_condition: buy.into(),
            sell_condition: sell.into(),
            capital: 1000.0,
            rebalance: DEFAULT_REBALANCE.into(),
            sizing_method: DEFAULT_SIZING_METHOD.into(),
            stop_loss_pct: 0.5,
            take_profit_pct: 0.9,
            data_path: PathBuf::from("data"),
        }
    }

    struct MemoryData(Vec<Bar>);

    impl DataPort for MemoryData {
        fn fetch_bars(
            &self,
            ticker: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<Bar>, SignalTraderError> {
            let bars: Vec<Bar> = self.0.iter().filter(|b| b.ticker == ticker).cloned().collect();
            if bars.is_empty() {
                Err(SignalTraderError::NoData {
                    ticker: ticker.to_string(),
                })
            } else {
                Ok(bars)
            }
        }

        fn list_tickers(&self) -> Result<Vec<String>, SignalTraderError> {
            let mut t: Vec<String> = self.0.iter().map(|b| b.ticker.clone()).collect();
            t.dedup();
            Ok(t)
        }
    }

    #[test]
    fn bad_predicate_fails_before_simulation() {
        let bars = vec![make_bar("ABC", 0, 100.0)];
        let err = run_backtest(&bars, &config("close > nope", "close < 1")).unwrap_err();
        assert!(matches!(err, SignalTraderError::RuleParse { name, .. } if name == "buy"));
    }

    #[test]
    fn pipeline_produces_trade_and_metrics() {
        let bars = vec![
            make_bar("ABC", 0, 100.0),
            make_bar("ABC", 1, 110.0),
            make_bar("ABC", 2, 120.0),
        ];
        let result = run_backtest(&bars, &config("close == 100", "close == 120")).unwrap();
        assert_eq!(result.bars_processed, 3);
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].return_pct, 20.0);
        assert_eq!(result.metrics.total_trades, 1);
        assert!((result.final_cash - 1200.0).abs() < 1e-9);
        assert!(result.open_positions.is_empty());
    }

    #[test]
    fn open_position_reported() {
        let bars = vec![make_bar("ABC", 0, 100.0), make_bar("ABC", 1, 101.0)];
        let result = run_backtest(&bars, &config("close == 100", "close > 200")).unwrap();
        assert!(result.trades.is_empty());
        assert!(result.open_positions.contains_key("ABC"));
        assert_eq!(result.final_cash, 0.0);
    }

    #[test]
    fn empty_input_is_empty_result() {
        let result = run_backtest(&[], &config("close > 0", "close < 0")).unwrap();
        assert_eq!(result.bars_processed, 0);
        assert!(result.trades.is_empty());
        assert_eq!(result.final_cash, 1000.0);
    }

    #[test]
    fn load_bars_skips_missing_tickers() {
        let data = MemoryData(vec![make_bar("ABC", 0, 1.0)]);
        let mut cfg = config("close > 0", "close < 0");
        cfg.tickers = vec!["ABC".into(), "MISSING".into()];
        let bars = load_bars(&data, &cfg).unwrap();
        assert_eq!(bars.len(), 1);
    }

    #[test]
    fn load_bars_with_nothing_is_no_data() {
        let data = MemoryData(vec![]);
        let mut cfg = config("close > 0", "close < 0");
        cfg.tickers = vec!["X".into(), "Y".into()];
        let err = load_bars(&data, &cfg).unwrap_err();
        assert!(matches!(err, SignalTraderError::NoData { ticker } if ticker == "X, Y"));
    }
}
