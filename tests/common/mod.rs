#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use signaltrader::domain::bar::Bar;
use signaltrader::domain::error::SignalTraderError;
use signaltrader::domain::indicator::{AugmentedBar, IndicatorSet};
use signaltrader::domain::signal::{Signal, SignaledBar};
use signaltrader::domain::strategy::{DEFAULT_REBALANCE, DEFAULT_SIZING_METHOD, StrategyConfig};
use signaltrader::ports::data_port::DataPort;
use std::collections::HashMap;
use std::path::PathBuf;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, SignalTraderError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(SignalTraderError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(ticker) {
            Some(bars) => Ok(bars
                .iter()
                .filter(|b| b.timestamp.date() >= start && b.timestamp.date() <= end)
                .cloned()
                .collect()),
            None => Err(SignalTraderError::NoData {
                ticker: ticker.to_string(),
            }),
        }
    }

    fn list_tickers(&self) -> Result<Vec<String>, SignalTraderError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}

/// Timestamp of the `i`-th 15-minute bar from 2024-01-02 09:30.
pub fn tick(i: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
        + chrono::Duration::minutes(15 * i)
}

pub fn make_bar(ticker: &str, i: i64, close: f64) -> Bar {
    Bar {
        ticker: ticker.to_string(),
        timestamp: tick(i),
        open: close - 0.5,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000.0,
    }
}

/// Consecutive bars starting at tick 0.
pub fn make_series(ticker: &str, closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(ticker, i as i64, c))
        .collect()
}

/// A bar with moving averages set and a fixed signal, ready for the simulator.
pub fn signaled(ticker: &str, i: i64, close: f64, signal: Signal) -> SignaledBar {
    SignaledBar {
        bar: AugmentedBar {
            bar: make_bar(ticker, i, close),
            indicators: IndicatorSet {
                short_ma: Some(close),
                long_ma: Some(close),
                ..IndicatorSet::default()
            },
        },
        signal,
    }
}

pub fn make_strategy(buy: &str, sell: &str) -> StrategyConfig {
    StrategyConfig {
        name: "Test".into(),
        description: "Test strategy".into(),
        tickers: vec!["ABC".into()],
        short_window: 1,
        long_window: 1,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        buy_condition: buy.into(),
        sell_condition: sell.into(),
        capital: 1000.0,
        rebalance: DEFAULT_REBALANCE.into(),
        sizing_method: DEFAULT_SIZING_METHOD.into(),
        stop_loss_pct: 0.05,
        take_profit_pct: 0.15,
        data_path: PathBuf::from("data"),
    }
}
