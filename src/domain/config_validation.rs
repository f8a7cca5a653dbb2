//! Configuration validation.
//!
//! Reads and validates every strategy field before any data is loaded. The
//! first violation is reported; required fields never fall back to defaults.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::domain::error::SignalTraderError;
use crate::domain::simulator::{DEFAULT_STOP_LOSS_PCT, DEFAULT_TAKE_PROFIT_PCT};
use crate::domain::strategy::{
    DEFAULT_CAPITAL, DEFAULT_DATA_PATH, DEFAULT_REBALANCE, DEFAULT_SIZING_METHOD, StrategyConfig,
};
use crate::ports::config_port::ConfigPort;

pub fn build_strategy_config(config: &dyn ConfigPort) -> Result<StrategyConfig, SignalTraderError> {
    let tickers = read_tickers(config)?;
    let short_window = read_window(config, "short_window")?;
    let long_window = read_window(config, "long_window")?;
    let (start_date, end_date) = read_dates(config)?;
    let buy_condition = require_string(config, "logic", "buy_condition")?;
    let sell_condition = require_string(config, "logic", "sell_condition")?;
    let capital = read_capital(config)?;
    let stop_loss_pct = read_fraction(config, "stop_loss_pct", DEFAULT_STOP_LOSS_PCT)?;
    let take_profit_pct = read_fraction(config, "take_profit_pct", DEFAULT_TAKE_PROFIT_PCT)?;

    Ok(StrategyConfig {
        name: optional_string(config, "strategy", "name").unwrap_or_else(|| "Unnamed".to_string()),
        description: optional_string(config, "strategy", "description").unwrap_or_default(),
        tickers,
        short_window,
        long_window,
        start_date,
        end_date,
        buy_condition,
        sell_condition,
        capital,
        rebalance: optional_string(config, "backtest", "rebalance")
            .unwrap_or_else(|| DEFAULT_REBALANCE.to_string()),
        sizing_method: optional_string(config, "position_sizing", "method")
            .unwrap_or_else(|| DEFAULT_SIZING_METHOD.to_string()),
        stop_loss_pct,
        take_profit_pct,
        data_path: PathBuf::from(
            optional_string(config, "data", "path").unwrap_or_else(|| DEFAULT_DATA_PATH.to_string()),
        ),
    })
}

fn missing(section: &str, key: &str) -> SignalTraderError {
    SignalTraderError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> SignalTraderError {
    SignalTraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn optional_string(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn require_string(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, SignalTraderError> {
    optional_string(config, section, key).ok_or_else(|| missing(section, key))
}

fn read_tickers(config: &dyn ConfigPort) -> Result<Vec<String>, SignalTraderError> {
    let tickers = config
        .get_list("strategy", "tickers")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| missing("strategy", "tickers"))?;

    if let Some(bad) = tickers.iter().find(|t| !is_safe_ticker(t)) {
        return Err(invalid(
            "strategy",
            "tickers",
            format!("invalid ticker '{}'", bad),
        ));
    }

    let mut seen = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        if !seen.contains(&ticker) {
            seen.push(ticker);
        }
    }
    Ok(seen)
}

/// Tickers name files under the data directory, so anything that could step
/// outside it is refused. Vendor prefixes such as `X:BTCUSD` are fine.
fn is_safe_ticker(ticker: &str) -> bool {
    !ticker.contains("..")
        && !ticker
            .chars()
            .any(|c| matches!(c, '/' | '\\') || c.is_whitespace() || c.is_control())
}

fn read_window(config: &dyn ConfigPort, key: &str) -> Result<usize, SignalTraderError> {
    let raw = require_string(config, "parameters", key)?;
    match raw.parse::<usize>() {
        Ok(w) if w >= 1 => Ok(w),
        _ => Err(invalid(
            "parameters",
            key,
            format!("{} must be an integer >= 1, got '{}'", key, raw),
        )),
    }
}

fn read_dates(config: &dyn ConfigPort) -> Result<(NaiveDate, NaiveDate), SignalTraderError> {
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;

    if start_date > end_date {
        return Err(invalid(
            "parameters",
            "start_date",
            "start_date must not be after end_date",
        ));
    }
    Ok((start_date, end_date))
}

fn parse_date(config: &dyn ConfigPort, field: &str) -> Result<NaiveDate, SignalTraderError> {
    let raw = require_string(config, "parameters", field)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
        invalid(
            "parameters",
            field,
            format!("invalid {} format, expected YYYY-MM-DD", field),
        )
    })
}

fn read_capital(config: &dyn ConfigPort) -> Result<f64, SignalTraderError> {
    let Some(raw) = optional_string(config, "backtest", "capital") else {
        return Ok(DEFAULT_CAPITAL);
    };
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(invalid(
            "backtest",
            "capital",
            format!("capital must be a positive number, got '{}'", raw),
        )),
    }
}

fn read_fraction(config: &dyn ConfigPort, key: &str, default: f64) -> Result<f64, SignalTraderError> {
    let Some(raw) = optional_string(config, "risk_management", key) else {
        return Ok(default);
    };
    match raw.parse::<f64>() {
        Ok(v) if v > 0.0 && v < 1.0 => Ok(v),
        _ => Err(invalid(
            "risk_management",
            key,
            format!("{} must be a fraction between 0 and 1, got '{}'", key, raw),
        )),
    }
}
