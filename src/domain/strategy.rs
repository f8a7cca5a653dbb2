//! Strategy configuration model.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::domain::bar::BAR_INTERVAL_SECS;
use crate::domain::indicator::IndicatorParams;
use crate::domain::simulator::SimulationConfig;

pub const DEFAULT_CAPITAL: f64 = 100_000.0;
pub const DEFAULT_REBALANCE: &str = "daily";
pub const DEFAULT_SIZING_METHOD: &str = "equal_weight";
pub const DEFAULT_DATA_PATH: &str = "data";

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub name: String,
    pub description: String,
    pub tickers: Vec<String>,
    pub short_window: usize,
    pub long_window: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub buy_condition: String,
    pub sell_condition: String,
    pub capital: f64,
    pub rebalance: String,
    /// Reported only. Every run allocates the whole cash pool per entry.
    pub sizing_method: String,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub data_path: PathBuf,
}

impl StrategyConfig {
    pub fn indicator_params(&self) -> IndicatorParams {
        IndicatorParams {
            short_window: self.short_window,
            long_window: self.long_window,
        }
    }

    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            initial_capital: self.capital,
            stop_loss_pct: self.stop_loss_pct,
            take_profit_pct: self.take_profit_pct,
            bar_interval_secs: BAR_INTERVAL_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> StrategyConfig {
        StrategyConfig {
            name: "MA Crossover".into(),
            description: "Short over long moving average".into(),
            tickers: vec!["AAPL".into(), "MSFT".into()],
            short_window: 5,
            long_window: 20,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            buy_condition: "short_ma > long_ma".into(),
            sell_condition: "short_ma < long_ma".into(),
            capital: 50_000.0,
            rebalance: DEFAULT_REBALANCE.into(),
            sizing_method: DEFAULT_SIZING_METHOD.into(),
            stop_loss_pct: 0.03,
            take_profit_pct: 0.1,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
        }
    }

    #[test]
    fn indicator_params_from_windows() {
        let params = sample_config().indicator_params();
        assert_eq!(params.short_window, 5);
        assert_eq!(params.long_window, 20);
    }

    #[test]
    fn simulation_config_carries_risk() {
        let sim = sample_config().simulation_config();
        assert_eq!(sim.initial_capital, 50_000.0);
        assert_eq!(sim.stop_loss_pct, 0.03);
        assert_eq!(sim.take_profit_pct, 0.1);
        assert_eq!(sim.bar_interval_secs, 900);
    }
}
