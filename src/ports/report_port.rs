//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SignalTraderError;
use crate::domain::strategy::StrategyConfig;

/// Port for persisting a finished backtest.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        strategy: &StrategyConfig,
        output_path: &str,
    ) -> Result<(), SignalTraderError>;
}
