//! Trade ledger CSV writer.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SignalTraderError;
use crate::domain::position::Trade;
use crate::domain::strategy::StrategyConfig;
use crate::ports::report_port::ReportPort;

pub const LEDGER_HEADER: [&str; 11] = [
    "ticker",
    "entry_datetime",
    "exit_datetime",
    "entry_price",
    "exit_price",
    "return_pct",
    "pnl",
    "allocated_cash",
    "shares",
    "holding_ticks",
    "exit_reason",
];

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct LedgerCsvAdapter;

fn report_error(path: &Path, e: impl std::fmt::Display) -> SignalTraderError {
    SignalTraderError::Report {
        reason: format!("{}: {}", path.display(), e),
    }
}

fn trade_row(trade: &Trade) -> [String; 11] {
    [
        trade.ticker.clone(),
        trade.entry_datetime.format(DATETIME_FORMAT).to_string(),
        trade.exit_datetime.format(DATETIME_FORMAT).to_string(),
        format!("{:.4}", trade.entry_price),
        format!("{:.4}", trade.exit_price),
        format!("{:.4}", trade.return_pct),
        format!("{:.2}", trade.pnl),
        format!("{:.2}", trade.allocated_cash),
        format!("{:.4}", trade.shares),
        format!("{:.1}", trade.holding_ticks),
        trade.exit_reason.to_string(),
    ]
}

/// Write `trades` to `path` in ledger order.
pub fn write_ledger(trades: &[Trade], path: &Path) -> Result<(), SignalTraderError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| report_error(path, e))?;
    writer
        .write_record(LEDGER_HEADER)
        .map_err(|e| report_error(path, e))?;
    for trade in trades {
        writer
            .write_record(trade_row(trade))
            .map_err(|e| report_error(path, e))?;
    }
    writer.flush()?;
    Ok(())
}

impl ReportPort for LedgerCsvAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        _strategy: &StrategyConfig,
        output_path: &str,
    ) -> Result<(), SignalTraderError> {
        write_ledger(&result.trades, Path::new(output_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::ExitReason;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_trade() -> Trade {
        let day = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
        Trade {
            ticker: "ABC".into(),
            entry_datetime: day.and_hms_opt(9, 30, 0).unwrap(),
            exit_datetime: day.and_hms_opt(10, 15, 0).unwrap(),
            entry_price: 100.0,
            exit_price: 94.0,
            return_pct: -6.0,
            pnl: -60.0,
            allocated_cash: 1000.0,
            shares: 10.0,
            holding_ticks: 3.0,
            exit_reason: ExitReason::StopLoss,
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.csv");
        write_ledger(&[sample_trade()], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some(LEDGER_HEADER.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("ABC,2024-02-05 09:30:00,2024-02-05 10:15:00,100.0000,94.0000,-6.0000,-60.00,1000.00,10.0000,3.0,stop loss")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn holding_ticks_keep_one_decimal() {
        let whole = trade_row(&sample_trade());
        assert_eq!(whole[9], "3.0");

        let mut trade = sample_trade();
        trade.holding_ticks = 0.5;
        assert_eq!(trade_row(&trade)[9], "0.5");
    }

    #[test]
    fn empty_ledger_has_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");
        write_ledger(&[], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), LEDGER_HEADER.join(","));
    }

    #[test]
    fn unwritable_path_is_report_error() {
        let err = write_ledger(&[], Path::new("/nonexistent/dir/ledger.csv")).unwrap_err();
        assert!(matches!(err, SignalTraderError::Report { .. }));
    }
}
