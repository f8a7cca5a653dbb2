//! CSV file bar source.
//!
//! One file per ticker, `<base>/<TICKER>.csv`, with header
//! `timestamp,open,high,low,close,volume`. Timestamps are either Unix epoch
//! milliseconds or `YYYY-MM-DD HH:MM:SS` and are read as UTC.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::domain::bar::Bar;
use crate::domain::error::SignalTraderError;
use crate::ports::data_port::DataPort;

const COLUMNS: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

fn data_error(reason: String) -> SignalTraderError {
    SignalTraderError::Data { reason }
}

/// Position of each required column in the header row.
fn column_indices(headers: &StringRecord) -> Result<[usize; 6], SignalTraderError> {
    let mut indices = [0usize; 6];
    for (slot, name) in indices.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| data_error(format!("missing {} column", name)))?;
    }
    Ok(indices)
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(millis) = raw.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn parse_field(record: &StringRecord, index: usize, name: &str, line: u64) -> Result<f64, SignalTraderError> {
    let raw = record
        .get(index)
        .ok_or_else(|| data_error(format!("line {}: missing {} value", line, name)))?;
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| data_error(format!("line {}: invalid {} value '{}': {}", line, name, raw, e)))?;
    if !value.is_finite() {
        return Err(data_error(format!(
            "line {}: non-finite {} value '{}'",
            line, name, raw
        )));
    }
    Ok(value)
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, SignalTraderError> {
        let path = self.csv_path(ticker);
        if !path.is_file() {
            return Err(SignalTraderError::NoData {
                ticker: ticker.to_string(),
            });
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| data_error(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| data_error(format!("{}: CSV header error: {}", path.display(), e)))?
            .clone();
        let [ts_idx, open_idx, high_idx, low_idx, close_idx, volume_idx] = column_indices(&headers)?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result
                .map_err(|e| data_error(format!("{}: CSV parse error: {}", path.display(), e)))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let raw_ts = record
                .get(ts_idx)
                .ok_or_else(|| data_error(format!("line {}: missing timestamp value", line)))?;
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| {
                data_error(format!("line {}: invalid timestamp '{}'", line, raw_ts))
            })?;

            let date = timestamp.date();
            if date < start_date || date > end_date {
                continue;
            }

            bars.push(Bar {
                ticker: ticker.to_string(),
                timestamp,
                open: parse_field(&record, open_idx, "open", line)?,
                high: parse_field(&record, high_idx, "high", line)?,
                low: parse_field(&record, low_idx, "low", line)?,
                close: parse_field(&record, close_idx, "close", line)?,
                volume: parse_field(&record, volume_idx, "volume", line)?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }

    fn list_tickers(&self) -> Result<Vec<String>, SignalTraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            data_error(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut tickers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| data_error(format!("directory entry error: {}", e)))?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(ticker) = name_str.strip_suffix(".csv") {
                if !ticker.is_empty() {
                    tickers.push(ticker.to_string());
                }
            }
        }

        tickers.sort();
        Ok(tickers)
    }
}
