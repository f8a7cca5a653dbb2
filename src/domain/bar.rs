//! Price bar representation.

use chrono::NaiveDateTime;

/// Bar interval used for holding-duration measurement (15 minutes).
pub const BAR_INTERVAL_SECS: i64 = 15 * 60;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub ticker: String,
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Elapsed bar intervals between two instants.
pub fn ticks_between(from: NaiveDateTime, to: NaiveDateTime, interval_secs: i64) -> f64 {
    (to - from).num_seconds() as f64 / interval_secs as f64
}
