//! Data access port trait.

use chrono::NaiveDate;

use crate::domain::bar::Bar;
use crate::domain::error::SignalTraderError;

pub trait DataPort {
    /// Bars for `ticker` whose calendar date lies in `[start_date, end_date]`,
    /// ordered by timestamp.
    fn fetch_bars(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, SignalTraderError>;

    fn list_tickers(&self) -> Result<Vec<String>, SignalTraderError>;
}
