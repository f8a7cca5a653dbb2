//! Technical indicator engine.
//!
//! Partitions a multi-ticker bar series by ticker, orders each partition by
//! time and computes the fixed indicator set per bar:
//! - `short_ma` / `long_ma`: SMA over the configured windows
//! - `rsi`: 14-period Wilder RSI
//! - `macd` / `macd_signal`: EMA(12) - EMA(26) and its EMA(9)
//! - `bb_upper` / `bb_middle` / `bb_lower`: Bollinger(20, 2)
//!
//! Values are computed at full precision and rounded to 4 decimals on
//! emission. Bars without both moving averages are dropped; bars missing only
//! RSI, MACD or Bollinger values are kept.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

use std::collections::BTreeMap;

use crate::domain::bar::Bar;
use crate::domain::numeric::round_to;

pub const RSI_PERIOD: usize = 14;
pub const EMIT_DECIMALS: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorParams {
    pub short_window: usize,
    pub long_window: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSet {
    pub short_ma: Option<f64>,
    pub long_ma: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub bb_middle: Option<f64>,
}

/// A bar together with the indicator values computed for it.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedBar {
    pub bar: Bar,
    pub indicators: IndicatorSet,
}

/// Split bars into per-ticker sequences, each ordered by timestamp.
///
/// Tickers iterate in lexical order; bars sharing a timestamp keep their
/// input order.
pub fn partition_by_ticker<'a, I>(bars: I) -> BTreeMap<String, Vec<Bar>>
where
    I: IntoIterator<Item = &'a Bar>,
{
    let mut partitions: BTreeMap<String, Vec<Bar>> = BTreeMap::new();
    for bar in bars {
        partitions
            .entry(bar.ticker.clone())
            .or_default()
            .push(bar.clone());
    }
    for series in partitions.values_mut() {
        series.sort_by_key(|b| b.timestamp);
    }
    partitions
}

pub fn compute_indicators(bars: &[Bar], params: &IndicatorParams) -> Vec<AugmentedBar> {
    let mut out = Vec::with_capacity(bars.len());
    for (_, series) in partition_by_ticker(bars) {
        out.extend(
            compute_partition(series, params)
                .into_iter()
                .filter(|ab| ab.indicators.short_ma.is_some() && ab.indicators.long_ma.is_some()),
        );
    }
    out
}

/// Indicators for one time-ordered single-ticker series. No bars are dropped.
pub fn compute_partition(series: Vec<Bar>, params: &IndicatorParams) -> Vec<AugmentedBar> {
    let closes: Vec<f64> = series.iter().map(|b| b.close).collect();

    let short_ma = sma::calculate_sma(&closes, params.short_window);
    let long_ma = sma::calculate_sma(&closes, params.long_window);
    let rsi = rsi::calculate_rsi(&closes, RSI_PERIOD);
    let macd = macd::calculate_macd_default(&closes);
    let bands =
        bollinger::calculate_bollinger(&closes, bollinger::DEFAULT_PERIOD, bollinger::DEFAULT_MULT);

    let emit = |v: Option<f64>| v.map(|x| round_to(x, EMIT_DECIMALS));

    series
        .into_iter()
        .enumerate()
        .map(|(i, bar)| AugmentedBar {
            bar,
            indicators: IndicatorSet {
                short_ma: emit(short_ma[i]),
                long_ma: emit(long_ma[i]),
                rsi: emit(rsi[i]),
                macd: emit(macd.line[i]),
                macd_signal: emit(macd.signal[i]),
                bb_upper: emit(bands[i].map(|b| b.upper)),
                bb_lower: emit(bands[i].map(|b| b.lower)),
                bb_middle: emit(bands[i].map(|b| b.middle)),
            },
        })
        .collect()
}
