//! Exponential smoothing used by EMA, MACD and RSI.
//!
//! Recursive form: y[0] = x[first], y[i] = alpha * x[i] + (1 - alpha) * y[i-1].
//! The average starts at the first defined input; leading undefined inputs
//! stay undefined. A value is emitted once `min_periods` defined inputs have
//! been seen.
//!
//! EMA(span) uses alpha = 2 / (span + 1) and min_periods = span.

/// Recursive exponential average over a series with optional leading gaps.
///
/// An undefined input after the average has started leaves the running
/// value unchanged and emits nothing for that position.
pub fn exponential_average(
    values: &[Option<f64>],
    alpha: f64,
    min_periods: usize,
) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let mut running: Option<f64> = None;
    let mut seen = 0usize;

    for value in values {
        match value {
            Some(x) => {
                let next = match running {
                    Some(prev) => alpha * x + (1.0 - alpha) * prev,
                    None => *x,
                };
                running = Some(next);
                seen += 1;
                out.push(if seen >= min_periods { Some(next) } else { None });
            }
            None => out.push(None),
        }
    }

    out
}

pub fn calculate_ema(values: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    if span == 0 {
        return vec![None; values.len()];
    }
    let alpha = 2.0 / (span as f64 + 1.0);
    exponential_average(values, alpha, span)
}
