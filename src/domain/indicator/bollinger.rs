//! Bollinger Bands indicator.
//!
//! Middle = SMA(n)
//! Upper  = Middle + k * STDDEV(n)
//! Lower  = Middle - k * STDDEV(n)
//!
//! STDDEV is the population standard deviation over the same window.
//! Default: n=20, k=2.0. Warmup: first (n-1) bars are undefined.

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULT: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

pub fn calculate_bollinger(closes: &[f64], period: usize, mult: f64) -> Vec<Option<Bands>> {
    let mut values = Vec::with_capacity(closes.len());
    if period == 0 {
        values.resize(closes.len(), None);
        return values;
    }

    for i in 0..closes.len() {
        if i + 1 < period {
            values.push(None);
            continue;
        }
        let window = &closes[i + 1 - period..=i];
        let middle = window.iter().sum::<f64>() / period as f64;
        let stddev = population_stddev(window, middle);
        values.push(Some(Bands {
            upper: middle + mult * stddev,
            middle,
            lower: middle - mult * stddev,
        }));
    }

    values
}

fn population_stddev(window: &[f64], mean: f64) -> f64 {
    let variance = window
        .iter()
        .map(|c| {
            let diff = c - mean;
            diff * diff
        })
        .sum::<f64>()
        / window.len() as f64;
    variance.sqrt()
}
