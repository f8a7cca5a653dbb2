//! Simple Moving Average.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: first (n-1) values are undefined.

pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
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
        values.push(Some(window.iter().sum::<f64>() / period as f64));
    }

    values
}
