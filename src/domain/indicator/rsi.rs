//! RSI (Relative Strength Index) indicator.
//!
//! Uses Wilder's smoothing (alpha = 1/n) for average gain/loss:
//! - The first bar has no prior close and contributes a zero change
//! - avg[i] = avg[i-1] + (x[i] - avg[i-1]) / n, seeded with the first change
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::ema::exponential_average;

pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || closes.is_empty() {
        return vec![None; closes.len()];
    }

    let mut gains: Vec<Option<f64>> = Vec::with_capacity(closes.len());
    let mut losses: Vec<Option<f64>> = Vec::with_capacity(closes.len());
    gains.push(Some(0.0));
    losses.push(Some(0.0));

    for i in 1..closes.len() {
        let change = closes[i] - closes[i - 1];
        gains.push(Some(if change > 0.0 { change } else { 0.0 }));
        losses.push(Some(if change < 0.0 { -change } else { 0.0 }));
    }

    let alpha = 1.0 / period as f64;
    let avg_gain = exponential_average(&gains, alpha, period);
    let avg_loss = exponential_average(&losses, alpha, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(gain, loss)| match (gain, loss) {
            (Some(_), Some(loss)) if *loss == 0.0 => Some(100.0),
            (Some(gain), Some(loss)) => Some(100.0 - (100.0 / (1.0 + gain / loss))),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rsi_empty() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_warmup_length() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i % 3) as f64).collect();
        let series = calculate_rsi(&closes, 14);
        for (i, v) in series.iter().enumerate() {
            assert_eq!(v.is_some(), i >= 13, "index {}", i);
        }
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let series = calculate_rsi(&closes, 14);
        assert_relative_eq!(series[19].unwrap(), 100.0);
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let series = calculate_rsi(&closes, 14);
        assert_relative_eq!(series[19].unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn rsi_alternating_moves_near_50() {
        let closes: Vec<f64> = (0..200)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        let series = calculate_rsi(&closes, 14);
        let last = series[199].unwrap();
        assert!((last - 50.0).abs() < 5.0, "rsi = {}", last);
    }

    #[test]
    fn rsi_hand_computed_period_two() {
        // changes: [0, +2, -1]; alpha = 0.5
        // gains: 0 -> 1 -> 0.5 ; losses: 0 -> 0 -> 0.5
        let series = calculate_rsi(&[10.0, 12.0, 11.0], 2);
        assert_eq!(series[0], None);
        assert_relative_eq!(series[1].unwrap(), 100.0);
        assert_relative_eq!(series[2].unwrap(), 50.0, epsilon = 1e-12);
    }

    #[test]
    fn rsi_bounded() {
        let closes = [
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ];
        for v in calculate_rsi(&closes, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v));
        }
    }
}
