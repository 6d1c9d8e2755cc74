use common::{Result, ScanError};

/// Calculate RSI using Wilder's Smoothing
///
/// The first value (at index `period`) is seeded with the simple average of the
/// first `period` changes, later values use smoothing factor 1/period.
///
/// # Arguments
/// * `prices` - Slice of closing prices
/// * `period` - RSI period (typically 14)
///
/// # Returns
/// Vector of RSI values aligned with `prices`, NaN during warm-up.
/// RSI is exactly 100 whenever the average loss is zero.
pub fn calculate_rsi(prices: &[f64], period: usize) -> Result<Vec<f64>> {
    let n = prices.len();
    if period == 0 {
        return Err(ScanError::InvalidParameter("RSI period must be > 0".to_string()));
    }
    if n < period + 1 {
        return Err(ScanError::insufficient("rsi", period + 1, n));
    }

    let mut rsi = vec![f64::NAN; n];
    let alpha = 1.0 / period as f64;

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let delta = prices[i] - prices[i - 1];
        if delta > 0.0 {
            avg_gain += delta;
        } else {
            avg_loss += delta.abs();
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    rsi[period] = rsi_from_averages(avg_gain, avg_loss);

    for i in (period + 1)..n {
        let delta = prices[i] - prices[i - 1];
        let gain = if delta > 0.0 { delta } else { 0.0 };
        let loss = if delta < 0.0 { delta.abs() } else { 0.0 };

        avg_gain = avg_gain * (1.0 - alpha) + gain * alpha;
        avg_loss = avg_loss * (1.0 - alpha) + loss * alpha;
        rsi[i] = rsi_from_averages(avg_gain, avg_loss);
    }

    Ok(rsi)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - (100.0 / (1.0 + rs))).clamp(0.0, 100.0)
}
