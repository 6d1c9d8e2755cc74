/// Smoothing factor 2 / (period + 1)
pub fn ema_alpha(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Exponential Moving Average seeded with the SMA of the first `period` values.
///
/// Aligned with `prices`; positions before `period - 1` are NaN, and every
/// position is NaN when the series is shorter than `period`.
pub fn calculate_ema_with_sma_seed(prices: &[f64], period: usize) -> Vec<f64> {
    let mut ema = vec![f64::NAN; prices.len()];
    if period == 0 || prices.len() < period {
        return ema;
    }

    let alpha = ema_alpha(period);
    let mut current = prices[..period].iter().sum::<f64>() / period as f64;
    ema[period - 1] = current;
    for (slot, price) in ema.iter_mut().zip(prices).skip(period) {
        current += alpha * (price - current);
        *slot = current;
    }
    ema
}
