use common::{Result, ScanError};

/// Bollinger Bands result
#[derive(Debug, Clone)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

impl BollingerBands {
    /// Upper minus lower at `idx`
    pub fn width(&self, idx: usize) -> f64 {
        self.upper[idx] - self.lower[idx]
    }
}

/// Calculate Bollinger Bands
///
/// # Arguments
/// * `prices` - Slice of closing prices
/// * `period` - Period for moving average (typically 20)
/// * `std_dev` - Number of standard deviations (typically 2.0)
///
/// # Returns
/// BollingerBands with the SMA as middle band and the sample standard deviation
/// (ddof = 1) for the offsets. Warm-up positions are NaN.
pub fn calculate_bollinger_bands(prices: &[f64], period: usize, std_dev: f64) -> Result<BollingerBands> {
    let n = prices.len();
    if period < 2 {
        return Err(ScanError::InvalidParameter(
            "Bollinger period must be >= 2".to_string(),
        ));
    }
    if n < period {
        return Err(ScanError::insufficient("bollinger", period, n));
    }

    let mut bb = BollingerBands {
        upper: vec![f64::NAN; n],
        middle: vec![f64::NAN; n],
        lower: vec![f64::NAN; n],
    };

    for i in (period - 1)..n {
        let window = &prices[i + 1 - period..=i];
        let mean: f64 = window.iter().sum::<f64>() / period as f64;
        let variance: f64 =
            window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (period - 1) as f64;
        let std = variance.sqrt();

        bb.middle[i] = mean;
        bb.upper[i] = mean + std * std_dev;
        bb.lower[i] = mean - std * std_dev;
    }

    Ok(bb)
}

/// Calculate %B indicator (position within bands)
/// Returns value between 0 and 1 when within bands
/// < 0 means below lower band, > 1 means above upper band
pub fn percent_b(price: f64, lower: f64, upper: f64) -> f64 {
    if upper == lower {
        return 0.5;
    }
    (price - lower) / (upper - lower)
}

/// Calculate bandwidth (volatility indicator)
pub fn bandwidth(upper: f64, middle: f64, lower: f64) -> f64 {
    if middle == 0.0 {
        return f64::NAN;
    }
    (upper - lower) / middle
}
