use common::{Result, ScanError};

/// Calculate True Range for a single bar
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    let hl = high - low;
    let hc = (high - prev_close).abs();
    let lc = (low - prev_close).abs();
    hl.max(hc).max(lc)
}

/// True Range for every bar; the first bar has no previous close and uses high - low
pub fn true_ranges(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    let n = highs.len();
    let mut tr = vec![0.0; n];
    if n == 0 {
        return tr;
    }
    tr[0] = highs[0] - lows[0];
    for i in 1..n {
        tr[i] = true_range(highs[i], lows[i], closes[i - 1]);
    }
    tr
}

/// Calculate Average True Range
///
/// # Arguments
/// * `highs` - Slice of high prices
/// * `lows` - Slice of low prices
/// * `closes` - Slice of closing prices
/// * `period` - ATR period (typically 14)
///
/// # Returns
/// Vector of ATR values, NaN before index `period - 1`
pub fn calculate_atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Result<Vec<f64>> {
    let n = highs.len();
    if period == 0 {
        return Err(ScanError::InvalidParameter("ATR period must be > 0".to_string()));
    }
    if n < period {
        return Err(ScanError::insufficient("atr", period, n));
    }

    let tr = true_ranges(highs, lows, closes);
    let mut atr = vec![f64::NAN; n];
    let alpha = 1.0 / period as f64;

    // Seed with the simple mean of the first `period` true ranges
    atr[period - 1] = tr[..period].iter().sum::<f64>() / period as f64;

    for i in period..n {
        atr[i] = atr[i - 1] * (1.0 - alpha) + tr[i] * alpha;
    }

    Ok(atr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_atr_basic() {
        let highs = vec![48.7, 48.72, 48.9, 48.87, 48.82, 49.05, 49.2, 49.35, 49.92, 50.19];
        let lows = vec![47.79, 48.14, 48.39, 48.37, 48.24, 48.64, 48.94, 48.86, 49.5, 49.87];
        let closes = vec![48.16, 48.61, 48.75, 48.63, 48.74, 49.03, 49.07, 49.32, 49.91, 50.13];

        let atr = calculate_atr(&highs, &lows, &closes, 5).unwrap();

        assert_eq!(atr.len(), highs.len());
        assert!(atr[3].is_nan());
        for value in &atr[4..] {
            assert!(*value > 0.0);
        }
    }

    #[test]
    fn test_atr_seed_is_mean_of_first_ranges() {
        let highs = vec![11.0, 12.0, 13.0, 14.0];
        let lows = vec![9.0, 10.0, 11.0, 12.0];
        let closes = vec![10.0, 11.0, 12.0, 13.0];
        let atr = calculate_atr(&highs, &lows, &closes, 3).unwrap();
        // TR = [2, 2, 2, 2]
        assert_relative_eq!(atr[2], 2.0);
        assert_relative_eq!(atr[3], 2.0);
    }

    #[test]
    fn test_true_range() {
        // max(50-48, |50-49|, |48-49|) = 2
        assert_eq!(true_range(50.0, 48.0, 49.0), 2.0);
    }

    #[test]
    fn test_true_range_gap_up() {
        // max(52-51, |52-48|, |51-48|) = 4
        assert_eq!(true_range(52.0, 51.0, 48.0), 4.0);
    }

    #[test]
    fn test_atr_insufficient_data() {
        let v = vec![1.0, 2.0];
        assert!(calculate_atr(&v, &v, &v, 14).is_err());
    }
}
