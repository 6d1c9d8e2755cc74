use common::{Result, ScanError};

use super::{calculate_atr, calculate_ema_with_sma_seed};

/// Keltner Channels result
#[derive(Debug, Clone)]
pub struct KeltnerChannels {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

impl KeltnerChannels {
    pub fn width(&self, idx: usize) -> f64 {
        self.upper[idx] - self.lower[idx]
    }
}

/// Calculate Keltner Channels
///
/// middle = EMA(period), upper/lower = middle ± atr_mult · ATR(period)
pub fn calculate_keltner(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
    atr_mult: f64,
) -> Result<KeltnerChannels> {
    let n = closes.len();
    if period == 0 {
        return Err(ScanError::InvalidParameter("Keltner period must be > 0".to_string()));
    }
    if n < period {
        return Err(ScanError::insufficient("keltner", period, n));
    }

    let middle = calculate_ema_with_sma_seed(closes, period);
    let atr = calculate_atr(highs, lows, closes, period)?;

    let upper = middle.iter().zip(&atr).map(|(m, a)| m + atr_mult * a).collect();
    let lower = middle.iter().zip(&atr).map(|(m, a)| m - atr_mult * a).collect();

    Ok(KeltnerChannels { upper, middle, lower })
}

/// Bollinger bands strictly inside the Keltner channel.
///
/// Coinciding bands are not a squeeze, and any NaN input yields false.
pub fn is_squeeze(bb_upper: f64, bb_lower: f64, kc_upper: f64, kc_lower: f64) -> bool {
    bb_upper < kc_upper && bb_lower > kc_lower
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_keltner_constant_range() {
        let highs = vec![11.0; 25];
        let lows = vec![9.0; 25];
        let closes = vec![10.0; 25];
        let kc = calculate_keltner(&highs, &lows, &closes, 20, 1.5).unwrap();

        assert!(kc.middle[18].is_nan());
        assert_relative_eq!(kc.middle[24], 10.0);
        assert_relative_eq!(kc.upper[24], 13.0);
        assert_relative_eq!(kc.lower[24], 7.0);
        assert_relative_eq!(kc.width(24), 6.0);
    }

    #[test]
    fn test_squeeze_requires_strict_containment() {
        assert!(is_squeeze(10.5, 9.5, 11.0, 9.0));
        // coinciding bands
        assert!(!is_squeeze(11.0, 9.0, 11.0, 9.0));
        // one side touching
        assert!(!is_squeeze(11.0, 9.5, 11.0, 9.0));
        assert!(!is_squeeze(10.5, 9.0, 11.0, 9.0));
        // outside
        assert!(!is_squeeze(12.0, 8.0, 11.0, 9.0));
        assert!(!is_squeeze(f64::NAN, 9.5, 11.0, 9.0));
    }
}
