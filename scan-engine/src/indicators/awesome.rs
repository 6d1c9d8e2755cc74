use common::{Result, ScanError};

use super::calculate_sma_nan;

/// Awesome Oscillator: SMA(fast) − SMA(slow) of the bar midpoint (high + low) / 2
pub fn calculate_awesome_oscillator(highs: &[f64], lows: &[f64], fast: usize, slow: usize) -> Result<Vec<f64>> {
    let n = highs.len();
    if fast == 0 || fast >= slow {
        return Err(ScanError::InvalidParameter(format!(
            "awesome oscillator needs 0 < fast < slow, got {}/{}",
            fast, slow
        )));
    }
    if n < slow {
        return Err(ScanError::insufficient("awesome_oscillator", slow, n));
    }

    let midpoints: Vec<f64> = highs.iter().zip(lows).map(|(h, l)| (h + l) / 2.0).collect();
    let fast_sma = calculate_sma_nan(&midpoints, fast);
    let slow_sma = calculate_sma_nan(&midpoints, slow);

    Ok(fast_sma.iter().zip(&slow_sma).map(|(f, s)| f - s).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rising_midpoints_are_positive() {
        let highs: Vec<f64> = (0..40).map(|i| 11.0 + i as f64).collect();
        let lows: Vec<f64> = (0..40).map(|i| 9.0 + i as f64).collect();
        let ao = calculate_awesome_oscillator(&highs, &lows, 5, 34).unwrap();

        assert!(ao[32].is_nan());
        // lag difference of a unit-slope line: (34 - 5) / 2
        assert_eq!(ao[39], 14.5);
    }

    #[test]
    fn test_requires_slow_period() {
        let v = vec![1.0; 33];
        assert!(calculate_awesome_oscillator(&v, &v, 5, 34).is_err());
    }
}
