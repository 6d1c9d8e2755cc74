use common::config::EPSILON;
use common::{Result, ScanError};

use super::regression::linear_regression_slope;

/// Calculate On-Balance Volume
///
/// Starts at 0 and adds the bar's volume on an up close, subtracts it on a
/// down close, and carries it unchanged on an equal close.
pub fn calculate_obv(closes: &[f64], volumes: &[f64]) -> Result<Vec<f64>> {
    let n = closes.len();
    if n < 2 {
        return Err(ScanError::insufficient("obv", 2, n));
    }
    let mut obv = vec![0.0; n];
    for i in 1..n {
        let step = if closes[i] > closes[i - 1] {
            volumes[i]
        } else if closes[i] < closes[i - 1] {
            -volumes[i]
        } else {
            0.0
        };
        obv[i] = obv[i - 1] + step;
    }
    Ok(obv)
}

/// Mean absolute OBV change across a window
pub fn mean_abs_delta(obv: &[f64]) -> f64 {
    if obv.len() < 2 {
        return 0.0;
    }
    let total: f64 = obv.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    total / (obv.len() - 1) as f64
}

/// OBV trend over the trailing `window` bars in units of the window's own
/// average OBV step, so the value is comparable across share volumes.
///
/// `None` when fewer than `window` values exist.
pub fn normalized_obv_slope(obv: &[f64], window: usize) -> Option<f64> {
    if window < 2 || obv.len() < window {
        return None;
    }
    let tail = &obv[obv.len() - window..];
    let slope = linear_regression_slope(tail)?;
    Some(slope / (mean_abs_delta(tail) + EPSILON))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_obv_accumulation() {
        let closes = vec![10.0, 11.0, 10.5, 10.5, 12.0];
        let volumes = vec![100.0, 200.0, 300.0, 400.0, 500.0];
        let obv = calculate_obv(&closes, &volumes).unwrap();
        assert_eq!(obv, vec![0.0, 200.0, -100.0, -100.0, 400.0]);
    }

    #[test]
    fn test_normalized_slope_is_scale_free() {
        let closes: Vec<f64> = (0..20).map(|i| 10.0 + i as f64).collect();
        let small = vec![1_000.0; 20];
        let large = vec![50_000_000.0; 20];

        let obv_small = calculate_obv(&closes, &small).unwrap();
        let obv_large = calculate_obv(&closes, &large).unwrap();

        let s1 = normalized_obv_slope(&obv_small, 14).unwrap();
        let s2 = normalized_obv_slope(&obv_large, 14).unwrap();
        assert_relative_eq!(s1, 1.0, epsilon = 1e-6);
        assert_relative_eq!(s1, s2, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_volume_slope_is_finite() {
        let closes: Vec<f64> = (0..20).map(|i| 10.0 + i as f64).collect();
        let volumes = vec![0.0; 20];
        let obv = calculate_obv(&closes, &volumes).unwrap();
        let slope = normalized_obv_slope(&obv, 14).unwrap();
        assert_eq!(slope, 0.0);
    }
}
