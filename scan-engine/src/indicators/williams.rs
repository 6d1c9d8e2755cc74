use common::{Result, ScanError};

/// Williams %R in [-100, 0]
///
/// -100 · (highest high − close) / (highest high − lowest low) over `period`.
/// A zero-range window is NaN.
pub fn calculate_williams_r(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Result<Vec<f64>> {
    let n = closes.len();
    if period == 0 {
        return Err(ScanError::InvalidParameter("Williams %R period must be > 0".to_string()));
    }
    if n < period {
        return Err(ScanError::insufficient("williams_r", period, n));
    }

    let mut out = vec![f64::NAN; n];
    for i in (period - 1)..n {
        let start = i + 1 - period;
        let hh = highs[start..=i].iter().copied().fold(f64::MIN, f64::max);
        let ll = lows[start..=i].iter().copied().fold(f64::MAX, f64::min);
        let range = hh - ll;
        if range > 0.0 {
            out[i] = -100.0 * (hh - closes[i]) / range;
        }
    }
    Ok(out)
}
