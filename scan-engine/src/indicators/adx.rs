use common::{Result, ScanError};

/// Directional movement system output, aligned with the input bars.
#[derive(Debug, Clone)]
pub struct DirectionalIndex {
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
    pub dx: Vec<f64>,
    pub adx: Vec<f64>,
}

/// Calculate ADX with +DI/-DI and DX
///
/// +DM, -DM and TR are Wilder-smoothed sums over `period`. When the smoothed
/// true range is zero both DIs are 0, and when +DI + -DI is zero DX is 0.
/// ADX is the mean of the first `period` DX values, Wilder-smoothed afterwards.
///
/// Needs `2 * period` bars; DI/DX start at index `period`, ADX at `2 * period - 1`.
pub fn calculate_adx(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Result<DirectionalIndex> {
    let n = highs.len();
    if period == 0 {
        return Err(ScanError::InvalidParameter("ADX period must be > 0".to_string()));
    }
    let required = 2 * period;
    if n < required {
        return Err(ScanError::insufficient("adx", required, n));
    }

    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    let mut tr = vec![0.0; n];
    for i in 1..n {
        let up = highs[i] - highs[i - 1];
        let down = lows[i - 1] - lows[i];
        if up > down && up > 0.0 {
            plus_dm[i] = up;
        }
        if down > up && down > 0.0 {
            minus_dm[i] = down;
        }
        tr[i] = super::true_range(highs[i], lows[i], closes[i - 1]);
    }

    let mut out = DirectionalIndex {
        plus_di: vec![f64::NAN; n],
        minus_di: vec![f64::NAN; n],
        dx: vec![f64::NAN; n],
        adx: vec![f64::NAN; n],
    };

    let p = period as f64;
    let mut s_tr: f64 = tr[1..=period].iter().sum();
    let mut s_plus: f64 = plus_dm[1..=period].iter().sum();
    let mut s_minus: f64 = minus_dm[1..=period].iter().sum();

    for i in period..n {
        if i > period {
            s_tr = s_tr - s_tr / p + tr[i];
            s_plus = s_plus - s_plus / p + plus_dm[i];
            s_minus = s_minus - s_minus / p + minus_dm[i];
        }

        let (pdi, mdi) = if s_tr > 0.0 {
            (100.0 * s_plus / s_tr, 100.0 * s_minus / s_tr)
        } else {
            (0.0, 0.0)
        };
        let di_sum = pdi + mdi;
        let dx = if di_sum > 0.0 {
            (100.0 * (pdi - mdi).abs() / di_sum).clamp(0.0, 100.0)
        } else {
            0.0
        };

        out.plus_di[i] = pdi;
        out.minus_di[i] = mdi;
        out.dx[i] = dx;
    }

    let first_adx = required - 1;
    out.adx[first_adx] = out.dx[period..=first_adx].iter().sum::<f64>() / p;
    for i in (first_adx + 1)..n {
        out.adx[i] = (out.adx[i - 1] * (p - 1.0) + out.dx[i]) / p;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_flat_series_has_zero_dx() {
        let flat = vec![25.0; 40];
        let adx = calculate_adx(&flat, &flat, &flat, 14).unwrap();

        for i in 14..40 {
            assert_eq!(adx.plus_di[i], 0.0);
            assert_eq!(adx.minus_di[i], 0.0);
            assert_eq!(adx.dx[i], 0.0);
        }
        assert_eq!(adx.adx[39], 0.0);
        assert!(adx.adx[26].is_nan());
        assert_eq!(adx.adx[27], 0.0);
    }

    #[test]
    fn test_adx_and_dx_bounded() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut close = 100.0;
        let (mut highs, mut lows, mut closes) = (vec![], vec![], vec![]);
        for _ in 0..300 {
            close *= 1.0 + rng.gen_range(-0.04..0.04);
            let spread = close * rng.gen_range(0.0..0.03);
            highs.push(close + spread);
            lows.push(close - spread);
            closes.push(close);
        }

        let adx = calculate_adx(&highs, &lows, &closes, 14).unwrap();
        for v in adx.dx.iter().chain(adx.adx.iter()).filter(|v| !v.is_nan()) {
            assert!((0.0..=100.0).contains(v), "out of range: {}", v);
        }
    }

    #[test]
    fn test_steady_uptrend_has_strong_plus_di() {
        let highs: Vec<f64> = (0..40).map(|i| 11.0 + i as f64).collect();
        let lows: Vec<f64> = (0..40).map(|i| 9.0 + i as f64).collect();
        let closes: Vec<f64> = (0..40).map(|i| 10.5 + i as f64).collect();
        let adx = calculate_adx(&highs, &lows, &closes, 14).unwrap();

        assert!(adx.plus_di[39] > adx.minus_di[39]);
        assert_eq!(adx.dx[39], 100.0);
        assert!(adx.adx[39] > 90.0);
    }

    #[test]
    fn test_adx_insufficient_data() {
        let v = vec![1.0; 27];
        assert!(matches!(
            calculate_adx(&v, &v, &v, 14),
            Err(ScanError::InsufficientData { required: 28, .. })
        ));
    }
}
