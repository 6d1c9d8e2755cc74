/// Least-squares fit of `values` against their index.
///
/// Returns `(slope, intercept)`, or `None` for fewer than two points or any NaN.
pub fn linear_regression(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len();
    if n < 2 || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let n_f = n as f64;
    let mean_x = (n_f - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n_f;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }
    let slope = num / den;
    Some((slope, mean_y - slope * mean_x))
}

pub fn linear_regression_slope(values: &[f64]) -> Option<f64> {
    linear_regression(values).map(|(slope, _)| slope)
}

/// Fitted value at the last index
pub fn linear_regression_endpoint(values: &[f64]) -> Option<f64> {
    linear_regression(values).map(|(slope, intercept)| intercept + slope * (values.len() - 1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_line() {
        let values = vec![1.0, 3.0, 5.0, 7.0];
        let (slope, intercept) = linear_regression(&values).unwrap();
        assert_relative_eq!(slope, 2.0);
        assert_relative_eq!(intercept, 1.0);
        assert_relative_eq!(linear_regression_endpoint(&values).unwrap(), 7.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(linear_regression(&[1.0]).is_none());
        assert!(linear_regression(&[1.0, f64::NAN, 2.0]).is_none());
    }
}
