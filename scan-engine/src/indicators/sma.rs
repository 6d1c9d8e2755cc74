/// Simple moving average, NaN until `period` values have been seen.
///
/// A running sum keeps this linear in the input length. A zero period or a
/// series shorter than the period yields all NaN.
pub fn calculate_sma_nan(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let width = period as f64;
    let mut running: f64 = values[..period].iter().sum();
    out[period - 1] = running / width;
    for (i, (&entering, &leaving)) in values[period..].iter().zip(values).enumerate() {
        running += entering - leaving;
        out[i + period] = running / width;
    }
    out
}
