use chrono::{Duration, NaiveDate};
use common::{Bar, Result, ScanError};
use tracing::debug;

/// Trading date of a bar once shifted by the session's UTC offset
pub fn session_date(bar: &Bar, utc_offset_minutes: i32) -> NaiveDate {
    (bar.timestamp + Duration::minutes(utc_offset_minutes as i64)).date_naive()
}

/// Calculate session VWAP
///
/// cumulative(typical price × volume) / cumulative(volume), reset whenever the
/// session date changes. A session with no volume so far yields NaN.
pub fn calculate_vwap(bars: &[Bar], utc_offset_minutes: i32) -> Result<Vec<f64>> {
    if bars.is_empty() {
        return Err(ScanError::insufficient("vwap", 1, 0));
    }

    let mut vwap = Vec::with_capacity(bars.len());
    let mut cum_pv = 0.0;
    let mut cum_vol = 0.0;
    let mut current: Option<NaiveDate> = None;

    for bar in bars {
        let date = session_date(bar, utc_offset_minutes);
        if current != Some(date) {
            current = Some(date);
            cum_pv = 0.0;
            cum_vol = 0.0;
        }

        let volume = bar.volume as f64;
        cum_pv += bar.typical_price() * volume;
        cum_vol += volume;

        if cum_vol > 0.0 {
            vwap.push(cum_pv / cum_vol);
        } else {
            let err = ScanError::degenerate("vwap", format!("no volume in session {}", date));
            debug!(%err, "substituting NaN");
            vwap.push(f64::NAN);
        }
    }

    Ok(vwap)
}
