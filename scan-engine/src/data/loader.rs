use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use common::{Bar, Result, ScanError, Series};
use tracing::debug;

fn parse_field<T: std::str::FromStr>(value: &str, field: &str, line: usize) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ScanError::CsvError(format!("Invalid {} on line {}: {:?}", field, line, value)))
}

/// Load bars from CSV file
///
/// Expected columns: timestamp, open, high, low, close, volume. Extra columns
/// are ignored, short rows are skipped.
pub fn load_csv(path: &Path) -> Result<Series> {
    let file = File::open(path).map_err(|e| ScanError::DataLoadError(e.to_string()))?;
    let reader = BufReader::new(file);
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut bars = Vec::new();
    let mut skipped = 0usize;

    for (i, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| ScanError::CsvError(e.to_string()))?;
        let line = i + 2;

        if record.len() < 6 {
            skipped += 1;
            continue;
        }

        bars.push(Bar {
            timestamp: parse_timestamp(&record[0])?,
            open: parse_field(&record[1], "open", line)?,
            high: parse_field(&record[2], "high", line)?,
            low: parse_field(&record[3], "low", line)?,
            close: parse_field(&record[4], "close", line)?,
            volume: parse_field(&record[5], "volume", line)?,
        });
    }

    if skipped > 0 {
        debug!(path = %path.display(), skipped, "skipped short CSV rows");
    }

    Series::new(bars)
}

/// Load bars from JSON file (an array of bars)
pub fn load_json(path: &Path) -> Result<Series> {
    let file = File::open(path).map_err(|e| ScanError::DataLoadError(e.to_string()))?;
    let reader = BufReader::new(file);
    let bars: Vec<Bar> = serde_json::from_reader(reader)?;
    Series::new(bars)
}

/// Parse timestamp from various formats
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];
    for fmt in &datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&dt));
        }
    }

    for fmt in &["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
        }
    }

    // Unix timestamp (seconds)
    if let Ok(ts) = s.parse::<i64>() {
        if let Some(dt) = DateTime::from_timestamp(ts, 0) {
            return Ok(dt);
        }
    }

    Err(ScanError::CsvError(format!("Unable to parse timestamp: {}", s)))
}
