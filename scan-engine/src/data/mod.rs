pub mod loader;
pub mod synthetic;

pub use loader::{load_csv, load_json, parse_timestamp};
pub use synthetic::{generate_consolidation, generate_intraday, generate_random_walk, generate_runner};

use std::path::Path;

use common::{Result, ScanError, Series};

/// Load bars from file, detecting format from extension
pub fn load_file(path: &Path) -> Result<Series> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        _ => Err(ScanError::DataLoadError(format!(
            "Unsupported file format: {}",
            ext
        ))),
    }
}
