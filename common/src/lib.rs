pub mod config;
pub mod error;
pub mod names;
pub mod score;
pub mod types;

pub use config::ScanConfig;
pub use error::{Result, ScanError};
pub use score::*;
pub use types::*;
