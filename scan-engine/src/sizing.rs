use common::config::SizingConfig;
use common::{Result, ScanError};
use serde::{Deserialize, Serialize};

/// Shares to buy for a long entry with a stop below it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSize {
    pub shares: u64,
    pub entry: f64,
    pub stop: f64,
    pub risk_per_share: f64,
    pub position_value: f64,
    /// Position value over account, in percent
    pub position_percent: f64,
    pub risk_amount: f64,
    /// Risk amount over account, in percent
    pub risk_percent: f64,
    /// True when the position cap cut the share count
    pub capped: bool,
}

/// Risk `risk_fraction` of the account between entry and stop, with the
/// position value capped at `max_position_fraction` of the account.
pub fn calculate_position_size(account: f64, entry: f64, stop: f64, config: &SizingConfig) -> Result<PositionSize> {
    if !(account > 0.0 && entry > 0.0) {
        return Err(ScanError::InvalidParameter(format!(
            "account ({}) and entry ({}) must be positive",
            account, entry
        )));
    }
    let risk_per_share = entry - stop;
    if !(risk_per_share > 0.0) {
        return Err(ScanError::InvalidParameter(format!(
            "stop {:.4} must be below entry {:.4}",
            stop, entry
        )));
    }

    let by_risk = (account * config.risk_fraction / risk_per_share).floor();
    let by_cap = (account * config.max_position_fraction / entry).floor();
    let capped = by_risk > by_cap;
    let shares = by_risk.min(by_cap).max(0.0) as u64;

    let position_value = shares as f64 * entry;
    let risk_amount = shares as f64 * risk_per_share;
    Ok(PositionSize {
        shares,
        entry,
        stop,
        risk_per_share,
        position_value,
        position_percent: position_value / account * 100.0,
        risk_amount,
        risk_percent: risk_amount / account * 100.0,
        capped,
    })
}
