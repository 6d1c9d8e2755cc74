use common::{Level, LevelKind, LevelSource, Result, ScanError, Series};
use serde::{Deserialize, Serialize};

/// Classic floor-trader pivots
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotPoints {
    pub pp: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

impl PivotPoints {
    pub fn from_hlc(high: f64, low: f64, close: f64) -> Self {
        let pp = (high + low + close) / 3.0;
        Self {
            pp,
            r1: 2.0 * pp - low,
            s1: 2.0 * pp - high,
            r2: pp + (high - low),
            s2: pp - (high - low),
            r3: high + 2.0 * (pp - low),
            s3: low - 2.0 * (high - pp),
        }
    }

    /// Pivots for the latest bar, built from the bar before it
    pub fn from_series(series: &Series) -> Result<Self> {
        let prev = series
            .previous()
            .ok_or_else(|| ScanError::insufficient("pivot_points", 2, series.len()))?;
        Ok(Self::from_hlc(prev.high, prev.low, prev.close))
    }

    pub fn levels(&self) -> Vec<Level> {
        [
            ("S3", self.s3, LevelKind::Support),
            ("S2", self.s2, LevelKind::Support),
            ("S1", self.s1, LevelKind::Support),
            ("PP", self.pp, LevelKind::Pivot),
            ("R1", self.r1, LevelKind::Resistance),
            ("R2", self.r2, LevelKind::Resistance),
            ("R3", self.r3, LevelKind::Resistance),
        ]
        .into_iter()
        .map(|(label, price, kind)| Level {
            price,
            kind,
            source: LevelSource::PivotPoint,
            label: label.to_string(),
            strength: 0.0,
            touches: 0,
            last_touch: None,
        })
        .collect()
    }
}
