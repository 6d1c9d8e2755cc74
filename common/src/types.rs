use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

/// OHLCV bar data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// (high + low) / 2
    pub fn midpoint(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    pub fn is_green(&self) -> bool {
        self.close > self.open
    }

    /// Where the close sits inside the bar's range, 0.0 at the low and 1.0 at the high.
    /// `None` for a zero-range bar.
    pub fn close_position(&self) -> Option<f64> {
        let range = self.range();
        if range > 0.0 {
            Some((self.close - self.low) / range)
        } else {
            None
        }
    }
}

/// Strictly time-ordered bars for one instrument, immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    /// Validates ordering and prices. Duplicate or decreasing timestamps are rejected.
    pub fn new(bars: Vec<Bar>) -> Result<Self> {
        for (i, bar) in bars.iter().enumerate() {
            let prices = [bar.open, bar.high, bar.low, bar.close];
            if prices.iter().any(|p| !p.is_finite()) {
                return Err(ScanError::InvalidSeries(format!(
                    "non-finite price at bar {} ({})",
                    i, bar.timestamp
                )));
            }
            if bar.high < bar.low {
                return Err(ScanError::InvalidSeries(format!(
                    "high {:.4} below low {:.4} at {}",
                    bar.high, bar.low, bar.timestamp
                )));
            }
            if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
                return Err(ScanError::InvalidSeries(format!(
                    "timestamp {} is not after {}",
                    bar.timestamp,
                    bars[i - 1].timestamp
                )));
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// The bar before the last one.
    pub fn previous(&self) -> Option<&Bar> {
        self.bars.len().checked_sub(2).map(|i| &self.bars[i])
    }

    /// The last `n` bars (or all of them when shorter).
    pub fn tail(&self, n: usize) -> &[Bar] {
        &self.bars[self.bars.len().saturating_sub(n)..]
    }

    pub fn opens(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.open).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume as f64).collect()
    }
}

impl<'de> Deserialize<'de> for Series {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bars = Vec::<Bar>::deserialize(deserializer)?;
        Series::new(bars).map_err(serde::de::Error::custom)
    }
}

/// One entry of an [`IndicatorSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndicatorValue {
    /// Aligned with the series; warm-up and degenerate positions are NaN.
    Sequence { values: Vec<f64> },
    Scalar { value: f64 },
    /// Too little data, and the indicator has an agreed default.
    Defaulted {
        value: f64,
        required: usize,
        actual: usize,
    },
    /// Too little data and no agreed default.
    Unavailable { required: usize, actual: usize },
}

impl IndicatorValue {
    /// Value at the latest bar, or the documented default. A NaN latest bar
    /// is reported as missing, never as an older value.
    pub fn latest(&self) -> Option<f64> {
        match self {
            Self::Sequence { values } => values.last().copied().filter(|v| v.is_finite()),
            Self::Scalar { value } | Self::Defaulted { value, .. } => Some(*value),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Sequence { .. } | Self::Scalar { .. })
    }
}

/// Indicator name to value, recomputed per scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorSet {
    entries: BTreeMap<String, IndicatorValue>,
}

impl IndicatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: IndicatorValue) {
        self.entries.insert(name.to_string(), value);
    }

    pub fn insert_sequence(&mut self, name: &str, values: Vec<f64>) {
        self.insert(name, IndicatorValue::Sequence { values });
    }

    pub fn get(&self, name: &str) -> Option<&IndicatorValue> {
        self.entries.get(name)
    }

    /// The aligned sequence, when the indicator was computed.
    pub fn sequence(&self, name: &str) -> Option<&[f64]> {
        match self.entries.get(name) {
            Some(IndicatorValue::Sequence { values }) => Some(values),
            _ => None,
        }
    }

    pub fn latest(&self, name: &str) -> Option<f64> {
        self.entries.get(name).and_then(IndicatorValue::latest)
    }

    pub fn is_available(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .map(IndicatorValue::is_available)
            .unwrap_or(false)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Latest value per indicator; unavailable ones map to `None`.
    pub fn snapshot(&self) -> BTreeMap<String, Option<f64>> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.latest()))
            .collect()
    }
}

/// Category value used by signals that did not fire.
pub const NO_CATEGORY: &str = "NONE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SignalValue {
    Flag(bool),
    Category(String),
    /// The detector could not run; the reason names the missing input.
    Unavailable(String),
}

/// A named flag plus the values that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    pub value: SignalValue,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, f64>,
}

impl Signal {
    pub fn flag(name: &str, on: bool) -> Self {
        Self {
            name: name.to_string(),
            value: SignalValue::Flag(on),
            inputs: BTreeMap::new(),
        }
    }

    pub fn category(name: &str, category: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: SignalValue::Category(category.into()),
            inputs: BTreeMap::new(),
        }
    }

    pub fn unavailable(name: &str, reason: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: SignalValue::Unavailable(reason.into()),
            inputs: BTreeMap::new(),
        }
    }

    pub fn with_input(mut self, key: &str, value: f64) -> Self {
        self.inputs.insert(key.to_string(), value);
        self
    }

    /// A flag that is set, or a category other than [`NO_CATEGORY`].
    pub fn is_active(&self) -> bool {
        match &self.value {
            SignalValue::Flag(on) => *on,
            SignalValue::Category(c) => c != NO_CATEGORY,
            SignalValue::Unavailable(_) => false,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match &self.value {
            SignalValue::Category(c) => Some(c),
            _ => None,
        }
    }
}

/// Signals produced by one scan, in detection order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalSet {
    signals: Vec<Signal>,
}

impl SignalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    pub fn extend(&mut self, signals: impl IntoIterator<Item = Signal>) {
        self.signals.extend(signals);
    }

    pub fn get(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.name == name)
    }

    pub fn category(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Signal::as_category)
    }

    /// `name` matches an active signal; `name=VALUE` matches a category exactly.
    pub fn is_active(&self, requirement: &str) -> bool {
        match requirement.split_once('=') {
            Some((name, value)) => self.category(name) == Some(value),
            None => self.get(requirement).map(Signal::is_active).unwrap_or(false),
        }
    }

    pub fn active_names(&self) -> Vec<&str> {
        self.signals
            .iter()
            .filter(|s| s.is_active())
            .map(|s| s.name.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelKind {
    Support,
    Resistance,
    Pivot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelSource {
    PivotPoint,
    VolumeProfile,
}

/// A support/resistance level derived from one series snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub price: f64,
    pub kind: LevelKind,
    pub source: LevelSource,
    pub label: String,
    pub strength: f64,
    pub touches: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_touch: Option<DateTime<Utc>>,
}

/// A news item handed in by the data access layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub headline: String,
    #[serde(default)]
    pub summary: String,
}

/// Inputs that come from outside the bar series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    /// Tradable float in shares.
    #[serde(default)]
    pub float_shares: Option<f64>,
    /// Sector strength in [0, 1], aggregated by the caller.
    #[serde(default)]
    pub sector_momentum: Option<f64>,
    /// Most recent first.
    #[serde(default)]
    pub news: Vec<NewsItem>,
    #[serde(default)]
    pub previous_multiday_runs: u32,
}

impl MarketContext {
    pub fn with_float(mut self, shares: f64) -> Self {
        self.float_shares = Some(shares);
        self
    }

    pub fn with_sector_momentum(mut self, momentum: f64) -> Self {
        self.sector_momentum = Some(momentum);
        self
    }

    pub fn with_headline(mut self, headline: &str) -> Self {
        self.news.push(NewsItem {
            headline: headline.to_string(),
            summary: String::new(),
        });
        self
    }

    pub fn has_catalyst(&self) -> bool {
        !self.news.is_empty()
    }
}
