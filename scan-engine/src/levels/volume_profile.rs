use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use common::config::{BinWidth, LevelConfig};
use common::{Bar, Level, LevelKind, LevelSource, Result, ScanError};
use serde::{Deserialize, Serialize};

/// One price bucket of the volume profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBin {
    pub lower: f64,
    pub upper: f64,
    pub center: f64,
    pub volume: f64,
    pub touches: u32,
    pub last_touch: Option<DateTime<Utc>>,
    pub days_since_touch: f64,
    pub strength: f64,
}

/// volume × touches × exp(−decay_rate × days_since_touch)
pub fn level_strength(volume: f64, touches: u32, days_since_touch: f64, decay_rate: f64) -> f64 {
    volume * touches as f64 * (-decay_rate * days_since_touch.max(0.0)).exp()
}

fn bin_index(price: f64, base: f64, width: BinWidth) -> i64 {
    match width {
        BinWidth::Fixed(w) => ((price - base) / w).floor() as i64,
        BinWidth::Percent(p) => ((price / base).ln() / (1.0 + p).ln()).floor() as i64,
    }
}

fn bin_bounds(index: i64, base: f64, width: BinWidth) -> (f64, f64) {
    match width {
        BinWidth::Fixed(w) => {
            let lower = base + index as f64 * w;
            (lower, lower + w)
        }
        BinWidth::Percent(p) => {
            let lower = base * (1.0 + p).powi(index as i32);
            (lower, lower * (1.0 + p))
        }
    }
}

/// Volume profile over the trailing `config.lookback` bars
///
/// Closes are bucketed into bins, each bin collects the volume of its closes
/// and counts the closes lying within `touch_tolerance_pct` of its center.
/// Days since the last touch come from the bars' own timestamps.
pub fn volume_profile(bars: &[Bar], config: &LevelConfig) -> Result<Vec<PriceBin>> {
    if bars.len() < 2 {
        return Err(ScanError::insufficient("volume_profile", 2, bars.len()));
    }
    let window = &bars[bars.len().saturating_sub(config.lookback)..];
    let as_of = window[window.len() - 1].timestamp;

    let base = window.iter().map(|b| b.close).fold(f64::INFINITY, f64::min);
    if base <= 0.0 && matches!(config.bin_width, BinWidth::Percent(_)) {
        return Err(ScanError::InvalidSeries(
            "percentage bins need positive closes".to_string(),
        ));
    }

    let mut volumes: BTreeMap<i64, f64> = BTreeMap::new();
    for bar in window {
        *volumes
            .entry(bin_index(bar.close, base, config.bin_width))
            .or_insert(0.0) += bar.volume as f64;
    }

    let bins = volumes
        .into_iter()
        .map(|(index, volume)| {
            let (lower, upper) = bin_bounds(index, base, config.bin_width);
            let center = (lower + upper) / 2.0;
            let tolerance = center * config.touch_tolerance_pct;

            let mut touches = 0u32;
            let mut last_touch = None;
            for bar in window.iter().filter(|b| (b.close - center).abs() <= tolerance) {
                touches += 1;
                last_touch = Some(bar.timestamp);
            }

            let days_since_touch = last_touch
                .map(|t| (as_of - t).num_seconds() as f64 / 86_400.0)
                .unwrap_or(f64::INFINITY);
            let strength = if touches > 0 {
                level_strength(volume, touches, days_since_touch, config.decay_rate)
            } else {
                0.0
            };

            PriceBin {
                lower,
                upper,
                center,
                volume,
                touches,
                last_touch,
                days_since_touch,
                strength,
            }
        })
        .collect();

    Ok(bins)
}

/// Strength label relative to the strongest level
pub fn strength_label(strength: f64, strongest: f64, config: &LevelConfig) -> &'static str {
    let ratio = if strongest > 0.0 { strength / strongest } else { 0.0 };
    if ratio >= config.very_strong_ratio {
        "Very Strong"
    } else if ratio >= config.strong_ratio {
        "Strong"
    } else if ratio >= config.moderate_ratio {
        "Moderate"
    } else {
        "Weak"
    }
}

/// Strongest volume-weighted levels, classified against `reference_price`
pub fn volume_levels(bars: &[Bar], config: &LevelConfig, reference_price: f64) -> Result<Vec<Level>> {
    let mut bins: Vec<PriceBin> = volume_profile(bars, config)?
        .into_iter()
        .filter(|b| b.touches >= config.min_touches)
        .collect();

    bins.sort_by(|a, b| {
        b.strength
            .total_cmp(&a.strength)
            .then_with(|| a.center.total_cmp(&b.center))
    });
    bins.truncate(config.max_levels);

    let strongest = bins.first().map(|b| b.strength).unwrap_or(0.0);
    Ok(bins
        .into_iter()
        .map(|bin| Level {
            price: bin.center,
            kind: if bin.center > reference_price {
                LevelKind::Resistance
            } else {
                LevelKind::Support
            },
            source: LevelSource::VolumeProfile,
            label: strength_label(bin.strength, strongest, config).to_string(),
            strength: bin.strength,
            touches: bin.touches,
            last_touch: bin.last_touch,
        })
        .collect())
}
