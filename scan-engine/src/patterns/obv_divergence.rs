use common::config::PatternConfig;
use common::names::{indicators as keys, signals};
use common::{IndicatorSet, Result, ScanError, Series, Signal, NO_CATEGORY};
use serde::{Deserialize, Serialize};

use super::require;
use crate::indicators::{linear_regression_slope, normalized_obv_slope};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObvDivergence {
    Bullish,
    Bearish,
    HiddenBullish,
    None,
}

impl ObvDivergence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bullish => "BULLISH",
            Self::Bearish => "BEARISH",
            Self::HiddenBullish => "HIDDEN_BULLISH",
            Self::None => NO_CATEGORY,
        }
    }

    pub fn is_bullish(&self) -> bool {
        matches!(self, Self::Bullish | Self::HiddenBullish)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObvAnalysis {
    pub divergence: ObvDivergence,
    /// Price slope in percent of the window's mean close per bar
    pub price_slope_pct: f64,
    /// OBV slope in units of the window's mean absolute OBV change
    pub obv_slope: f64,
    /// 0-100
    pub strength: f64,
}

impl ObvAnalysis {
    pub fn signal(&self) -> Signal {
        Signal::category(signals::OBV_DIVERGENCE, self.divergence.as_str())
            .with_input("price_slope_pct", self.price_slope_pct)
            .with_input("obv_slope", self.obv_slope)
            .with_input("strength", self.strength)
    }
}

fn rolling_min_at(values: &[f64], end: usize, window: usize) -> f64 {
    values[end + 1 - window.min(end + 1)..=end]
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min)
}

/// Lower price lows paired with higher OBV lows across the window
fn hidden_bullish(lows: &[f64], obv: &[f64], window: usize) -> bool {
    let n = lows.len().min(obv.len());
    if window == 0 || n < 2 * window {
        return false;
    }
    let now = n - 1;
    let earlier = n - 1 - window;
    rolling_min_at(lows, now, window) < rolling_min_at(lows, earlier, window)
        && rolling_min_at(obv, now, window) > rolling_min_at(obv, earlier, window)
}

pub fn detect_obv_divergence(series: &Series, indicators: &IndicatorSet, config: &PatternConfig) -> Result<ObvAnalysis> {
    let obv = require(indicators, keys::OBV)?;
    let lookback = config.obv_lookback;
    if obv.len() < lookback {
        return Err(ScanError::insufficient("obv_divergence", lookback, obv.len()));
    }

    let closes = series.closes();
    let recent = &closes[closes.len() - lookback..];
    let mean_price = recent.iter().sum::<f64>() / lookback as f64;
    let price_slope = linear_regression_slope(recent)
        .ok_or_else(|| ScanError::insufficient("obv_divergence", 2, lookback))?;
    let price_slope_pct = if mean_price > 0.0 {
        price_slope / mean_price * 100.0
    } else {
        0.0
    };
    let obv_slope = normalized_obv_slope(obv, lookback)
        .ok_or_else(|| ScanError::insufficient("obv_divergence", 2, lookback))?;

    let flat = config.obv_price_flat_pct;
    let threshold = config.obv_slope_threshold;
    let gap = (obv_slope - price_slope_pct).abs();

    // hidden accumulation outranks the slope comparison
    let (divergence, strength) = if hidden_bullish(&series.lows(), obv, config.obv_hidden_window) {
        (ObvDivergence::HiddenBullish, 80.0)
    } else if price_slope_pct < flat && obv_slope > threshold {
        (ObvDivergence::Bullish, (gap * 100.0).min(100.0))
    } else if price_slope_pct > -flat && obv_slope < -threshold {
        (ObvDivergence::Bearish, (gap * 100.0).min(100.0))
    } else {
        (ObvDivergence::None, 0.0)
    };

    Ok(ObvAnalysis {
        divergence,
        price_slope_pct,
        obv_slope,
        strength,
    })
}
