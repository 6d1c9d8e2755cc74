use common::config::PatternConfig;
use common::names::{indicators as keys, signals};
use common::{IndicatorSet, Result, Series, Signal, NO_CATEGORY};
use serde::{Deserialize, Serialize};

use super::require;
use crate::indicators::{is_squeeze, linear_regression_endpoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SqueezeIntensity {
    Extreme,
    High,
    Moderate,
    Low,
}

impl SqueezeIntensity {
    /// Classify a Bollinger width / Keltner width ratio
    pub fn from_ratio(ratio: f64, config: &PatternConfig) -> Self {
        if ratio < config.squeeze_extreme_ratio {
            Self::Extreme
        } else if ratio < config.squeeze_high_ratio {
            Self::High
        } else if ratio < config.squeeze_moderate_ratio {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extreme => "EXTREME",
            Self::High => "HIGH",
            Self::Moderate => "MODERATE",
            Self::Low => "LOW",
        }
    }
}

/// TTM squeeze state at the latest bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqueezeState {
    pub on: bool,
    /// On at the previous bar, off now
    pub fired: bool,
    /// Consecutive bars in the current on/off state
    pub bars_in_state: usize,
    /// NaN when the Keltner width is zero
    pub width_ratio: f64,
    pub intensity: SqueezeIntensity,
    /// Linear-regression endpoint of close − Bollinger middle
    pub momentum: Option<f64>,
    pub momentum_rising: bool,
}

impl SqueezeState {
    pub fn signals(&self) -> Vec<Signal> {
        let intensity = if self.on {
            self.intensity.as_str()
        } else {
            NO_CATEGORY
        };
        let momentum = match self.momentum {
            Some(m) if m > 0.0 => "BULLISH",
            Some(m) if m < 0.0 => "BEARISH",
            _ => NO_CATEGORY,
        };
        vec![
            Signal::flag(signals::SQUEEZE_ON, self.on).with_input("bars", self.bars_in_state as f64),
            Signal::flag(signals::SQUEEZE_FIRED, self.fired),
            Signal::category(signals::SQUEEZE_INTENSITY, intensity).with_input("width_ratio", self.width_ratio),
            Signal::category(signals::SQUEEZE_MOMENTUM, momentum)
                .with_input("momentum", self.momentum.unwrap_or(f64::NAN)),
        ]
    }
}

fn momentum_at(closes: &[f64], middle: &[f64], end: usize, period: usize) -> Option<f64> {
    if end + 1 < period {
        return None;
    }
    let deltas: Vec<f64> = (end + 1 - period..=end).map(|i| closes[i] - middle[i]).collect();
    linear_regression_endpoint(&deltas)
}

pub fn detect_squeeze(series: &Series, indicators: &IndicatorSet, config: &PatternConfig) -> Result<SqueezeState> {
    let bb_upper = require(indicators, keys::BB_UPPER)?;
    let bb_middle = require(indicators, keys::BB_MIDDLE)?;
    let bb_lower = require(indicators, keys::BB_LOWER)?;
    let kc_upper = require(indicators, keys::KC_UPPER)?;
    let kc_lower = require(indicators, keys::KC_LOWER)?;
    let closes = series.closes();
    let last = closes.len() - 1;

    let state: Vec<bool> = (0..closes.len())
        .map(|i| is_squeeze(bb_upper[i], bb_lower[i], kc_upper[i], kc_lower[i]))
        .collect();
    let on = state[last];
    let fired = last > 0 && state[last - 1] && !on;
    let bars_in_state = state.iter().rev().take_while(|s| **s == on).count();

    let kc_width = kc_upper[last] - kc_lower[last];
    let width_ratio = if kc_width > 0.0 {
        (bb_upper[last] - bb_lower[last]) / kc_width
    } else {
        f64::NAN
    };

    let momentum = momentum_at(&closes, bb_middle, last, config.squeeze_momentum_period);
    let previous = last
        .checked_sub(1)
        .and_then(|p| momentum_at(&closes, bb_middle, p, config.squeeze_momentum_period));
    let momentum_rising = matches!((momentum, previous), (Some(m), Some(p)) if m > p);

    Ok(SqueezeState {
        on,
        fired,
        bars_in_state,
        width_ratio,
        intensity: SqueezeIntensity::from_ratio(width_ratio, config),
        momentum,
        momentum_rising,
    })
}
