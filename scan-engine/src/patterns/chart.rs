use common::config::PatternConfig;
use common::names::{indicators as keys, signals};
use common::{Direction, IndicatorSet, Result, ScanError, Series, Signal, NO_CATEGORY};
use serde::{Deserialize, Serialize};

use crate::indicators::linear_regression_slope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChartPatternKind {
    AscendingTriangle,
    DescendingTriangle,
    SymmetricalTriangle,
    BullFlag,
    BearFlag,
    None,
}

impl ChartPatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AscendingTriangle => "ASCENDING_TRIANGLE",
            Self::DescendingTriangle => "DESCENDING_TRIANGLE",
            Self::SymmetricalTriangle => "SYMMETRICAL_TRIANGLE",
            Self::BullFlag => "BULL_FLAG",
            Self::BearFlag => "BEAR_FLAG",
            Self::None => NO_CATEGORY,
        }
    }

    pub fn bias(&self) -> Direction {
        match self {
            Self::AscendingTriangle | Self::BullFlag => Direction::Bullish,
            Self::DescendingTriangle | Self::BearFlag => Direction::Bearish,
            Self::SymmetricalTriangle | Self::None => Direction::Neutral,
        }
    }

    fn is_triangle(&self) -> bool {
        matches!(
            self,
            Self::AscendingTriangle | Self::DescendingTriangle | Self::SymmetricalTriangle
        )
    }
}

/// Trendline geometry of the recent window, in ATR units so thresholds hold
/// across price scales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPattern {
    pub kind: ChartPatternKind,
    pub bias: Direction,
    /// Regression slope of the highs, ATR per bar
    pub high_slope_atr: f64,
    /// Regression slope of the lows, ATR per bar
    pub low_slope_atr: f64,
    /// Bars after the latest one until the triangle's trendlines meet
    pub apex_bars: Option<f64>,
    pub atr: f64,
}

impl ChartPattern {
    pub fn signal(&self) -> Signal {
        let mut signal = Signal::category(signals::CHART_PATTERN, self.kind.as_str())
            .with_input("high_slope_atr", self.high_slope_atr)
            .with_input("low_slope_atr", self.low_slope_atr);
        if let Some(apex) = self.apex_bars {
            signal = signal.with_input("apex_bars", apex);
        }
        signal
    }
}

pub fn detect_chart_pattern(series: &Series, indicators: &IndicatorSet, config: &PatternConfig) -> Result<ChartPattern> {
    let lookback = config.pattern_lookback;
    if series.len() < lookback {
        return Err(ScanError::insufficient("chart_pattern", lookback, series.len()));
    }
    let atr = indicators
        .latest(keys::ATR)
        .filter(|a| indicators.is_available(keys::ATR) && *a > 0.0)
        .ok_or_else(|| ScanError::degenerate("chart_pattern", "ATR unavailable or zero"))?;

    let recent = series.tail(lookback);
    let highs: Vec<f64> = recent.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = recent.iter().map(|b| b.low).collect();
    let high_slope = linear_regression_slope(&highs)
        .ok_or_else(|| ScanError::insufficient("chart_pattern", 2, lookback))?;
    let low_slope = linear_regression_slope(&lows)
        .ok_or_else(|| ScanError::insufficient("chart_pattern", 2, lookback))?;
    let hs = high_slope / atr;
    let ls = low_slope / atr;

    let mut kind = if hs.abs() < config.flat_slope_atr && ls > config.trend_slope_atr {
        ChartPatternKind::AscendingTriangle
    } else if hs < -config.trend_slope_atr && ls.abs() < config.flat_slope_atr {
        ChartPatternKind::DescendingTriangle
    } else if hs < -config.converging_slope_atr && ls > config.converging_slope_atr {
        ChartPatternKind::SymmetricalTriangle
    } else {
        ChartPatternKind::None
    };

    // Flag: a pole before the window, then a tight consolidation
    let closes = series.closes();
    let n = closes.len();
    if n >= lookback + config.flag_pole_bars {
        let pole_end = closes[n - lookback];
        let pole_start = closes[n - lookback - config.flag_pole_bars];
        let pole_atr = (pole_end - pole_start) / atr;
        let top = highs.iter().copied().fold(f64::MIN, f64::max);
        let bottom = lows.iter().copied().fold(f64::MAX, f64::min);
        let range_atr = (top - bottom) / atr;

        if range_atr <= config.flag_range_atr {
            if pole_atr >= config.flag_pole_atr {
                kind = ChartPatternKind::BullFlag;
            } else if pole_atr <= -config.flag_pole_atr {
                kind = ChartPatternKind::BearFlag;
            }
        }
    }

    let apex_bars = if kind.is_triangle() && high_slope != low_slope {
        // lines meet where highs[0] + hs·x = lows[0] + ls·x
        let x = (highs[0] - lows[0]) / (low_slope - high_slope);
        Some((x - (lookback - 1) as f64).max(0.0))
    } else {
        None
    };

    Ok(ChartPattern {
        kind,
        bias: kind.bias(),
        high_slope_atr: hs,
        low_slope_atr: ls,
        apex_bars,
        atr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use common::Bar;

    fn series_from(highs: &[f64], lows: &[f64]) -> Series {
        let start = Utc.with_ymd_and_hms(2024, 4, 1, 20, 0, 0).unwrap();
        let bars = highs
            .iter()
            .zip(lows)
            .enumerate()
            .map(|(i, (&h, &l))| {
                let mid = (h + l) / 2.0;
                Bar::new(start + Duration::days(i as i64), mid, h, l, mid, 1_000)
            })
            .collect();
        Series::new(bars).unwrap()
    }

    fn with_atr(atr: f64) -> IndicatorSet {
        let mut set = IndicatorSet::new();
        set.insert_sequence(keys::ATR, vec![atr]);
        set
    }

    #[test]
    fn test_ascending_triangle() {
        let highs = vec![12.0; 15];
        let lows: Vec<f64> = (0..15).map(|i| 8.0 + 0.25 * i as f64).collect();
        let series = series_from(&highs, &lows);

        let pattern = detect_chart_pattern(&series, &with_atr(1.0), &PatternConfig::default()).unwrap();
        assert_eq!(pattern.kind, ChartPatternKind::AscendingTriangle);
        assert_eq!(pattern.bias, Direction::Bullish);
        // lines meet at x = 4 / 0.25 = 16, two bars after the last one
        assert!((pattern.apex_bars.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_slopes_are_scale_free() {
        let highs: Vec<f64> = (0..15).map(|i| 12.0 - 0.2 * i as f64).collect();
        let lows: Vec<f64> = (0..15).map(|i| 8.0 + 0.2 * i as f64).collect();
        let cheap = detect_chart_pattern(&series_from(&highs, &lows), &with_atr(1.0), &PatternConfig::default()).unwrap();

        let highs_x100: Vec<f64> = highs.iter().map(|h| h * 100.0).collect();
        let lows_x100: Vec<f64> = lows.iter().map(|l| l * 100.0).collect();
        let pricey = detect_chart_pattern(&series_from(&highs_x100, &lows_x100), &with_atr(100.0), &PatternConfig::default())
            .unwrap();

        assert_eq!(cheap.kind, ChartPatternKind::SymmetricalTriangle);
        assert_eq!(pricey.kind, cheap.kind);
        assert!((cheap.high_slope_atr - pricey.high_slope_atr).abs() < 1e-9);
    }

    #[test]
    fn test_bull_flag() {
        // 10-bar pole of +1/bar, then 15 tight bars
        let mut highs: Vec<f64> = (0..11).map(|i| 10.5 + i as f64).collect();
        let mut lows: Vec<f64> = (0..11).map(|i| 9.5 + i as f64).collect();
        for i in 0..14 {
            let wiggle = if i % 2 == 0 { 0.2 } else { 0.0 };
            highs.push(20.6 + wiggle);
            lows.push(19.6 + wiggle);
        }
        let series = series_from(&highs, &lows);

        let pattern = detect_chart_pattern(&series, &with_atr(1.0), &PatternConfig::default()).unwrap();
        assert_eq!(pattern.kind, ChartPatternKind::BullFlag);
        assert_eq!(pattern.apex_bars, None);
    }

    #[test]
    fn test_zero_atr_is_error() {
        let series = series_from(&[1.0; 15], &[1.0; 15]);
        assert!(detect_chart_pattern(&series, &with_atr(0.0), &PatternConfig::default()).is_err());
    }
}
