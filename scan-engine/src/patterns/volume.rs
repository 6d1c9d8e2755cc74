use common::config::PatternConfig;
use common::names::{indicators as keys, signals};
use common::{IndicatorSet, Result, ScanError, Series, Signal};
use serde::{Deserialize, Serialize};

use super::require;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VolumePattern {
    Surge,
    Elevated,
    Contracting,
    Normal,
}

impl VolumePattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Surge => "SURGE",
            Self::Elevated => "ELEVATED",
            Self::Contracting => "CONTRACTING",
            Self::Normal => "NORMAL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeAnalysis {
    pub current: f64,
    /// Average of the bars before the latest one
    pub trailing_average: f64,
    /// current / trailing_average, NaN when the average is zero
    pub relative_volume: f64,
    pub short_average: f64,
    pub long_average: f64,
    pub short_declining: bool,
    pub contraction: bool,
    pub pattern: VolumePattern,
}

impl VolumeAnalysis {
    pub fn is_surge(&self, config: &PatternConfig) -> bool {
        self.relative_volume >= config.volume_surge_ratio
    }

    pub fn signals(&self, config: &PatternConfig) -> Vec<Signal> {
        vec![
            Signal::flag(signals::VOLUME_CONTRACTION, self.contraction)
                .with_input("short_average", self.short_average)
                .with_input("long_average", self.long_average),
            Signal::category(signals::VOLUME_PATTERN, self.pattern.as_str()),
            Signal::flag(signals::VOLUME_SURGE, self.is_surge(config))
                .with_input("relative_volume", self.relative_volume),
        ]
    }
}

/// Current volume over the mean of the `period` bars before it
pub fn relative_volume(volumes: &[f64], period: usize) -> Result<(f64, f64)> {
    let n = volumes.len();
    if period == 0 || n < period + 1 {
        return Err(ScanError::insufficient("relative_volume", period + 1, n));
    }
    let trailing = &volumes[n - 1 - period..n - 1];
    let average = trailing.iter().sum::<f64>() / period as f64;
    let current = volumes[n - 1];
    let ratio = if average > 0.0 { current / average } else { f64::NAN };
    Ok((average, ratio))
}

/// Short average falling over `trend_window` bars and below `ratio` × long average
pub fn is_volume_contraction(short_sma: &[f64], long_latest: f64, trend_window: usize, ratio: f64) -> bool {
    let n = short_sma.len();
    if n <= trend_window {
        return false;
    }
    let latest = short_sma[n - 1];
    let earlier = short_sma[n - 1 - trend_window];
    latest < earlier && latest < ratio * long_latest
}

pub fn analyze_volume(series: &Series, indicators: &IndicatorSet, config: &PatternConfig) -> Result<VolumeAnalysis> {
    let short_sma = require(indicators, keys::VOLUME_SMA_SHORT)?;
    let long_sma = require(indicators, keys::VOLUME_SMA_LONG)?;
    let volumes = series.volumes();
    let (trailing_average, relative) = relative_volume(&volumes, config.relative_volume_period)?;

    let last = volumes.len() - 1;
    let short_average = short_sma[last];
    let long_average = long_sma[last];
    let short_declining = last >= config.volume_trend_window
        && short_average < short_sma[last - config.volume_trend_window];
    let contraction = is_volume_contraction(
        short_sma,
        long_average,
        config.volume_trend_window,
        config.volume_contraction_ratio,
    );

    let pattern = if relative >= config.volume_surge_ratio {
        VolumePattern::Surge
    } else if relative >= config.volume_elevated_ratio {
        VolumePattern::Elevated
    } else if contraction {
        VolumePattern::Contracting
    } else {
        VolumePattern::Normal
    };

    Ok(VolumeAnalysis {
        current: volumes[last],
        trailing_average,
        relative_volume: relative,
        short_average,
        long_average,
        short_declining,
        contraction,
        pattern,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{generate_consolidation, generate_runner};
    use crate::indicators::compute_indicators;
    use common::config::IndicatorConfig;

    fn analyze(bars: Vec<common::Bar>) -> VolumeAnalysis {
        let series = Series::new(bars).unwrap();
        let indicators = compute_indicators(&series, &IndicatorConfig::default()).unwrap();
        analyze_volume(&series, &indicators, &PatternConfig::default()).unwrap()
    }

    #[test]
    fn test_relative_volume_excludes_current_bar() {
        let volumes = vec![100.0, 100.0, 100.0, 400.0];
        let (avg, ratio) = relative_volume(&volumes, 3).unwrap();
        assert_eq!(avg, 100.0);
        assert_eq!(ratio, 4.0);
        assert!(relative_volume(&volumes, 4).is_err());
        assert!(relative_volume(&[0.0, 0.0, 5.0], 2).unwrap().1.is_nan());
    }

    #[test]
    fn test_contraction_needs_decline_and_ratio() {
        let short = vec![100.0, 95.0, 90.0, 85.0, 80.0, 70.0];
        assert!(is_volume_contraction(&short, 100.0, 5, 0.8));
        // below the long average but not declining
        let flat = vec![70.0; 6];
        assert!(!is_volume_contraction(&flat, 100.0, 5, 0.8));
        // declining but not far enough below
        assert!(!is_volume_contraction(&short, 80.0, 5, 0.8));
    }

    #[test]
    fn test_consolidation_is_contracting() {
        let analysis = analyze(generate_consolidation(40, 20, 15.0, 4));
        assert!(analysis.short_declining);
        assert!(analysis.contraction);
        assert_eq!(analysis.pattern, VolumePattern::Contracting);
    }

    #[test]
    fn test_runner_day_is_surge() {
        let analysis = analyze(generate_runner(30, 4.0, 5.0, 2));
        assert_eq!(analysis.pattern, VolumePattern::Surge);
        assert!(analysis.relative_volume >= 4.9);
        assert!(analysis.is_surge(&PatternConfig::default()));
    }
}
