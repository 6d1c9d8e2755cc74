pub mod pivot;
pub mod volume_profile;

pub use pivot::PivotPoints;
pub use volume_profile::{level_strength, strength_label, volume_levels, volume_profile, PriceBin};

use common::config::LevelConfig;
use common::names::indicators as keys;
use common::{IndicatorSet, Level, Series};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Entry at the last close, stop at the nearest support, target at the nearest resistance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskReward {
    pub entry: f64,
    pub stop: Option<f64>,
    pub target: Option<f64>,
    pub risk: Option<f64>,
    pub reward: Option<f64>,
    /// Absent when either side is missing or the risk is not positive
    pub ratio: Option<f64>,
}

impl RiskReward {
    pub fn new(entry: f64, stop: Option<f64>, target: Option<f64>) -> Self {
        let risk = stop.map(|s| entry - s);
        let reward = target.map(|t| t - entry);
        let ratio = match (risk, reward) {
            (Some(r), Some(w)) if r > 0.0 => Some(w / r),
            _ => None,
        };
        Self {
            entry,
            stop,
            target,
            risk,
            reward,
            ratio,
        }
    }
}

/// Every level derived from one series snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelSet {
    pub pivots: Option<PivotPoints>,
    /// Volume-weighted levels, strongest first
    pub volume_levels: Vec<Level>,
    /// Levels below the last close, nearest first
    pub supports: Vec<Level>,
    /// Levels above the last close, nearest first
    pub resistances: Vec<Level>,
    pub session_vwap: Option<f64>,
    pub risk_reward: Option<RiskReward>,
}

impl LevelSet {
    pub fn nearest_support(&self) -> Option<&Level> {
        self.supports.first()
    }

    pub fn nearest_resistance(&self) -> Option<&Level> {
        self.resistances.first()
    }

    /// Pivot and volume levels together
    pub fn all_levels(&self) -> Vec<Level> {
        let mut levels = self.pivots.map(|p| p.levels()).unwrap_or_default();
        levels.extend(self.volume_levels.iter().cloned());
        levels
    }

    /// True when no resistance sits within `pct` above `price`
    pub fn is_clean_above(&self, price: f64, pct: f64) -> bool {
        self.resistances
            .iter()
            .all(|l| l.price > price * (1.0 + pct))
    }
}

/// Support/resistance calculator
pub struct LevelCalculator {
    config: LevelConfig,
}

impl LevelCalculator {
    pub fn new(config: &LevelConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn calculate(&self, series: &Series, indicators: &IndicatorSet) -> LevelSet {
        let Some(last) = series.last() else {
            return LevelSet::default();
        };
        let price = last.close;

        let pivots = match PivotPoints::from_series(series) {
            Ok(p) => Some(p),
            Err(e) => {
                debug!(error = %e, "pivot points unavailable");
                None
            }
        };

        let volume = match volume_levels(series.bars(), &self.config, price) {
            Ok(levels) => levels,
            Err(e) => {
                warn!(error = %e, "volume-weighted levels unavailable");
                Vec::new()
            }
        };

        let mut set = LevelSet {
            pivots,
            volume_levels: volume,
            session_vwap: indicators.latest(keys::VWAP),
            ..Default::default()
        };

        let all = set.all_levels();
        let mut supports: Vec<Level> = all.iter().filter(|l| l.price < price).cloned().collect();
        let mut resistances: Vec<Level> = all.into_iter().filter(|l| l.price > price).collect();
        supports.sort_by(|a, b| b.price.total_cmp(&a.price));
        resistances.sort_by(|a, b| a.price.total_cmp(&b.price));
        supports.truncate(self.config.max_levels);
        resistances.truncate(self.config.max_levels);

        set.risk_reward = Some(RiskReward::new(
            price,
            supports.first().map(|l| l.price),
            resistances.first().map(|l| l.price),
        ));
        set.supports = supports;
        set.resistances = resistances;

        debug!(
            supports = set.supports.len(),
            resistances = set.resistances.len(),
            volume_levels = set.volume_levels.len(),
            "levels calculated"
        );
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use common::{Bar, LevelKind};

    #[test]
    fn test_risk_reward() {
        let rr = RiskReward::new(10.0, Some(9.0), Some(15.0));
        assert_eq!(rr.risk, Some(1.0));
        assert_eq!(rr.reward, Some(5.0));
        assert_relative_eq!(rr.ratio.unwrap(), 5.0);

        assert_eq!(RiskReward::new(10.0, Some(10.0), Some(15.0)).ratio, None);
        assert_eq!(RiskReward::new(10.0, None, Some(15.0)).ratio, None);
    }

    #[test]
    fn test_calculate_orders_levels_by_distance() {
        let series = Series::new(crate::data::generate_random_walk(80, 40.0, 2)).unwrap();
        let indicators = crate::indicators::compute_indicators(&series, &Default::default()).unwrap();
        let set = LevelCalculator::new(&LevelConfig::default()).calculate(&series, &indicators);
        let price = series.last().unwrap().close;

        assert!(set.pivots.is_some());
        assert!(set.supports.windows(2).all(|w| w[0].price >= w[1].price));
        assert!(set.resistances.windows(2).all(|w| w[0].price <= w[1].price));
        assert!(set.supports.iter().all(|l| l.price < price));
        assert!(set.resistances.iter().all(|l| l.price > price));
        assert!(set.session_vwap.is_some());
    }

    #[test]
    fn test_session_without_volume_has_no_vwap() {
        let mut bars = crate::data::generate_random_walk(60, 40.0, 5);
        if let Some(last) = bars.last_mut() {
            last.volume = 0;
        }
        let series = Series::new(bars).unwrap();
        let indicators = crate::indicators::compute_indicators(&series, &Default::default()).unwrap();
        let set = LevelCalculator::new(&LevelConfig::default()).calculate(&series, &indicators);

        // the prior session's VWAP is finite but must not leak into today
        let vwap = indicators.sequence(keys::VWAP).unwrap();
        assert!(vwap[vwap.len() - 2].is_finite());
        assert_eq!(set.session_vwap, None);
    }

    #[test]
    fn test_single_bar_series() {
        let series = Series::new(vec![Bar::new(chrono::Utc::now(), 5.0, 5.5, 4.5, 5.0, 100)]).unwrap();
        let set = LevelCalculator::new(&LevelConfig::default()).calculate(&series, &IndicatorSet::new());
        assert!(set.pivots.is_none());
        assert!(set.volume_levels.is_empty());
        assert_eq!(set.risk_reward.and_then(|r| r.ratio), None);
    }

    #[test]
    fn test_clean_chart() {
        let set = LevelSet {
            resistances: vec![Level {
                price: 10.5,
                kind: LevelKind::Resistance,
                source: common::LevelSource::PivotPoint,
                label: "R1".to_string(),
                strength: 0.0,
                touches: 0,
                last_touch: None,
            }],
            ..Default::default()
        };
        assert!(!set.is_clean_above(10.0, 0.10));
        assert!(set.is_clean_above(9.0, 0.10));
    }
}
