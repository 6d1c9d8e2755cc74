use common::config::{OracleWeights, ScoringConfig};
use common::ScoreBreakdown;
use tracing::debug;

use super::card::ScoreCard;
use super::catalyst::score_news;
use super::gates::evaluate_gates;
use super::synergy::apply_synergies;
use super::{ScoreEngine, ScoreInput};

pub const FLOAT: &str = "float";
pub const VOLUME: &str = "volume";
pub const NEWS: &str = "news";
pub const SECTOR: &str = "sector";
pub const CHART: &str = "chart";
pub const RISK_REWARD: &str = "risk_reward";

/// Oracle methodology, 0-165
pub struct OracleEngine {
    weights: OracleWeights,
    quality_floor: f64,
}

impl OracleEngine {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            weights: config.oracle.clone(),
            quality_floor: config.quality_floor,
        }
    }

    fn chart_points(&self, input: &ScoreInput<'_>) -> Option<f64> {
        let w = &self.weights;
        let bar = input.series.last()?;
        let mut points = bar
            .close_position()
            .map(|p| w.close_position_tiers.points(p))
            .unwrap_or(0.0);
        if input.context.previous_multiday_runs > 0 {
            points += w.previous_runs_points;
        }
        if input.levels.is_clean_above(bar.close, w.clean_chart_min_distance_pct) {
            points += w.clean_chart_points;
        }
        Some(points)
    }
}

impl ScoreEngine for OracleEngine {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn score(&self, input: &ScoreInput<'_>) -> ScoreBreakdown {
        let w = &self.weights;
        let mut card = ScoreCard::new(self.name(), w.max_score);

        match input.context.float_shares.filter(|f| *f > 0.0) {
            Some(shares) => card.add(FLOAT, w.float_tiers.points(shares), w.float_max),
            None => card.unavailable(FLOAT, w.float_max),
        }

        let relative_volume = input
            .patterns
            .volume
            .as_ref()
            .map(|v| v.relative_volume)
            .filter(|v| v.is_finite());
        match relative_volume {
            Some(rv) => card.add(VOLUME, w.volume_tiers.points(rv), w.volume_max),
            None => card.unavailable(VOLUME, w.volume_max),
        }

        let news = score_news(&input.context.news, &w.news_keywords, w.news_items_considered, w.news_max);
        card.add(NEWS, news.points, w.news_max);

        match input.context.sector_momentum {
            Some(m) => card.add(SECTOR, w.sector_tiers.points(m), w.sector_max),
            None => card.unavailable(SECTOR, w.sector_max),
        }

        match self.chart_points(input) {
            Some(points) => card.add(CHART, points, w.chart_max),
            None => card.unavailable(CHART, w.chart_max),
        }

        match input.levels.risk_reward.and_then(|rr| rr.ratio) {
            Some(ratio) => card.add(RISK_REWARD, w.risk_reward_tiers.points(ratio), w.risk_reward_max),
            None => card.unavailable(RISK_REWARD, w.risk_reward_max),
        }

        let synergy = apply_synergies(&w.synergies, &input.patterns.signals, w.synergy_ceiling);
        let gates = evaluate_gates(&w.gates, &input.gate_inputs());
        debug!(
            subtotal = card.subtotal(),
            synergy = synergy.points,
            matched_news = ?news.matched,
            "oracle categories scored"
        );
        card.finish(synergy, w.synergy_ceiling, self.quality_floor, gates, &w.grades)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::{LevelSet, RiskReward};
    use crate::patterns::{PatternReport, VolumeAnalysis, VolumePattern};
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};
    use common::names::signals;
    use common::{Bar, GateStatus, MarketContext, Series, Signal};

    fn strong_setup(ratio_target: f64) -> (Series, PatternReport, LevelSet, MarketContext) {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap();
        let series = Series::new(vec![Bar::new(ts, 10.0, 12.0, 9.8, 12.0, 9_000_000)]).unwrap();

        let mut report = PatternReport {
            volume: Some(VolumeAnalysis {
                current: 9_000_000.0,
                trailing_average: 1_000_000.0,
                relative_volume: 9.0,
                short_average: 2_000_000.0,
                long_average: 1_000_000.0,
                short_declining: false,
                contraction: false,
                pattern: VolumePattern::Surge,
            }),
            ..Default::default()
        };
        for name in [
            signals::MULTIDAY_RUNNER,
            signals::NEWS_CATALYST,
            signals::LOW_FLOAT,
            signals::VOLUME_SURGE,
            signals::SQUEEZE_FIRED,
            signals::RED_TO_GREEN,
        ] {
            report.signals.push(Signal::flag(name, true));
        }

        let levels = LevelSet {
            risk_reward: Some(RiskReward::new(12.0, Some(11.0), Some(12.0 + ratio_target))),
            ..Default::default()
        };
        let context = MarketContext {
            previous_multiday_runs: 2,
            ..Default::default()
        }
        .with_float(3_000_000.0)
        .with_sector_momentum(0.95)
        .with_headline("FDA approval for lead candidate");
        (series, report, levels, context)
    }

    fn score(engine: &OracleEngine, setup: &(Series, PatternReport, LevelSet, MarketContext)) -> ScoreBreakdown {
        engine.score(&ScoreInput {
            series: &setup.0,
            patterns: &setup.1,
            levels: &setup.2,
            context: &setup.3,
        })
    }

    #[test]
    fn test_total_clamped_with_every_bonus() {
        let engine = OracleEngine::new(&ScoringConfig::default());
        let breakdown = score(&engine, &strong_setup(15.0));

        assert_eq!(breakdown.applied_bonuses.len(), 4);
        assert_relative_eq!(breakdown.synergy_points, 15.0);
        assert_relative_eq!(breakdown.raw_total, 180.0);
        assert_relative_eq!(breakdown.total, 165.0);
        assert!(breakdown.total <= breakdown.max_score);
        assert_eq!(breakdown.grade, "A+");
        assert!(!breakdown.disqualified);
    }

    #[test]
    fn test_failed_gate_keeps_numeric_score() {
        let setup = strong_setup(4.0);
        let gated = score(&OracleEngine::new(&ScoringConfig::default()), &setup);

        let mut ungated_config = ScoringConfig::default();
        ungated_config.oracle.gates.clear();
        let ungated = score(&OracleEngine::new(&ungated_config), &setup);

        assert!(gated.disqualified);
        assert_eq!(gated.failed_gates(), vec!["min_risk_reward"]);
        assert!(!ungated.disqualified);
        assert_relative_eq!(gated.total, ungated.total);
        // risk/reward 4 earns the 3x tier
        assert_relative_eq!(gated.category(RISK_REWARD).map(|c| c.earned).unwrap_or(0.0), 15.0);
    }

    #[test]
    fn test_missing_float_is_unavailable_and_disqualifying() {
        let mut setup = strong_setup(15.0);
        setup.3.float_shares = None;
        let breakdown = score(&OracleEngine::new(&ScoringConfig::default()), &setup);

        let float_gate = breakdown.gates.iter().find(|g| g.name == "max_float");
        assert_eq!(float_gate.map(|g| g.status), Some(GateStatus::Unavailable));
        assert!(breakdown.disqualified);
        assert_eq!(breakdown.failed_gates(), vec!["max_float"]);
        assert!(!breakdown.category(FLOAT).map(|c| c.available).unwrap_or(true));
        // five of six categories available
        assert_relative_eq!(breakdown.quality_multiplier, 0.8 + 0.2 * 5.0 / 6.0, epsilon = 1e-12);
    }
}
