use common::config::{BreakoutWeights, ScoringConfig};
use common::ScoreBreakdown;

use super::card::ScoreCard;
use super::gates::evaluate_gates;
use super::synergy::apply_synergies;
use super::{ScoreEngine, ScoreInput};
use crate::patterns::{ChartPatternKind, ObvDivergence, VolumePattern};

pub const NARROW_RANGE: &str = "narrow_range";
pub const OBV: &str = "obv_divergence";
pub const SQUEEZE: &str = "squeeze";
pub const LEVEL_TEST: &str = "level_test";
pub const VOLUME: &str = "volume";
pub const PATTERN: &str = "chart_pattern";

/// Breakout probability, 0-100
pub struct BreakoutEngine {
    weights: BreakoutWeights,
    quality_floor: f64,
}

impl BreakoutEngine {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            weights: config.breakout.clone(),
            quality_floor: config.quality_floor,
        }
    }
}

impl ScoreEngine for BreakoutEngine {
    fn name(&self) -> &'static str {
        "breakout"
    }

    fn score(&self, input: &ScoreInput<'_>) -> ScoreBreakdown {
        let w = &self.weights;
        let p = input.patterns;
        let mut card = ScoreCard::new(self.name(), w.max_score);

        match &p.narrow_range {
            Some(nr) => {
                let points = if nr.nr7 == Some(true) {
                    w.nr7_points
                } else if nr.nr4 == Some(true) {
                    w.nr4_points
                } else {
                    0.0
                };
                card.add(NARROW_RANGE, points, w.nr_max);
            }
            None => card.unavailable(NARROW_RANGE, w.nr_max),
        }

        match &p.obv {
            Some(obv) => {
                let points = match obv.divergence {
                    ObvDivergence::Bullish | ObvDivergence::HiddenBullish => w.obv_bullish_points,
                    ObvDivergence::Bearish => w.obv_bearish_points,
                    ObvDivergence::None => 0.0,
                };
                card.add(OBV, points, w.obv_max);
            }
            None => card.unavailable(OBV, w.obv_max),
        }

        match &p.squeeze {
            Some(sq) => {
                let points = if sq.fired {
                    w.squeeze_fired_points
                } else if sq.on {
                    w.squeeze_on_points
                } else {
                    0.0
                };
                card.add(SQUEEZE, points, w.squeeze_max);
            }
            None => card.unavailable(SQUEEZE, w.squeeze_max),
        }

        if input.levels.supports.is_empty() && input.levels.resistances.is_empty() {
            card.unavailable(LEVEL_TEST, w.level_test_max);
        } else {
            let points = match &p.level_test {
                Some(t) if t.touches >= w.level_test_strong_touches => w.level_test_strong_points,
                Some(_) => w.level_test_points,
                None => 0.0,
            };
            card.add(LEVEL_TEST, points, w.level_test_max);
        }

        match &p.volume {
            Some(v) => {
                let points = if v.contraction || v.pattern == VolumePattern::Surge {
                    w.volume_points
                } else {
                    0.0
                };
                card.add(VOLUME, points, w.volume_max);
            }
            None => card.unavailable(VOLUME, w.volume_max),
        }

        match &p.chart {
            Some(c) if c.kind != ChartPatternKind::None => card.add(PATTERN, w.pattern_points, w.pattern_max),
            Some(_) => card.add(PATTERN, 0.0, w.pattern_max),
            None => card.unavailable(PATTERN, w.pattern_max),
        }

        let synergy = apply_synergies(&w.synergies, &p.signals, w.synergy_ceiling);
        let gates = evaluate_gates(&w.gates, &input.gate_inputs());
        card.finish(synergy, w.synergy_ceiling, self.quality_floor, gates, &w.grades)
    }
}
