use std::collections::BTreeMap;

use common::config::GradeBand;
use common::{CategoryScore, GateResult, ScoreBreakdown};

use super::grade::grade_for;
use super::synergy::SynergyOutcome;

/// Collects bounded category scores for one engine run.
///
/// Each category is clamped to its own maximum as it is added and synergy is
/// bounded by its own ceiling. The quality multiplier applies to the sum, and
/// the total is clamped to the engine scale once, in [`ScoreCard::finish`].
#[derive(Debug, Clone)]
pub struct ScoreCard {
    engine: String,
    max_score: f64,
    categories: BTreeMap<String, CategoryScore>,
}

impl ScoreCard {
    pub fn new(engine: &str, max_score: f64) -> Self {
        Self {
            engine: engine.to_string(),
            max_score,
            categories: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, name: &str, earned: f64, max: f64) {
        let earned = if earned.is_finite() { earned.clamp(0.0, max) } else { 0.0 };
        self.categories.insert(
            name.to_string(),
            CategoryScore {
                earned,
                max,
                available: true,
            },
        );
    }

    /// Category whose input was missing; scores zero
    pub fn unavailable(&mut self, name: &str, max: f64) {
        self.categories.insert(
            name.to_string(),
            CategoryScore {
                earned: 0.0,
                max,
                available: false,
            },
        );
    }

    pub fn subtotal(&self) -> f64 {
        self.categories.values().map(|c| c.earned).sum()
    }

    /// Share of categories that had their inputs, 1.0 for an empty card
    pub fn available_fraction(&self) -> f64 {
        if self.categories.is_empty() {
            return 1.0;
        }
        let available = self.categories.values().filter(|c| c.available).count();
        available as f64 / self.categories.len() as f64
    }

    pub fn finish(
        self,
        synergy: SynergyOutcome,
        synergy_ceiling: f64,
        quality_floor: f64,
        gates: Vec<GateResult>,
        grades: &[GradeBand],
    ) -> ScoreBreakdown {
        let synergy_points = synergy.points.clamp(0.0, synergy_ceiling.max(0.0));
        let raw_total = self.subtotal() + synergy_points;
        let quality_multiplier = quality_floor + (1.0 - quality_floor) * self.available_fraction();
        let total = (raw_total * quality_multiplier).clamp(0.0, self.max_score);
        let (grade, confidence) = grade_for(total, grades);
        let disqualified = gates.iter().any(GateResult::disqualifies);

        ScoreBreakdown {
            engine: self.engine,
            categories: self.categories,
            synergy_points,
            synergy_ceiling,
            applied_bonuses: synergy.applied,
            raw_total,
            quality_multiplier,
            total,
            max_score: self.max_score,
            grade,
            confidence,
            gates,
            disqualified,
        }
    }
}
