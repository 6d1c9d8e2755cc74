use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Points earned in one sub-category, already bounded by `max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub earned: f64,
    pub max: f64,
    /// False when the category's input was missing and it scored zero for that reason.
    pub available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateStatus {
    Passed,
    Failed,
    /// The gate's input was not supplied.
    Unavailable,
}

/// A pass/fail filter, reported next to the numeric score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateResult {
    pub name: String,
    pub status: GateStatus,
    pub mandatory: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<f64>,
    pub threshold: f64,
}

impl GateResult {
    /// A mandatory gate disqualifies unless it passed; missing data never
    /// counts as clearing the bar.
    pub fn disqualifies(&self) -> bool {
        self.mandatory && self.status != GateStatus::Passed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionBias {
    pub direction: Direction,
    pub bullish_votes: u32,
    pub bearish_votes: u32,
    pub reasons: Vec<String>,
}

/// One engine's result for one (ticker, timestamp) scan. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub engine: String,
    pub categories: BTreeMap<String, CategoryScore>,
    pub synergy_points: f64,
    pub synergy_ceiling: f64,
    pub applied_bonuses: Vec<String>,
    /// Sum of bounded categories plus bounded synergy, before the multiplier.
    pub raw_total: f64,
    pub quality_multiplier: f64,
    /// Final score, clamped once into [0, max_score].
    pub total: f64,
    pub max_score: f64,
    pub grade: String,
    pub confidence: String,
    pub gates: Vec<GateResult>,
    pub disqualified: bool,
}

impl ScoreBreakdown {
    pub fn category(&self, name: &str) -> Option<&CategoryScore> {
        self.categories.get(name)
    }

    /// Mandatory gates that failed or had no input.
    pub fn failed_gates(&self) -> Vec<&str> {
        self.gates
            .iter()
            .filter(|g| g.disqualifies())
            .map(|g| g.name.as_str())
            .collect()
    }

    /// Total as a fraction of the engine's scale.
    pub fn percent(&self) -> f64 {
        if self.max_score > 0.0 {
            self.total / self.max_score * 100.0
        } else {
            0.0
        }
    }
}
