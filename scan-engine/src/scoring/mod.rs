//! Composite scoring: bounded categories, synergy bonuses, gates and grades.

pub mod breakout;
pub mod card;
pub mod catalyst;
pub mod direction;
pub mod gates;
pub mod grade;
pub mod oracle;
pub mod synergy;

pub use breakout::BreakoutEngine;
pub use card::ScoreCard;
pub use catalyst::{score_item, score_news, CatalystScore};
pub use direction::direction_bias;
pub use gates::{evaluate_gate, evaluate_gates, GateInputs};
pub use grade::grade_for;
pub use oracle::OracleEngine;
pub use synergy::{apply_synergies, SynergyOutcome};

use common::{MarketContext, ScoreBreakdown, Series};

use crate::levels::LevelSet;
use crate::patterns::PatternReport;

/// Everything an engine reads for one scan
#[derive(Debug, Clone, Copy)]
pub struct ScoreInput<'a> {
    pub series: &'a Series,
    pub patterns: &'a PatternReport,
    pub levels: &'a LevelSet,
    pub context: &'a MarketContext,
}

impl<'a> ScoreInput<'a> {
    /// Values the gate rules are checked against
    pub fn gate_inputs(&self) -> GateInputs {
        let volume = self.patterns.volume.as_ref();
        GateInputs {
            risk_reward: self.levels.risk_reward.and_then(|rr| rr.ratio),
            float_shares: self.context.float_shares,
            volume_surge: volume.map(|v| v.relative_volume),
            average_volume: volume.map(|v| v.trailing_average),
        }
    }
}

/// A scoring methodology producing one breakdown per scan
pub trait ScoreEngine {
    fn name(&self) -> &'static str;

    fn score(&self, input: &ScoreInput<'_>) -> ScoreBreakdown;
}
