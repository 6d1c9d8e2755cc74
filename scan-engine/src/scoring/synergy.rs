use common::config::SynergyBonus;
use common::SignalSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynergyOutcome {
    /// Sum of applied bonuses, bounded by the ceiling
    pub points: f64,
    pub applied: Vec<String>,
}

/// Applies every bonus whose required signals are all active
pub fn apply_synergies(bonuses: &[SynergyBonus], signals: &SignalSet, ceiling: f64) -> SynergyOutcome {
    let mut sum = 0.0;
    let mut applied = Vec::new();
    for bonus in bonuses {
        if !bonus.requires.is_empty() && bonus.requires.iter().all(|r| signals.is_active(r)) {
            sum += bonus.points;
            applied.push(bonus.name.clone());
        }
    }
    SynergyOutcome {
        points: sum.min(ceiling).max(0.0),
        applied,
    }
}
