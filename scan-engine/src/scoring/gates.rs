use common::config::{GateComparison, GateMetric, GateRule};
use common::{GateResult, GateStatus};

/// Observed values the gate rules can refer to
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GateInputs {
    pub risk_reward: Option<f64>,
    pub float_shares: Option<f64>,
    pub volume_surge: Option<f64>,
    pub average_volume: Option<f64>,
}

impl GateInputs {
    pub fn get(&self, metric: GateMetric) -> Option<f64> {
        let value = match metric {
            GateMetric::RiskReward => self.risk_reward,
            GateMetric::FloatShares => self.float_shares,
            GateMetric::VolumeSurge => self.volume_surge,
            GateMetric::AverageVolume => self.average_volume,
        };
        value.filter(|v| v.is_finite())
    }
}

/// A missing input leaves the gate `Unavailable`, never `Failed`. A mandatory
/// gate still disqualifies in that case; see [`GateResult::disqualifies`].
pub fn evaluate_gate(rule: &GateRule, inputs: &GateInputs) -> GateResult {
    let observed = inputs.get(rule.metric);
    let status = match observed {
        None => GateStatus::Unavailable,
        Some(v) => {
            let passed = match rule.comparison {
                GateComparison::AtLeast => v >= rule.threshold,
                GateComparison::AtMost => v <= rule.threshold,
            };
            if passed {
                GateStatus::Passed
            } else {
                GateStatus::Failed
            }
        }
    };
    GateResult {
        name: rule.name.clone(),
        status,
        mandatory: rule.mandatory,
        observed,
        threshold: rule.threshold,
    }
}

pub fn evaluate_gates(rules: &[GateRule], inputs: &GateInputs) -> Vec<GateResult> {
    rules.iter().map(|r| evaluate_gate(r, inputs)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_comparisons() {
        let inputs = GateInputs {
            risk_reward: Some(5.0),
            float_shares: Some(25_000_000.0),
            ..Default::default()
        };
        let rr = evaluate_gate(&GateRule::at_least("rr", GateMetric::RiskReward, 5.0), &inputs);
        assert_eq!(rr.status, GateStatus::Passed);

        let float = evaluate_gate(&GateRule::at_most("float", GateMetric::FloatShares, 20_000_000.0), &inputs);
        assert_eq!(float.status, GateStatus::Failed);
        assert!(float.disqualifies());
    }

    #[test]
    fn test_missing_input_is_unavailable() {
        let inputs = GateInputs {
            volume_surge: Some(f64::NAN),
            ..Default::default()
        };
        let results = evaluate_gates(
            &[
                GateRule::at_least("surge", GateMetric::VolumeSurge, 3.0),
                GateRule::at_most("float", GateMetric::FloatShares, 1.0),
            ],
            &inputs,
        );
        assert!(results.iter().all(|g| g.status == GateStatus::Unavailable));
        assert!(results[0].observed.is_none());
    }

    #[test]
    fn test_missing_input_never_beats_a_measured_failure() {
        let rule = GateRule::at_least("min_rr", GateMetric::RiskReward, 5.0);

        let measured = evaluate_gate(&rule, &GateInputs { risk_reward: Some(4.0), ..Default::default() });
        assert_eq!(measured.status, GateStatus::Failed);
        assert!(measured.disqualifies());

        // no resistance above means no ratio, which must not slip through
        let missing = evaluate_gate(&rule, &GateInputs::default());
        assert_eq!(missing.status, GateStatus::Unavailable);
        assert!(missing.mandatory);
        assert!(missing.disqualifies());

        let advisory = evaluate_gate(&rule.clone().advisory(), &GateInputs::default());
        assert_eq!(advisory.status, GateStatus::Unavailable);
        assert!(!advisory.disqualifies());
    }
}
