use common::{Direction, DirectionBias};

use crate::patterns::{ObvDivergence, PatternReport};

/// Weighted votes: OBV divergence 2, squeeze momentum, chart bias and
/// level-test outcome 1 each. Ties are neutral.
pub fn direction_bias(report: &PatternReport) -> DirectionBias {
    let mut bullish = 0;
    let mut bearish = 0;
    let mut reasons = Vec::new();

    if let Some(obv) = &report.obv {
        match obv.divergence {
            ObvDivergence::Bullish | ObvDivergence::HiddenBullish => {
                bullish += 2;
                reasons.push(format!("{} OBV divergence", obv.divergence.as_str()));
            }
            ObvDivergence::Bearish => {
                bearish += 2;
                reasons.push("BEARISH OBV divergence".to_string());
            }
            ObvDivergence::None => {}
        }
    }

    if let Some(momentum) = report.squeeze.as_ref().and_then(|s| s.momentum) {
        if momentum > 0.0 {
            bullish += 1;
            reasons.push(format!("squeeze momentum {:+.3}", momentum));
        } else if momentum < 0.0 {
            bearish += 1;
            reasons.push(format!("squeeze momentum {:+.3}", momentum));
        }
    }

    if let Some(chart) = &report.chart {
        match chart.bias {
            Direction::Bullish => bullish += 1,
            Direction::Bearish => bearish += 1,
            Direction::Neutral => {}
        }
        if chart.bias != Direction::Neutral {
            reasons.push(format!("{} pattern", chart.kind.as_str()));
        }
    }

    if let Some(test) = &report.level_test {
        let vote = test.outcome.direction();
        match vote {
            Direction::Bullish => bullish += 1,
            Direction::Bearish => bearish += 1,
            Direction::Neutral => {}
        }
        if vote != Direction::Neutral {
            reasons.push(format!("{:?} at {} {:.2}", test.outcome, test.label, test.level));
        }
    }

    let direction = if bullish > bearish {
        Direction::Bullish
    } else if bearish > bullish {
        Direction::Bearish
    } else {
        Direction::Neutral
    };

    DirectionBias {
        direction,
        bullish_votes: bullish,
        bearish_votes: bearish,
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{LevelTest, ObvAnalysis, TestOutcome};
    use common::LevelKind;

    fn support_test(outcome: TestOutcome) -> LevelTest {
        LevelTest {
            kind: LevelKind::Support,
            level: 10.0,
            label: "S1".to_string(),
            touches: 3,
            distance_pct: 0.004,
            outcome,
        }
    }

    #[test]
    fn test_support_sign_follows_price_action() {
        let bounce = PatternReport {
            level_test: Some(support_test(TestOutcome::SupportBounce)),
            ..Default::default()
        };
        assert_eq!(direction_bias(&bounce).direction, Direction::Bullish);

        let breakdown = PatternReport {
            level_test: Some(support_test(TestOutcome::SupportBreakdown)),
            ..Default::default()
        };
        assert_eq!(direction_bias(&breakdown).direction, Direction::Bearish);
    }

    #[test]
    fn test_obv_outweighs_single_vote() {
        let report = PatternReport {
            obv: Some(ObvAnalysis {
                divergence: ObvDivergence::Bullish,
                price_slope_pct: -0.1,
                obv_slope: 0.8,
                strength: 60.0,
            }),
            level_test: Some(support_test(TestOutcome::SupportBreakdown)),
            ..Default::default()
        };
        let bias = direction_bias(&report);
        assert_eq!(bias.bullish_votes, 2);
        assert_eq!(bias.bearish_votes, 1);
        assert_eq!(bias.direction, Direction::Bullish);
        assert_eq!(bias.reasons.len(), 2);
    }

    #[test]
    fn test_no_votes_is_neutral() {
        let bias = direction_bias(&PatternReport::default());
        assert_eq!(bias.direction, Direction::Neutral);
        assert!(bias.reasons.is_empty());
    }
}
