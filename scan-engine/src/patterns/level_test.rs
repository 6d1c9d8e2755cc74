use common::config::PatternConfig;
use common::names::signals;
use common::{Direction, Level, LevelKind, Series, Signal, NO_CATEGORY};
use serde::{Deserialize, Serialize};

use crate::levels::LevelSet;

/// What the latest bar did at the level being tested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestOutcome {
    /// Came down to support and closed higher
    SupportBounce,
    /// Closed below support
    SupportBreakdown,
    /// Closed above resistance
    ResistanceBreakout,
    /// Reached resistance and closed lower
    ResistanceRejection,
    /// Still sitting on support
    Holding,
    /// Still pressing into resistance
    Pressing,
}

impl TestOutcome {
    /// Direction follows the post-test price action, not the level type
    pub fn direction(&self) -> Direction {
        match self {
            Self::SupportBounce | Self::ResistanceBreakout => Direction::Bullish,
            Self::SupportBreakdown | Self::ResistanceRejection => Direction::Bearish,
            Self::Holding | Self::Pressing => Direction::Neutral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelTest {
    /// Support or resistance, judged against the close before the test
    pub kind: LevelKind,
    pub level: f64,
    pub label: String,
    pub touches: u32,
    pub distance_pct: f64,
    pub outcome: TestOutcome,
}

impl LevelTest {
    pub fn signal(test: Option<&LevelTest>) -> Signal {
        match test {
            Some(t) => {
                let kind = match t.kind {
                    LevelKind::Support => "SUPPORT",
                    _ => "RESISTANCE",
                };
                let sign = match t.outcome.direction() {
                    Direction::Bullish => 1.0,
                    Direction::Bearish => -1.0,
                    Direction::Neutral => 0.0,
                };
                Signal::category(signals::LEVEL_TEST, kind)
                    .with_input("level", t.level)
                    .with_input("touches", t.touches as f64)
                    .with_input("distance_pct", t.distance_pct)
                    .with_input("outcome", sign)
            }
            None => Signal::category(signals::LEVEL_TEST, NO_CATEGORY),
        }
    }
}

fn count_touches(series: &Series, price: f64, use_highs: bool, config: &PatternConfig) -> u32 {
    let tolerance = price * config.level_test_tolerance_pct;
    // Bars before the one being judged
    let bars = series.bars();
    let history = &bars[..bars.len() - 1];
    let start = history.len().saturating_sub(config.level_test_lookback);
    history[start..]
        .iter()
        .filter(|b| {
            let extreme = if use_highs { b.high } else { b.low };
            (extreme - price).abs() <= tolerance
        })
        .count() as u32
}

/// Find the support or resistance the series has been testing and judge the
/// latest bar's reaction to it. `None` when no level is close enough or has
/// been touched often enough.
pub fn detect_level_test(series: &Series, levels: &LevelSet, config: &PatternConfig) -> Option<LevelTest> {
    let (today, yesterday) = (series.last()?, series.previous()?);
    let reference = yesterday.close;
    if reference <= 0.0 {
        return None;
    }

    let all = levels.all_levels();
    let nearest = |above: bool| -> Option<&Level> {
        all.iter()
            .filter(|l| if above { l.price > reference } else { l.price < reference })
            .min_by(|a, b| (a.price - reference).abs().total_cmp(&(b.price - reference).abs()))
    };

    let mut candidates = Vec::new();
    if let Some(r) = nearest(true) {
        let distance = (r.price - reference) / reference;
        let touches = count_touches(series, r.price, true, config);
        candidates.push((LevelKind::Resistance, r, distance, touches));
    }
    if let Some(s) = nearest(false) {
        let distance = (reference - s.price) / reference;
        let touches = count_touches(series, s.price, false, config);
        candidates.push((LevelKind::Support, s, distance, touches));
    }

    let (kind, level, distance, touches) = candidates
        .into_iter()
        .filter(|(_, _, d, t)| *d < config.level_test_max_distance_pct && *t >= config.level_test_min_touches)
        .min_by(|a, b| a.2.total_cmp(&b.2))?;

    let tol = config.level_test_tolerance_pct;
    let outcome = match kind {
        LevelKind::Resistance => {
            if today.close > level.price {
                TestOutcome::ResistanceBreakout
            } else if today.high >= level.price * (1.0 - tol) && today.close < reference {
                TestOutcome::ResistanceRejection
            } else {
                TestOutcome::Pressing
            }
        }
        _ => {
            if today.close < level.price {
                TestOutcome::SupportBreakdown
            } else if today.low <= level.price * (1.0 + tol) && today.close > reference {
                TestOutcome::SupportBounce
            } else {
                TestOutcome::Holding
            }
        }
    };

    Some(LevelTest {
        kind,
        level: level.price,
        label: level.label.clone(),
        touches,
        distance_pct: distance * 100.0,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use common::{Bar, LevelSource};

    fn level(price: f64) -> Level {
        Level {
            price,
            kind: LevelKind::Support,
            source: LevelSource::VolumeProfile,
            label: "Strong".to_string(),
            strength: 1.0,
            touches: 3,
            last_touch: None,
        }
    }

    fn level_set(prices: &[f64]) -> LevelSet {
        LevelSet {
            volume_levels: prices.iter().map(|p| level(*p)).collect(),
            ..Default::default()
        }
    }

    /// Three earlier bars dipping to 10.0, a close at 10.1, then `today`
    fn support_series(today: (f64, f64, f64, f64)) -> Series {
        let start = Utc.with_ymd_and_hms(2024, 8, 1, 20, 0, 0).unwrap();
        let mut bars: Vec<Bar> = (0..3)
            .map(|i| Bar::new(start + Duration::days(i), 10.3, 10.5, 10.0, 10.3, 1_000))
            .collect();
        bars.push(Bar::new(start + Duration::days(3), 10.3, 10.35, 10.03, 10.1, 1_000));
        let (o, h, l, c) = today;
        bars.push(Bar::new(start + Duration::days(4), o, h, l, c, 1_000));
        Series::new(bars).unwrap()
    }

    #[test]
    fn test_support_bounce_is_bullish() {
        let series = support_series((10.1, 10.4, 10.02, 10.35));
        let test = detect_level_test(&series, &level_set(&[10.0, 14.0]), &PatternConfig::default()).unwrap();

        assert_eq!(test.kind, LevelKind::Support);
        assert_eq!(test.touches, 4);
        assert_eq!(test.outcome, TestOutcome::SupportBounce);
        assert_eq!(test.outcome.direction(), Direction::Bullish);
    }

    #[test]
    fn test_support_breakdown_is_bearish() {
        let series = support_series((10.1, 10.12, 9.7, 9.75));
        let test = detect_level_test(&series, &level_set(&[10.0, 14.0]), &PatternConfig::default()).unwrap();

        assert_eq!(test.kind, LevelKind::Support);
        assert_eq!(test.outcome, TestOutcome::SupportBreakdown);
        assert_eq!(test.outcome.direction(), Direction::Bearish);
    }

    #[test]
    fn test_resistance_breakout_and_rejection() {
        let start = Utc.with_ymd_and_hms(2024, 8, 1, 20, 0, 0).unwrap();
        let mut bars: Vec<Bar> = (0..3)
            .map(|i| Bar::new(start + Duration::days(i), 19.6, 20.0, 19.5, 19.7, 1_000))
            .collect();
        bars.push(Bar::new(start + Duration::days(3), 19.7, 19.95, 19.6, 19.9, 1_000));
        let mut breakout = bars.clone();
        breakout.push(Bar::new(start + Duration::days(4), 19.9, 20.6, 19.85, 20.5, 5_000));
        let mut rejection = bars;
        rejection.push(Bar::new(start + Duration::days(4), 19.9, 20.0, 19.5, 19.6, 5_000));
        let levels = level_set(&[20.0, 15.0]);

        let up = detect_level_test(&Series::new(breakout).unwrap(), &levels, &PatternConfig::default()).unwrap();
        assert_eq!(up.kind, LevelKind::Resistance);
        assert_eq!(up.outcome, TestOutcome::ResistanceBreakout);
        assert_eq!(up.outcome.direction(), Direction::Bullish);

        let down = detect_level_test(&Series::new(rejection).unwrap(), &levels, &PatternConfig::default()).unwrap();
        assert_eq!(down.outcome, TestOutcome::ResistanceRejection);
        assert_eq!(down.outcome.direction(), Direction::Bearish);
    }

    #[test]
    fn test_distant_or_untouched_level_is_ignored() {
        let series = support_series((10.1, 10.4, 10.02, 10.35));
        assert!(detect_level_test(&series, &level_set(&[9.0]), &PatternConfig::default()).is_none());
        assert_eq!(
            LevelTest::signal(None).as_category(),
            Some(NO_CATEGORY)
        );
    }
}
