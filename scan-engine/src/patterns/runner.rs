use common::config::PatternConfig;
use common::names::signals;
use common::{Bar, MarketContext, Result, ScanError, Series, Signal};
use serde::{Deserialize, Serialize};

use super::volume::relative_volume;
use crate::indicators::session_date;

/// Multi-day runner sub-conditions, each judged on its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerCriteria {
    /// Green today after a bar that was not green
    pub first_green_day: bool,
    pub close_near_high: bool,
    pub volume_surge: bool,
    pub catalyst: bool,
    pub catalyst_required: bool,
    pub close_position: Option<f64>,
    pub relative_volume: f64,
}

impl RunnerCriteria {
    pub fn detected(&self) -> bool {
        self.first_green_day
            && self.close_near_high
            && self.volume_surge
            && (self.catalyst || !self.catalyst_required)
    }

    pub fn signal(&self) -> Signal {
        Signal::flag(signals::MULTIDAY_RUNNER, self.detected())
            .with_input("close_position", self.close_position.unwrap_or(f64::NAN))
            .with_input("relative_volume", self.relative_volume)
    }
}

pub fn detect_multiday_runner(series: &Series, context: &MarketContext, config: &PatternConfig) -> Result<RunnerCriteria> {
    let (Some(today), Some(yesterday)) = (series.last(), series.previous()) else {
        return Err(ScanError::insufficient("multiday_runner", 2, series.len()));
    };
    let (_, relative) = relative_volume(&series.volumes(), config.relative_volume_period)?;
    let close_position = today.close_position();

    Ok(RunnerCriteria {
        first_green_day: today.is_green() && !yesterday.is_green(),
        close_near_high: close_position.is_some_and(|p| p >= config.runner_close_position),
        volume_surge: relative >= config.runner_volume_multiple,
        catalyst: context.has_catalyst(),
        catalyst_required: config.runner_requires_catalyst,
        close_position,
        relative_volume: relative,
    })
}

/// Red-to-green sub-conditions for the latest session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedToGreenCriteria {
    pub opened_red: bool,
    pub now_green: bool,
    /// The morning low undercut the previous close
    pub found_support: bool,
    pub previous_close: f64,
    pub session_open: f64,
    pub morning_low: f64,
    pub current: f64,
}

impl RedToGreenCriteria {
    pub fn detected(&self) -> bool {
        self.opened_red && self.now_green && self.found_support
    }

    pub fn signal(&self) -> Signal {
        Signal::flag(signals::RED_TO_GREEN, self.detected())
            .with_input("previous_close", self.previous_close)
            .with_input("morning_low", self.morning_low)
    }
}

/// Works on intraday and daily series alike: the latest session is every bar
/// sharing the last bar's session date, the previous close is the last bar
/// before it.
pub fn detect_red_to_green(series: &Series, utc_offset_minutes: i32, config: &PatternConfig) -> Result<RedToGreenCriteria> {
    let bars = series.bars();
    let Some(last) = bars.last() else {
        return Err(ScanError::insufficient("red_to_green", 2, 0));
    };
    let date = session_date(last, utc_offset_minutes);
    let session_start = bars
        .iter()
        .rposition(|b| session_date(b, utc_offset_minutes) != date)
        .map(|i| i + 1)
        .ok_or_else(|| ScanError::insufficient("red_to_green", 2, bars.len()))?;

    let previous_close = bars[session_start - 1].close;
    let session: &[Bar] = &bars[session_start..];
    let morning = &session[..session.len().min(config.red_green_morning_bars)];
    let morning_low = morning.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let session_open = session[0].open;

    Ok(RedToGreenCriteria {
        opened_red: session_open < previous_close,
        now_green: last.close > previous_close,
        found_support: morning_low < previous_close,
        previous_close,
        session_open,
        morning_low,
        current: last.close,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{generate_random_walk, generate_runner};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_runner_criteria_all_met() {
        let series = Series::new(generate_runner(30, 3.0, 4.0, 6)).unwrap();
        let context = MarketContext::default().with_headline("Company receives FDA approval");
        let criteria = detect_multiday_runner(&series, &context, &PatternConfig::default()).unwrap();

        assert!(criteria.first_green_day);
        assert!(criteria.close_near_high);
        assert!(criteria.volume_surge);
        assert!(criteria.catalyst);
        assert!(criteria.detected());
        assert!(criteria.signal().is_active());
    }

    #[test]
    fn test_catalyst_requirement_is_configurable() {
        let series = Series::new(generate_runner(30, 3.0, 4.0, 6)).unwrap();
        let context = MarketContext::default();

        let strict = detect_multiday_runner(&series, &context, &PatternConfig::default()).unwrap();
        assert!(!strict.detected());

        let relaxed_config = PatternConfig {
            runner_requires_catalyst: false,
            ..Default::default()
        };
        let relaxed = detect_multiday_runner(&series, &context, &relaxed_config).unwrap();
        assert!(relaxed.detected());
    }

    #[test]
    fn test_weak_volume_is_not_runner() {
        let series = Series::new(generate_runner(30, 3.0, 1.5, 6)).unwrap();
        let criteria = detect_multiday_runner(&series, &MarketContext::default(), &PatternConfig::default()).unwrap();
        assert!(!criteria.volume_surge);
        assert!(criteria.close_near_high);
        assert!(!criteria.detected());
    }

    fn intraday(prev_close: f64, session: &[(f64, f64, f64, f64)]) -> Series {
        let day1 = Utc.with_ymd_and_hms(2024, 7, 1, 19, 59, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2024, 7, 2, 13, 30, 0).unwrap();
        let mut bars = vec![Bar::new(day1, prev_close, prev_close, prev_close, prev_close, 100)];
        for (i, &(o, h, l, c)) in session.iter().enumerate() {
            bars.push(Bar::new(day2 + Duration::minutes(i as i64), o, h, l, c, 100));
        }
        Series::new(bars).unwrap()
    }

    #[test]
    fn test_red_to_green_reversal() {
        let series = intraday(10.0, &[(9.6, 9.7, 9.4, 9.5), (9.5, 9.9, 9.5, 9.8), (9.8, 10.3, 9.8, 10.2)]);
        let criteria = detect_red_to_green(&series, 0, &PatternConfig::default()).unwrap();

        assert!(criteria.opened_red);
        assert!(criteria.found_support);
        assert!(criteria.now_green);
        assert_eq!(criteria.morning_low, 9.4);
        assert!(criteria.detected());
    }

    #[test]
    fn test_still_red_is_not_detected() {
        let series = intraday(10.0, &[(9.6, 9.7, 9.4, 9.5), (9.5, 9.9, 9.5, 9.8)]);
        let criteria = detect_red_to_green(&series, 0, &PatternConfig::default()).unwrap();
        assert!(criteria.opened_red);
        assert!(!criteria.now_green);
        assert!(!criteria.detected());
    }

    #[test]
    fn test_daily_series_uses_previous_bar() {
        let series = Series::new(generate_random_walk(5, 10.0, 1)).unwrap();
        let criteria = detect_red_to_green(&series, 0, &PatternConfig::default()).unwrap();
        assert_eq!(criteria.previous_close, series.previous().unwrap().close);
        assert_eq!(criteria.session_open, series.last().unwrap().open);
    }
}
