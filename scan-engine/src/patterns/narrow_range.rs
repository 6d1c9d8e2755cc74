use common::config::PatternConfig;
use common::names::signals;
use common::{Bar, Result, ScanError, Signal};
use serde::{Deserialize, Serialize};

/// NR4/NR7 state of the latest bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrowRange {
    /// `None` with fewer than 4 bars
    pub nr4: Option<bool>,
    /// `None` with fewer than 7 bars
    pub nr7: Option<bool>,
    pub gap_day: bool,
    pub gap_pct: f64,
    pub range: f64,
    /// Consecutive narrow bars ending at the latest one
    pub narrow_streak: usize,
    /// Share of the recent ranges below today's, in percent
    pub range_percentile: Option<f64>,
}

impl NarrowRange {
    pub fn signals(&self) -> Vec<Signal> {
        let flag = |name: &str, value: Option<bool>, window: usize| match value {
            Some(on) => Signal::flag(name, on).with_input("range", self.range),
            None => Signal::unavailable(name, format!("needs {} bars", window)),
        };
        let mut streak = Signal::flag(signals::NARROW_STREAK, self.narrow_streak >= 2)
            .with_input("bars", self.narrow_streak as f64);
        if let Some(p) = self.range_percentile {
            streak = streak.with_input("range_percentile", p);
        }
        vec![
            flag(signals::NR4, self.nr4, 4),
            flag(signals::NR7, self.nr7, 7),
            Signal::flag(signals::GAP_DAY, self.gap_day).with_input("gap_pct", self.gap_pct),
            streak,
        ]
    }
}

/// `value` is no larger than `min` once relative tolerance is allowed for
fn within_tolerance(value: f64, min: f64, tolerance: f64) -> bool {
    value - min <= tolerance * value.abs().max(min.abs())
}

/// True when the last of `ranges` is the narrowest of the trailing `window`
pub fn is_narrowest(ranges: &[f64], window: usize, tolerance: f64) -> bool {
    if window == 0 || ranges.len() < window {
        return false;
    }
    let tail = &ranges[ranges.len() - window..];
    let min = tail.iter().copied().fold(f64::INFINITY, f64::min);
    within_tolerance(tail[window - 1], min, tolerance)
}

/// |open − previous close| / previous close
pub fn gap_pct(open: f64, prev_close: f64) -> f64 {
    if prev_close == 0.0 {
        return 0.0;
    }
    (open - prev_close).abs() / prev_close.abs()
}

fn is_gap(bars: &[Bar], i: usize, threshold: f64) -> bool {
    i > 0 && gap_pct(bars[i].open, bars[i - 1].close) > threshold
}

pub fn detect_narrow_range(bars: &[Bar], config: &PatternConfig) -> Result<NarrowRange> {
    let n = bars.len();
    if n < 2 {
        return Err(ScanError::insufficient("narrow_range", 2, n));
    }
    let ranges: Vec<f64> = bars.iter().map(Bar::range).collect();
    let last = n - 1;
    let gap = gap_pct(bars[last].open, bars[last - 1].close);
    let gap_day = gap > config.gap_threshold;

    let nr = |window: usize| {
        (n >= window).then(|| !gap_day && is_narrowest(&ranges, window, config.nr_tolerance))
    };

    // Average range over the trailing period, today included
    let avg_window = &ranges[n.saturating_sub(config.average_range_period)..];
    let avg_range = avg_window.iter().sum::<f64>() / avg_window.len() as f64;

    let mut narrow_streak = 0;
    if avg_range > 0.0 {
        for i in (0..n).rev().take(config.narrow_streak_lookback) {
            if is_gap(bars, i, config.gap_threshold) || ranges[i] >= config.narrow_range_ratio * avg_range {
                break;
            }
            narrow_streak += 1;
        }
    }

    let pct_window = &ranges[n.saturating_sub(config.range_percentile_lookback)..];
    let range_percentile = (pct_window.len() >= 2).then(|| {
        let below = pct_window.iter().filter(|r| **r < ranges[last]).count();
        below as f64 / pct_window.len() as f64 * 100.0
    });

    Ok(NarrowRange {
        nr4: nr(4),
        nr7: nr(7),
        gap_day,
        gap_pct: gap,
        range: ranges[last],
        narrow_streak,
        range_percentile,
    })
}
