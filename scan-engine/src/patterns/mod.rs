pub mod chart;
pub mod level_test;
pub mod narrow_range;
pub mod obv_divergence;
pub mod runner;
pub mod squeeze;
pub mod volume;

pub use chart::{detect_chart_pattern, ChartPattern, ChartPatternKind};
pub use level_test::{detect_level_test, LevelTest, TestOutcome};
pub use narrow_range::{detect_narrow_range, gap_pct, is_narrowest, NarrowRange};
pub use obv_divergence::{detect_obv_divergence, ObvAnalysis, ObvDivergence};
pub use runner::{detect_multiday_runner, detect_red_to_green, RedToGreenCriteria, RunnerCriteria};
pub use squeeze::{detect_squeeze, SqueezeIntensity, SqueezeState};
pub use volume::{analyze_volume, is_volume_contraction, relative_volume, VolumeAnalysis, VolumePattern};

use common::names::signals;
use common::{
    IndicatorSet, IndicatorValue, MarketContext, Result, ScanConfig, ScanError, Series, Signal,
    SignalSet,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::levels::LevelSet;
use crate::scoring::catalyst::score_news;

/// The aligned sequence of an indicator, or why it is missing
pub(crate) fn require<'a>(indicators: &'a IndicatorSet, name: &str) -> Result<&'a [f64]> {
    match indicators.get(name) {
        Some(IndicatorValue::Sequence { values }) => Ok(values),
        Some(IndicatorValue::Unavailable { required, actual })
        | Some(IndicatorValue::Defaulted {
            required, actual, ..
        }) => Err(ScanError::insufficient(name, *required, *actual)),
        _ => Err(ScanError::insufficient(name, 1, 0)),
    }
}

/// Everything the detectors found for one scan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternReport {
    pub narrow_range: Option<NarrowRange>,
    pub squeeze: Option<SqueezeState>,
    pub volume: Option<VolumeAnalysis>,
    pub obv: Option<ObvAnalysis>,
    pub chart: Option<ChartPattern>,
    pub level_test: Option<LevelTest>,
    pub runner: Option<RunnerCriteria>,
    pub red_to_green: Option<RedToGreenCriteria>,
    pub signals: SignalSet,
}

/// Runs every detector; a detector without enough data reports its signals
/// as unavailable and the rest still run.
pub struct PatternDetector {
    config: ScanConfig,
}

impl PatternDetector {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn settle<T>(result: Result<T>, names: &[&str], signals: &mut SignalSet) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(error = %e, "detector unavailable");
                for name in names {
                    signals.push(Signal::unavailable(name, e.to_string()));
                }
                None
            }
        }
    }

    pub fn detect(
        &self,
        series: &Series,
        indicators: &IndicatorSet,
        levels: &LevelSet,
        context: &MarketContext,
    ) -> PatternReport {
        let cfg = &self.config.patterns;
        let mut out = SignalSet::new();

        let narrow_range = Self::settle(
            detect_narrow_range(series.bars(), cfg),
            &[signals::NR4, signals::NR7, signals::GAP_DAY, signals::NARROW_STREAK],
            &mut out,
        );
        if let Some(nr) = &narrow_range {
            out.extend(nr.signals());
        }

        let squeeze = Self::settle(
            detect_squeeze(series, indicators, cfg),
            &[
                signals::SQUEEZE_ON,
                signals::SQUEEZE_FIRED,
                signals::SQUEEZE_INTENSITY,
                signals::SQUEEZE_MOMENTUM,
            ],
            &mut out,
        );
        if let Some(sq) = &squeeze {
            out.extend(sq.signals());
        }

        let volume = Self::settle(
            analyze_volume(series, indicators, cfg),
            &[signals::VOLUME_CONTRACTION, signals::VOLUME_PATTERN, signals::VOLUME_SURGE],
            &mut out,
        );
        if let Some(v) = &volume {
            out.extend(v.signals(cfg));
        }

        let obv = Self::settle(
            detect_obv_divergence(series, indicators, cfg),
            &[signals::OBV_DIVERGENCE],
            &mut out,
        );
        if let Some(o) = &obv {
            out.push(o.signal());
        }

        let chart = Self::settle(
            detect_chart_pattern(series, indicators, cfg),
            &[signals::CHART_PATTERN],
            &mut out,
        );
        if let Some(c) = &chart {
            out.push(c.signal());
        }

        let level_test = detect_level_test(series, levels, cfg);
        out.push(LevelTest::signal(level_test.as_ref()));

        let runner = Self::settle(
            detect_multiday_runner(series, context, cfg),
            &[signals::MULTIDAY_RUNNER],
            &mut out,
        );
        if let Some(r) = &runner {
            out.push(r.signal());
        }

        let red_to_green = Self::settle(
            detect_red_to_green(series, self.config.indicators.session_utc_offset_minutes, cfg),
            &[signals::RED_TO_GREEN],
            &mut out,
        );
        if let Some(r) = &red_to_green {
            out.push(r.signal());
        }

        out.extend(self.context_signals(context));

        PatternReport {
            narrow_range,
            squeeze,
            volume,
            obv,
            chart,
            level_test,
            runner,
            red_to_green,
            signals: out,
        }
    }

    /// Signals that come from the market context rather than the bars
    fn context_signals(&self, context: &MarketContext) -> Vec<Signal> {
        let oracle = &self.config.scoring.oracle;
        let news = score_news(&context.news, &oracle.news_keywords, oracle.news_items_considered, oracle.news_max);
        let catalyst = Signal::flag(signals::NEWS_CATALYST, news.points > 0.0).with_input("points", news.points);

        let low_float = match context.float_shares {
            Some(shares) if shares > 0.0 => {
                Signal::flag(signals::LOW_FLOAT, shares < oracle.low_float_shares).with_input("float_shares", shares)
            }
            _ => Signal::unavailable(signals::LOW_FLOAT, "float not supplied"),
        };
        vec![catalyst, low_float]
    }
}
