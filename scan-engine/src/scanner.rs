use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use common::names::{indicators as keys, signals};
use common::{
    DirectionBias, MarketContext, Result, ScanConfig, ScanError, ScoreBreakdown, Series, SignalSet,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::indicators::compute_indicators;
use crate::levels::{LevelCalculator, LevelSet};
use crate::patterns::{PatternDetector, RedToGreenCriteria, RunnerCriteria};
use crate::scoring::{direction_bias, BreakoutEngine, OracleEngine, ScoreEngine, ScoreInput};
use crate::sizing::{calculate_position_size, PositionSize};

/// Outcome of one scan of one ticker, stamped with the last bar's time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub ticker: String,
    pub as_of: DateTime<Utc>,
    pub last_close: f64,
    pub bars: usize,
    /// Latest value per indicator, `None` when unavailable
    pub indicators: BTreeMap<String, Option<f64>>,
    pub signals: SignalSet,
    pub levels: LevelSet,
    pub oracle: ScoreBreakdown,
    pub breakout: ScoreBreakdown,
    pub direction: DirectionBias,
    pub runner: Option<RunnerCriteria>,
    pub red_to_green: Option<RedToGreenCriteria>,
    pub position: Option<PositionSize>,
}

impl ScanResult {
    /// Headline fields flattened for tabular output
    pub fn to_record(&self) -> BTreeMap<String, Value> {
        let mut record = BTreeMap::new();
        let mut put = |key: &str, value: Value| {
            record.insert(key.to_string(), value);
        };

        put("ticker", json!(self.ticker));
        put("as_of", json!(self.as_of.to_rfc3339()));
        put("last_close", json!(self.last_close));
        put("oracle_score", json!(self.oracle.total));
        put("oracle_grade", json!(self.oracle.grade));
        put("oracle_disqualified", json!(self.oracle.disqualified));
        put("failed_gates", json!(self.oracle.failed_gates()));
        put("breakout_score", json!(self.breakout.total));
        put("breakout_probability", json!(self.breakout.grade));
        put("direction", json!(self.direction.direction));
        put("active_signals", json!(self.signals.active_names()));
        put(
            "nearest_support",
            json!(self.levels.nearest_support().map(|l| l.price)),
        );
        put(
            "nearest_resistance",
            json!(self.levels.nearest_resistance().map(|l| l.price)),
        );
        put(
            "risk_reward",
            json!(self.levels.risk_reward.and_then(|rr| rr.ratio)),
        );
        put("rsi", json!(self.indicators.get(keys::RSI).copied().flatten()));
        put("atr", json!(self.indicators.get(keys::ATR).copied().flatten()));
        put("multiday_runner", json!(self.signals.is_active(signals::MULTIDAY_RUNNER)));
        put("red_to_green", json!(self.signals.is_active(signals::RED_TO_GREEN)));
        put("shares", json!(self.position.map(|p| p.shares)));
        record
    }
}

/// Runs the full pipeline for one series: indicators, levels, patterns,
/// both scoring engines and the direction vote. Holds no per-scan state, so
/// one scanner can be shared across threads.
pub struct Scanner {
    config: ScanConfig,
    levels: LevelCalculator,
    detector: PatternDetector,
    oracle: OracleEngine,
    breakout: BreakoutEngine,
    account: Option<f64>,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            levels: LevelCalculator::new(&config.levels),
            detector: PatternDetector::new(&config),
            oracle: OracleEngine::new(&config.scoring),
            breakout: BreakoutEngine::new(&config.scoring),
            config,
            account: None,
        })
    }

    /// Size positions against this account value
    pub fn with_account(mut self, account: f64) -> Self {
        self.account = Some(account);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn scan(&self, ticker: &str, series: &Series, context: &MarketContext) -> Result<ScanResult> {
        let start = Instant::now();
        let last = series
            .last()
            .ok_or_else(|| ScanError::InvalidSeries(format!("{}: empty series", ticker)))?;

        let indicators = compute_indicators(series, &self.config.indicators)?;
        let levels = self.levels.calculate(series, &indicators);
        let report = self.detector.detect(series, &indicators, &levels, context);

        let input = ScoreInput {
            series,
            patterns: &report,
            levels: &levels,
            context,
        };
        let oracle = self.oracle.score(&input);
        let breakout = self.breakout.score(&input);
        let direction = direction_bias(&report);

        let position = match (self.account, levels.risk_reward) {
            (Some(account), Some(rr)) => rr.stop.and_then(|stop| {
                match calculate_position_size(account, rr.entry, stop, &self.config.sizing) {
                    Ok(size) => Some(size),
                    Err(e) => {
                        debug!(ticker, error = %e, "position not sized");
                        None
                    }
                }
            }),
            _ => None,
        };

        info!(
            ticker,
            bars = series.len(),
            oracle = oracle.total,
            oracle_grade = %oracle.grade,
            breakout = breakout.total,
            disqualified = oracle.disqualified,
            elapsed_us = start.elapsed().as_micros() as u64,
            "scan complete"
        );

        Ok(ScanResult {
            ticker: ticker.to_string(),
            as_of: last.timestamp,
            last_close: last.close,
            bars: series.len(),
            indicators: indicators.snapshot(),
            signals: report.signals.clone(),
            levels,
            oracle,
            breakout,
            direction,
            runner: report.runner.clone(),
            red_to_green: report.red_to_green.clone(),
            position,
        })
    }
}
