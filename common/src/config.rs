use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};
use crate::names::signals;

/// Bollinger width / Keltner width below this is an EXTREME squeeze.
pub const SQUEEZE_EXTREME_RATIO: f64 = 0.5;
/// Below this is a HIGH squeeze.
pub const SQUEEZE_HIGH_RATIO: f64 = 0.7;
/// Below this is a MODERATE squeeze, anything wider is LOW.
pub const SQUEEZE_MODERATE_RATIO: f64 = 0.9;

/// Short volume average must sit below this fraction of the long average to count as contraction.
pub const VOLUME_CONTRACTION_RATIO: f64 = 0.8;

/// Relative tolerance for "narrowest range" comparisons.
pub const NR_RELATIVE_TOLERANCE: f64 = 1e-9;

/// |open - prev close| / prev close above this is a gap day.
pub const GAP_THRESHOLD: f64 = 0.02;

/// Added to data-derived divisors that can legitimately be zero.
pub const EPSILON: f64 = 1e-12;

/// Indicator periods and documented defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub atr_period: usize,
    pub adx_period: usize,
    pub bb_period: usize,
    /// Sample standard deviations (ddof = 1)
    pub bb_std_dev: f64,
    pub kc_period: usize,
    pub kc_atr_multiplier: f64,
    pub awesome_fast: usize,
    pub awesome_slow: usize,
    pub williams_period: usize,
    pub volume_short_period: usize,
    pub volume_long_period: usize,
    /// Reported when RSI cannot be computed
    pub rsi_default: f64,
    /// Reported when Williams %R cannot be computed
    pub williams_default: f64,
    /// VWAP sessions start at local midnight of this UTC offset
    pub session_utc_offset_minutes: i32,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            atr_period: 14,
            adx_period: 14,
            bb_period: 20,
            bb_std_dev: 2.0,
            kc_period: 20,
            kc_atr_multiplier: 1.5,
            awesome_fast: 5,
            awesome_slow: 34,
            williams_period: 14,
            volume_short_period: 5,
            volume_long_period: 20,
            rsi_default: 50.0,
            williams_default: -50.0,
            session_utc_offset_minutes: 0,
        }
    }
}

/// Pattern detector thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    // === Narrow range ===
    pub nr_tolerance: f64,
    pub gap_threshold: f64,
    /// A bar is "narrow" below this fraction of the average range
    pub narrow_range_ratio: f64,
    pub average_range_period: usize,
    pub narrow_streak_lookback: usize,
    pub range_percentile_lookback: usize,

    // === TTM squeeze ===
    pub squeeze_extreme_ratio: f64,
    pub squeeze_high_ratio: f64,
    pub squeeze_moderate_ratio: f64,
    pub squeeze_momentum_period: usize,

    // === Volume ===
    pub volume_contraction_ratio: f64,
    pub volume_surge_ratio: f64,
    pub volume_elevated_ratio: f64,
    /// Bars of short-average history used to judge "declining"
    pub volume_trend_window: usize,

    // === OBV divergence ===
    pub obv_lookback: usize,
    /// Price slope (percent of mean price per bar) considered flat
    pub obv_price_flat_pct: f64,
    /// Normalised OBV slope (OBV slope / mean |OBV delta|) that counts as trending
    pub obv_slope_threshold: f64,
    pub obv_hidden_window: usize,

    // === Chart patterns (slopes in ATR per bar) ===
    pub pattern_lookback: usize,
    pub flat_slope_atr: f64,
    pub trend_slope_atr: f64,
    pub converging_slope_atr: f64,
    pub flag_pole_bars: usize,
    pub flag_pole_atr: f64,
    pub flag_range_atr: f64,

    // === Multi-day runner / red-to-green ===
    pub runner_close_position: f64,
    pub runner_volume_multiple: f64,
    /// Bars averaged (latest excluded) for relative volume
    pub relative_volume_period: usize,
    pub runner_requires_catalyst: bool,
    pub red_green_morning_bars: usize,

    // === Level test ===
    pub level_test_lookback: usize,
    pub level_test_tolerance_pct: f64,
    pub level_test_max_distance_pct: f64,
    pub level_test_min_touches: u32,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            nr_tolerance: NR_RELATIVE_TOLERANCE,
            gap_threshold: GAP_THRESHOLD,
            narrow_range_ratio: 0.7,
            average_range_period: 20,
            narrow_streak_lookback: 10,
            range_percentile_lookback: 50,

            squeeze_extreme_ratio: SQUEEZE_EXTREME_RATIO,
            squeeze_high_ratio: SQUEEZE_HIGH_RATIO,
            squeeze_moderate_ratio: SQUEEZE_MODERATE_RATIO,
            squeeze_momentum_period: 20,

            volume_contraction_ratio: VOLUME_CONTRACTION_RATIO,
            volume_surge_ratio: 2.0,
            volume_elevated_ratio: 1.5,
            volume_trend_window: 5,

            obv_lookback: 14,
            obv_price_flat_pct: 0.5,
            obv_slope_threshold: 0.3,
            obv_hidden_window: 5,

            pattern_lookback: 15,
            flat_slope_atr: 0.1,
            trend_slope_atr: 0.1,
            converging_slope_atr: 0.07,
            flag_pole_bars: 10,
            flag_pole_atr: 3.0,
            flag_range_atr: 3.0,

            runner_close_position: 0.9,
            runner_volume_multiple: 3.0,
            relative_volume_period: 20,
            runner_requires_catalyst: true,
            red_green_morning_bars: 30,

            level_test_lookback: 20,
            level_test_tolerance_pct: 0.005,
            level_test_max_distance_pct: 0.015,
            level_test_min_touches: 2,
        }
    }
}

/// Price binning for the volume profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "width", rename_all = "snake_case")]
pub enum BinWidth {
    /// Fixed width in price units
    Fixed(f64),
    /// Geometric bins, each this fraction wider than the last
    Percent(f64),
}

/// Support/resistance settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub lookback: usize,
    pub bin_width: BinWidth,
    /// Close within this fraction of a bin center counts as a touch
    pub touch_tolerance_pct: f64,
    /// strength = volume * touches * exp(-decay_rate * days_since_touch)
    pub decay_rate: f64,
    pub min_touches: u32,
    pub max_levels: usize,
    /// Strength relative to the strongest level
    pub very_strong_ratio: f64,
    pub strong_ratio: f64,
    pub moderate_ratio: f64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            lookback: 60,
            bin_width: BinWidth::Percent(0.02),
            touch_tolerance_pct: 0.01,
            decay_rate: 0.1,
            min_touches: 2,
            max_levels: 10,
            very_strong_ratio: 0.75,
            strong_ratio: 0.5,
            moderate_ratio: 0.25,
        }
    }
}

/// One row of a tier table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreTier {
    pub threshold: f64,
    pub points: f64,
}

/// Tier table, best tier first. The first matching tier wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreTiers {
    /// Match `value >= threshold` when true, `value < threshold` when false
    pub higher_is_better: bool,
    pub tiers: Vec<ScoreTier>,
}

impl ScoreTiers {
    pub fn ascending(tiers: &[(f64, f64)]) -> Self {
        Self::build(true, tiers)
    }

    pub fn descending(tiers: &[(f64, f64)]) -> Self {
        Self::build(false, tiers)
    }

    fn build(higher_is_better: bool, tiers: &[(f64, f64)]) -> Self {
        Self {
            higher_is_better,
            tiers: tiers
                .iter()
                .map(|&(threshold, points)| ScoreTier { threshold, points })
                .collect(),
        }
    }

    pub fn points(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return 0.0;
        }
        self.tiers
            .iter()
            .find(|t| {
                if self.higher_is_better {
                    value >= t.threshold
                } else {
                    value < t.threshold
                }
            })
            .map(|t| t.points)
            .unwrap_or(0.0)
    }

    pub fn max_points(&self) -> f64 {
        self.tiers.iter().map(|t| t.points).fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalystKeyword {
    pub keyword: String,
    pub points: f64,
}

/// Extra points when every required signal is active
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyBonus {
    pub name: String,
    /// Signal names, or `name=CATEGORY`; at least two
    pub requires: Vec<String>,
    pub points: f64,
}

impl SynergyBonus {
    pub fn new(name: &str, requires: &[&str], points: f64) -> Self {
        Self {
            name: name.to_string(),
            requires: requires.iter().map(|r| r.to_string()).collect(),
            points,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMetric {
    RiskReward,
    FloatShares,
    VolumeSurge,
    AverageVolume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateComparison {
    AtLeast,
    AtMost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateRule {
    pub name: String,
    pub metric: GateMetric,
    pub comparison: GateComparison,
    pub threshold: f64,
    pub mandatory: bool,
}

impl GateRule {
    pub fn at_least(name: &str, metric: GateMetric, threshold: f64) -> Self {
        Self {
            name: name.to_string(),
            metric,
            comparison: GateComparison::AtLeast,
            threshold,
            mandatory: true,
        }
    }

    pub fn at_most(name: &str, metric: GateMetric, threshold: f64) -> Self {
        Self {
            comparison: GateComparison::AtMost,
            ..Self::at_least(name, metric, threshold)
        }
    }

    pub fn advisory(mut self) -> Self {
        self.mandatory = false;
        self
    }
}

/// Score-to-grade row, highest `min_score` first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeBand {
    pub min_score: f64,
    pub grade: String,
    pub confidence: String,
}

impl GradeBand {
    pub fn new(min_score: f64, grade: &str, confidence: &str) -> Self {
        Self {
            min_score,
            grade: grade.to_string(),
            confidence: confidence.to_string(),
        }
    }
}

/// Oracle (0-165) methodology weights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleWeights {
    pub max_score: f64,
    pub float_max: f64,
    pub float_tiers: ScoreTiers,
    pub volume_max: f64,
    pub volume_tiers: ScoreTiers,
    pub news_max: f64,
    pub news_items_considered: usize,
    pub news_keywords: Vec<CatalystKeyword>,
    pub sector_max: f64,
    pub sector_tiers: ScoreTiers,
    pub chart_max: f64,
    pub close_position_tiers: ScoreTiers,
    pub previous_runs_points: f64,
    pub clean_chart_points: f64,
    /// No resistance closer than this fraction above the close
    pub clean_chart_min_distance_pct: f64,
    pub risk_reward_max: f64,
    pub risk_reward_tiers: ScoreTiers,
    /// Floats below this emit the low-float signal
    pub low_float_shares: f64,
    pub synergy_ceiling: f64,
    pub synergies: Vec<SynergyBonus>,
    pub gates: Vec<GateRule>,
    pub grades: Vec<GradeBand>,
}

impl Default for OracleWeights {
    fn default() -> Self {
        let keywords = [
            ("FDA", 30.0),
            ("approval", 25.0),
            ("breakthrough", 25.0),
            ("partnership", 20.0),
            ("acquisition", 25.0),
            ("patent", 15.0),
            ("settlement", 15.0),
            ("restructuring", 10.0),
            ("debt payoff", 15.0),
            ("earnings beat", 20.0),
            ("contract", 15.0),
            ("merger", 25.0),
        ];
        Self {
            max_score: 165.0,
            float_max: 25.0,
            float_tiers: ScoreTiers::descending(&[
                (5_000_000.0, 25.0),
                (10_000_000.0, 20.0),
                (20_000_000.0, 10.0),
            ]),
            volume_max: 20.0,
            volume_tiers: ScoreTiers::ascending(&[(5.0, 20.0), (3.0, 15.0), (2.0, 10.0)]),
            news_max: 30.0,
            news_items_considered: 5,
            news_keywords: keywords
                .iter()
                .map(|&(keyword, points)| CatalystKeyword {
                    keyword: keyword.to_string(),
                    points,
                })
                .collect(),
            sector_max: 15.0,
            sector_tiers: ScoreTiers::ascending(&[(0.9, 15.0), (0.7, 10.0), (0.5, 5.0)]),
            chart_max: 35.0,
            close_position_tiers: ScoreTiers::ascending(&[(0.95, 20.0), (0.9, 15.0), (0.8, 10.0)]),
            previous_runs_points: 10.0,
            clean_chart_points: 5.0,
            clean_chart_min_distance_pct: 0.10,
            risk_reward_max: 40.0,
            risk_reward_tiers: ScoreTiers::ascending(&[
                (10.0, 40.0),
                (7.0, 35.0),
                (5.0, 30.0),
                (3.0, 15.0),
            ]),
            low_float_shares: 10_000_000.0,
            synergy_ceiling: 15.0,
            synergies: vec![
                SynergyBonus::new(
                    "runner_with_catalyst",
                    &[signals::MULTIDAY_RUNNER, signals::NEWS_CATALYST],
                    10.0,
                ),
                SynergyBonus::new(
                    "low_float_surge",
                    &[signals::LOW_FLOAT, signals::VOLUME_SURGE],
                    8.0,
                ),
                SynergyBonus::new(
                    "squeeze_release_on_volume",
                    &[signals::SQUEEZE_FIRED, signals::VOLUME_SURGE],
                    6.0,
                ),
                SynergyBonus::new(
                    "red_to_green_catalyst",
                    &[signals::RED_TO_GREEN, signals::NEWS_CATALYST],
                    6.0,
                ),
            ],
            gates: vec![
                GateRule::at_least("min_risk_reward", GateMetric::RiskReward, 5.0),
                GateRule::at_most("max_float", GateMetric::FloatShares, 20_000_000.0),
                GateRule::at_least("min_volume_surge", GateMetric::VolumeSurge, 3.0),
            ],
            grades: vec![
                GradeBand::new(120.0, "A+", "EXCEPTIONAL"),
                GradeBand::new(100.0, "A", "EXCELLENT"),
                GradeBand::new(75.0, "A-", "STRONG"),
                GradeBand::new(60.0, "B+", "GOOD"),
                GradeBand::new(40.0, "B", "FAIR"),
                GradeBand::new(0.0, "C", "WEAK"),
            ],
        }
    }
}

/// Breakout (0-100) weights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakoutWeights {
    pub max_score: f64,
    pub nr_max: f64,
    pub nr7_points: f64,
    pub nr4_points: f64,
    pub obv_max: f64,
    pub obv_bullish_points: f64,
    pub obv_bearish_points: f64,
    pub squeeze_max: f64,
    pub squeeze_fired_points: f64,
    pub squeeze_on_points: f64,
    pub level_test_max: f64,
    pub level_test_strong_points: f64,
    pub level_test_points: f64,
    pub level_test_strong_touches: u32,
    pub volume_max: f64,
    pub volume_points: f64,
    pub pattern_max: f64,
    pub pattern_points: f64,
    pub synergy_ceiling: f64,
    pub synergies: Vec<SynergyBonus>,
    pub gates: Vec<GateRule>,
    pub grades: Vec<GradeBand>,
}

impl Default for BreakoutWeights {
    fn default() -> Self {
        Self {
            max_score: 100.0,
            nr_max: 20.0,
            nr7_points: 20.0,
            nr4_points: 12.0,
            obv_max: 20.0,
            obv_bullish_points: 20.0,
            obv_bearish_points: 10.0,
            squeeze_max: 25.0,
            squeeze_fired_points: 25.0,
            squeeze_on_points: 15.0,
            level_test_max: 15.0,
            level_test_strong_points: 15.0,
            level_test_points: 8.0,
            level_test_strong_touches: 3,
            volume_max: 10.0,
            volume_points: 10.0,
            pattern_max: 10.0,
            pattern_points: 10.0,
            synergy_ceiling: 10.0,
            synergies: vec![
                SynergyBonus::new("coiled_spring", &[signals::NR7, signals::SQUEEZE_ON], 8.0),
                SynergyBonus::new(
                    "accumulation_in_squeeze",
                    &["obv_divergence=BULLISH", signals::SQUEEZE_ON],
                    6.0,
                ),
                SynergyBonus::new(
                    "quiet_compression",
                    &[signals::VOLUME_CONTRACTION, signals::NR4],
                    5.0,
                ),
                SynergyBonus::new(
                    "pattern_at_level",
                    &[signals::CHART_PATTERN, signals::LEVEL_TEST],
                    5.0,
                ),
            ],
            gates: vec![
                GateRule::at_least("min_average_volume", GateMetric::AverageVolume, 100_000.0)
                    .advisory(),
            ],
            grades: vec![
                GradeBand::new(70.0, "VERY_HIGH", "Multiple signals aligned"),
                GradeBand::new(50.0, "HIGH", "Several signals present"),
                GradeBand::new(30.0, "MODERATE", "Developing setup"),
                GradeBand::new(0.0, "LOW", "Insufficient signals"),
            ],
        }
    }
}

/// Scoring engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub oracle: OracleWeights,
    pub breakout: BreakoutWeights,
    /// Multiplier when no category had input; 1.0 when all did
    pub quality_floor: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            oracle: OracleWeights::default(),
            breakout: BreakoutWeights::default(),
            quality_floor: 0.8,
        }
    }
}

/// Position sizing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    /// Fraction of account put at risk between entry and stop
    pub risk_fraction: f64,
    /// Position value cap as a fraction of account
    pub max_position_fraction: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            risk_fraction: 0.02,
            max_position_fraction: 0.25,
        }
    }
}

/// Everything a scan needs besides the series itself. Read-only once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub indicators: IndicatorConfig,
    pub patterns: PatternConfig,
    pub levels: LevelConfig,
    pub scoring: ScoringConfig,
    pub sizing: SizingConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            indicators: IndicatorConfig::default(),
            patterns: PatternConfig::default(),
            levels: LevelConfig::default(),
            scoring: ScoringConfig::default(),
            sizing: SizingConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Preset for liquid large caps: smaller gaps matter, float is irrelevant
    pub fn large_cap() -> Self {
        let mut config = Self::default();
        config.patterns.gap_threshold = 0.01;
        config.patterns.runner_volume_multiple = 2.0;
        config.patterns.runner_requires_catalyst = false;
        config.levels.bin_width = BinWidth::Percent(0.01);
        config.scoring.oracle.gates = vec![
            GateRule::at_least("min_risk_reward", GateMetric::RiskReward, 3.0),
            GateRule::at_least("min_volume_surge", GateMetric::VolumeSurge, 1.5).advisory(),
        ];
        config.scoring.oracle.volume_tiers =
            ScoreTiers::ascending(&[(3.0, 20.0), (2.0, 15.0), (1.5, 10.0)]);
        config
    }

    /// Preset for low-float small caps: wider gaps and bins, stricter float
    pub fn micro_cap() -> Self {
        let mut config = Self::default();
        config.patterns.gap_threshold = 0.05;
        config.levels.bin_width = BinWidth::Percent(0.03);
        config.levels.touch_tolerance_pct = 0.015;
        config.scoring.oracle.gates = vec![
            GateRule::at_least("min_risk_reward", GateMetric::RiskReward, 5.0),
            GateRule::at_most("max_float", GateMetric::FloatShares, 10_000_000.0),
            GateRule::at_least("min_volume_surge", GateMetric::VolumeSurge, 3.0),
        ];
        config
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| ScanError::DataLoadError(e.to_string()))?;
        let config: ScanConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_gap_threshold(mut self, threshold: f64) -> Self {
        self.patterns.gap_threshold = threshold;
        self
    }

    pub fn with_nr_tolerance(mut self, tolerance: f64) -> Self {
        self.patterns.nr_tolerance = tolerance;
        self
    }

    pub fn with_decay_rate(mut self, rate: f64) -> Self {
        self.levels.decay_rate = rate;
        self
    }

    pub fn with_bin_width(mut self, width: BinWidth) -> Self {
        self.levels.bin_width = width;
        self
    }

    pub fn with_min_risk_reward(mut self, ratio: f64) -> Self {
        for gate in &mut self.scoring.oracle.gates {
            if gate.metric == GateMetric::RiskReward {
                gate.threshold = ratio;
            }
        }
        self
    }

    pub fn without_catalyst_requirement(mut self) -> Self {
        self.patterns.runner_requires_catalyst = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let ind = &self.indicators;
        let periods = [
            ("rsi_period", ind.rsi_period),
            ("atr_period", ind.atr_period),
            ("adx_period", ind.adx_period),
            ("bb_period", ind.bb_period),
            ("kc_period", ind.kc_period),
            ("awesome_fast", ind.awesome_fast),
            ("awesome_slow", ind.awesome_slow),
            ("williams_period", ind.williams_period),
            ("volume_short_period", ind.volume_short_period),
            ("volume_long_period", ind.volume_long_period),
            ("pattern_lookback", self.patterns.pattern_lookback),
            ("obv_lookback", self.patterns.obv_lookback),
            ("relative_volume_period", self.patterns.relative_volume_period),
            ("level_lookback", self.levels.lookback),
        ];
        for (name, period) in periods {
            if period == 0 {
                return Err(ScanError::InvalidParameter(format!("{} must be > 0", name)));
            }
        }
        if ind.bb_period < 2 {
            return Err(ScanError::InvalidParameter(
                "bb_period must be >= 2 for a sample standard deviation".to_string(),
            ));
        }
        if ind.awesome_fast >= ind.awesome_slow {
            return Err(ScanError::InvalidParameter(
                "awesome_fast must be shorter than awesome_slow".to_string(),
            ));
        }

        let sq = &self.patterns;
        if !(sq.squeeze_extreme_ratio < sq.squeeze_high_ratio
            && sq.squeeze_high_ratio < sq.squeeze_moderate_ratio)
        {
            return Err(ScanError::InvalidParameter(
                "squeeze breakpoints must be strictly increasing".to_string(),
            ));
        }
        if sq.nr_tolerance < 0.0 || sq.gap_threshold <= 0.0 {
            return Err(ScanError::InvalidParameter(
                "nr_tolerance must be >= 0 and gap_threshold > 0".to_string(),
            ));
        }

        match self.levels.bin_width {
            BinWidth::Fixed(w) | BinWidth::Percent(w) if w <= 0.0 || !w.is_finite() => {
                return Err(ScanError::InvalidParameter(
                    "bin width must be positive".to_string(),
                ));
            }
            _ => {}
        }
        if self.levels.decay_rate < 0.0 {
            return Err(ScanError::InvalidParameter(
                "decay_rate must be >= 0".to_string(),
            ));
        }

        let oracle = &self.scoring.oracle;
        let breakout = &self.scoring.breakout;
        for bonus in oracle.synergies.iter().chain(breakout.synergies.iter()) {
            if bonus.requires.len() < 2 {
                return Err(ScanError::InvalidParameter(format!(
                    "synergy bonus '{}' needs at least two signals",
                    bonus.name
                )));
            }
        }
        for grades in [&oracle.grades, &breakout.grades] {
            if grades.is_empty() || grades.windows(2).any(|w| w[0].min_score <= w[1].min_score) {
                return Err(ScanError::InvalidParameter(
                    "grade bands must be non-empty and sorted by descending min_score".to_string(),
                ));
            }
        }
        if !(0.0..=1.0).contains(&self.scoring.quality_floor) {
            return Err(ScanError::InvalidParameter(
                "quality_floor must be within [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}
