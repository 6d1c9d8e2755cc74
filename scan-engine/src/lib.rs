pub mod data;
pub mod indicators;
pub mod levels;
pub mod patterns;
pub mod scanner;
pub mod scoring;
pub mod sizing;

pub use data::{generate_consolidation, generate_random_walk, generate_runner, load_file};
pub use indicators::compute_indicators;
pub use levels::{LevelCalculator, LevelSet, RiskReward};
pub use patterns::{PatternDetector, PatternReport};
pub use scanner::{ScanResult, Scanner};
pub use scoring::{BreakoutEngine, OracleEngine, ScoreEngine, ScoreInput};
pub use sizing::{calculate_position_size, PositionSize};

// Re-export common types
pub use common::{
    Bar, Direction, DirectionBias, GateResult, GateStatus, IndicatorSet, IndicatorValue, Level,
    MarketContext, NewsItem, Result, ScanConfig, ScanError, ScoreBreakdown, Series, Signal,
    SignalSet,
};
