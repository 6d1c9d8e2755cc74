//! Fixed keys shared by the engine, the configuration tables and callers.

/// Keys of an `IndicatorSet`.
pub mod indicators {
    pub const RSI: &str = "rsi";
    pub const ATR: &str = "atr";
    pub const ADX: &str = "adx";
    pub const PLUS_DI: &str = "plus_di";
    pub const MINUS_DI: &str = "minus_di";
    pub const DX: &str = "dx";
    pub const BB_UPPER: &str = "bb_upper";
    pub const BB_MIDDLE: &str = "bb_middle";
    pub const BB_LOWER: &str = "bb_lower";
    pub const KC_UPPER: &str = "kc_upper";
    pub const KC_MIDDLE: &str = "kc_middle";
    pub const KC_LOWER: &str = "kc_lower";
    pub const OBV: &str = "obv";
    pub const VWAP: &str = "vwap";
    pub const AWESOME_OSCILLATOR: &str = "awesome_oscillator";
    pub const WILLIAMS_R: &str = "williams_r";
    pub const VOLUME_SMA_SHORT: &str = "volume_sma_short";
    pub const VOLUME_SMA_LONG: &str = "volume_sma_long";
}

/// Names of signals, usable in synergy requirements.
pub mod signals {
    pub const NR4: &str = "nr4";
    pub const NR7: &str = "nr7";
    pub const GAP_DAY: &str = "gap_day";
    pub const NARROW_STREAK: &str = "narrow_range_streak";
    pub const SQUEEZE_ON: &str = "squeeze_on";
    pub const SQUEEZE_FIRED: &str = "squeeze_fired";
    pub const SQUEEZE_INTENSITY: &str = "squeeze_intensity";
    pub const SQUEEZE_MOMENTUM: &str = "squeeze_momentum";
    pub const VOLUME_CONTRACTION: &str = "volume_contraction";
    pub const VOLUME_PATTERN: &str = "volume_pattern";
    pub const VOLUME_SURGE: &str = "volume_surge";
    pub const OBV_DIVERGENCE: &str = "obv_divergence";
    pub const CHART_PATTERN: &str = "chart_pattern";
    pub const LEVEL_TEST: &str = "level_test";
    pub const MULTIDAY_RUNNER: &str = "multiday_runner";
    pub const RED_TO_GREEN: &str = "red_to_green";
    pub const NEWS_CATALYST: &str = "news_catalyst";
    pub const LOW_FLOAT: &str = "low_float";
}
