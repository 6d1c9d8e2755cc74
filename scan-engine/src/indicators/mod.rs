pub mod adx;
pub mod atr;
pub mod awesome;
pub mod bollinger;
pub mod ema;
pub mod keltner;
pub mod obv;
pub mod regression;
pub mod rsi;
pub mod sma;
pub mod vwap;
pub mod williams;

pub use adx::{calculate_adx, DirectionalIndex};
pub use atr::{calculate_atr, true_range, true_ranges};
pub use awesome::calculate_awesome_oscillator;
pub use bollinger::{bandwidth, calculate_bollinger_bands, percent_b, BollingerBands};
pub use ema::{calculate_ema_with_sma_seed, ema_alpha};
pub use keltner::{calculate_keltner, is_squeeze, KeltnerChannels};
pub use obv::{calculate_obv, mean_abs_delta, normalized_obv_slope};
pub use regression::{linear_regression, linear_regression_endpoint, linear_regression_slope};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma_nan;
pub use vwap::{calculate_vwap, session_date};
pub use williams::calculate_williams_r;

use common::config::IndicatorConfig;
use common::names::indicators as keys;
use common::{IndicatorSet, IndicatorValue, Result, ScanError, Series};
use tracing::debug;

/// Store `result` under each name, or an unavailable/default marker when the
/// series was too short. Other errors are configuration errors and propagate.
fn record(
    set: &mut IndicatorSet,
    names: &[&str],
    default: Option<f64>,
    result: Result<Vec<Vec<f64>>>,
) -> Result<()> {
    match result {
        Ok(sequences) => {
            for (name, values) in names.iter().zip(sequences) {
                set.insert_sequence(name, values);
            }
            Ok(())
        }
        Err(ScanError::InsufficientData {
            indicator,
            required,
            actual,
        }) => {
            debug!(%indicator, required, actual, "indicator unavailable");
            for name in names {
                let value = match default {
                    Some(value) => IndicatorValue::Defaulted {
                        value,
                        required,
                        actual,
                    },
                    None => IndicatorValue::Unavailable { required, actual },
                };
                set.insert(name, value);
            }
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Pre-compute every indicator for a series
///
/// One missing indicator never prevents computing the rest; RSI and Williams %R
/// fall back to their documented defaults, everything else is marked unavailable.
pub fn compute_indicators(series: &Series, config: &IndicatorConfig) -> Result<IndicatorSet> {
    let highs = series.highs();
    let lows = series.lows();
    let closes = series.closes();
    let volumes = series.volumes();
    let mut set = IndicatorSet::new();

    record(
        &mut set,
        &[keys::RSI],
        Some(config.rsi_default),
        calculate_rsi(&closes, config.rsi_period).map(|v| vec![v]),
    )?;
    record(
        &mut set,
        &[keys::ATR],
        None,
        calculate_atr(&highs, &lows, &closes, config.atr_period).map(|v| vec![v]),
    )?;
    record(
        &mut set,
        &[keys::ADX, keys::PLUS_DI, keys::MINUS_DI, keys::DX],
        None,
        calculate_adx(&highs, &lows, &closes, config.adx_period)
            .map(|d| vec![d.adx, d.plus_di, d.minus_di, d.dx]),
    )?;
    record(
        &mut set,
        &[keys::BB_UPPER, keys::BB_MIDDLE, keys::BB_LOWER],
        None,
        calculate_bollinger_bands(&closes, config.bb_period, config.bb_std_dev)
            .map(|bb| vec![bb.upper, bb.middle, bb.lower]),
    )?;
    record(
        &mut set,
        &[keys::KC_UPPER, keys::KC_MIDDLE, keys::KC_LOWER],
        None,
        calculate_keltner(&highs, &lows, &closes, config.kc_period, config.kc_atr_multiplier)
            .map(|kc| vec![kc.upper, kc.middle, kc.lower]),
    )?;
    record(
        &mut set,
        &[keys::OBV],
        None,
        calculate_obv(&closes, &volumes).map(|v| vec![v]),
    )?;
    record(
        &mut set,
        &[keys::VWAP],
        None,
        calculate_vwap(series.bars(), config.session_utc_offset_minutes).map(|v| vec![v]),
    )?;
    record(
        &mut set,
        &[keys::AWESOME_OSCILLATOR],
        None,
        calculate_awesome_oscillator(&highs, &lows, config.awesome_fast, config.awesome_slow)
            .map(|v| vec![v]),
    )?;
    record(
        &mut set,
        &[keys::WILLIAMS_R],
        Some(config.williams_default),
        calculate_williams_r(&highs, &lows, &closes, config.williams_period).map(|v| vec![v]),
    )?;

    for (name, period) in [
        (keys::VOLUME_SMA_SHORT, config.volume_short_period),
        (keys::VOLUME_SMA_LONG, config.volume_long_period),
    ] {
        let result = if volumes.len() < period {
            Err(ScanError::insufficient(name, period, volumes.len()))
        } else {
            Ok(vec![calculate_sma_nan(&volumes, period)])
        };
        record(&mut set, &[name], None, result)?;
    }

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate_random_walk;

    #[test]
    fn test_full_series_has_every_indicator() {
        let series = Series::new(generate_random_walk(120, 50.0, 11)).unwrap();
        let set = compute_indicators(&series, &IndicatorConfig::default()).unwrap();

        for name in [keys::RSI, keys::ADX, keys::BB_UPPER, keys::KC_LOWER, keys::VWAP, keys::AWESOME_OSCILLATOR] {
            assert!(set.is_available(name), "{} missing", name);
            assert_eq!(set.sequence(name).unwrap().len(), 120);
        }
    }

    #[test]
    fn test_short_series_marks_unavailable_and_defaults() {
        let series = Series::new(generate_random_walk(10, 50.0, 3)).unwrap();
        let config = IndicatorConfig::default();
        let set = compute_indicators(&series, &config).unwrap();

        assert_eq!(set.latest(keys::RSI), Some(50.0));
        assert!(!set.is_available(keys::RSI));
        assert_eq!(set.latest(keys::WILLIAMS_R), Some(-50.0));
        assert!(matches!(
            set.get(keys::ADX),
            Some(IndicatorValue::Unavailable { required: 28, actual: 10 })
        ));
        assert!(set.get(keys::BB_UPPER).map(|v| !v.is_available()).unwrap_or(false));
        // short enough indicators still computed
        assert!(set.is_available(keys::OBV));
        assert!(set.is_available(keys::VWAP));
        assert!(set.is_available(keys::VOLUME_SMA_SHORT));
    }
}
