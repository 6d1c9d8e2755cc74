use chrono::{DateTime, Duration, TimeZone, Utc};
use common::Bar;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Daily bars are stamped at the 20:00 UTC close starting from this date,
/// so generated series never depend on the wall clock.
fn start_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 20, 0, 0)
        .single()
        .unwrap_or_default()
}

fn make_bar(rng: &mut StdRng, timestamp: DateTime<Utc>, open: f64, close: f64, range_pct: f64, volume: f64) -> Bar {
    let range = open.max(close) * range_pct;
    let high = open.max(close) + rng.gen_range(0.0..=range / 2.0);
    let low = (open.min(close) - rng.gen_range(0.0..=range / 2.0)).max(0.01);
    Bar::new(timestamp, open, high, low, close, volume.max(1.0) as u64)
}

/// Daily random walk with volume loosely tied to the size of the move
pub fn generate_random_walk(days: usize, initial_price: f64, seed: u64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bars = Vec::with_capacity(days);
    let mut price = initial_price;
    let start = start_date();

    let daily_volatility = 0.03;
    let drift = 0.0005;

    for i in 0..days {
        let daily_return = drift + daily_volatility * rng.gen_range(-1.0..1.0);
        let open = price * (1.0 + rng.gen_range(-0.005..0.005));
        let close = (price * (1.0 + daily_return)).max(0.01);

        let volume = 2_000_000.0 * (1.0 + daily_return.abs() * 10.0) * rng.gen_range(0.8..1.2);
        let range_pct = rng.gen_range(0.01..0.04);
        bars.push(make_bar(&mut rng, start + Duration::days(i as i64), open, close, range_pct, volume));
        price = close;
    }

    bars
}

/// A trending stretch followed by `quiet_days` of shrinking range and volume,
/// the shape that produces NR days, a squeeze and volume contraction.
pub fn generate_consolidation(trend_days: usize, quiet_days: usize, initial_price: f64, seed: u64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bars = Vec::with_capacity(trend_days + quiet_days);
    let mut price = initial_price;
    let start = start_date();

    for i in 0..trend_days {
        let open = price;
        let close = price * (1.0 + rng.gen_range(-0.03..0.045));
        let volume = 3_000_000.0 * rng.gen_range(0.8..1.2);
        bars.push(make_bar(&mut rng, start + Duration::days(i as i64), open, close, 0.04, volume));
        price = close;
    }

    for j in 0..quiet_days {
        let fade = 1.0 - j as f64 / (quiet_days as f64 + 1.0);
        let open = price;
        let close = price * (1.0 + rng.gen_range(-0.004..0.004) * fade);
        let volume = 3_000_000.0 * (0.3 + 0.5 * fade);
        bars.push(make_bar(
            &mut rng,
            start + Duration::days((trend_days + j) as i64),
            open,
            close,
            0.008 * fade + 0.001,
            volume,
        ));
        price = close;
    }

    bars
}

/// Quiet base ending in a first green day that closes at its high on a
/// `volume_multiple` surge over the base's average volume.
pub fn generate_runner(base_days: usize, initial_price: f64, volume_multiple: f64, seed: u64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bars = Vec::with_capacity(base_days + 1);
    let mut price = initial_price;
    let start = start_date();
    let base_volume = 1_000_000.0;

    for i in 0..base_days {
        // Base drifts lower so the last base day is red
        let open = price;
        let close = price * (1.0 - rng.gen_range(0.0..0.01));
        bars.push(make_bar(&mut rng, start + Duration::days(i as i64), open, close, 0.02, base_volume));
        price = close;
    }

    let open = price;
    let close = price * 1.25;
    bars.push(Bar::new(
        start + Duration::days(base_days as i64),
        open,
        close,
        open * 0.98,
        close,
        (base_volume * volume_multiple) as u64,
    ));

    bars
}

/// Intraday bars for `sessions` consecutive days, `bars_per_session` minutes each
/// from 14:30 UTC.
pub fn generate_intraday(sessions: usize, bars_per_session: usize, initial_price: f64, seed: u64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bars = Vec::with_capacity(sessions * bars_per_session);
    let mut price = initial_price;
    let open_time = start_date() - Duration::minutes(330);

    for day in 0..sessions {
        let session_start = open_time + Duration::days(day as i64);
        for m in 0..bars_per_session {
            let open = price;
            let close = price * (1.0 + rng.gen_range(-0.002..0.002));
            let volume = rng.gen_range(5_000.0..20_000.0);
            bars.push(make_bar(
                &mut rng,
                session_start + Duration::minutes(m as i64),
                open,
                close,
                0.002,
                volume,
            ));
            price = close;
        }
    }

    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Series;

    fn assert_well_formed(bars: &[Bar]) {
        for bar in bars {
            assert!(bar.high >= bar.low);
            assert!(bar.high >= bar.open && bar.high >= bar.close);
            assert!(bar.low <= bar.open && bar.low <= bar.close);
            assert!(bar.volume > 0);
        }
        assert!(Series::new(bars.to_vec()).is_ok());
    }

    #[test]
    fn test_random_walk_is_reproducible() {
        let a = generate_random_walk(100, 50.0, 9);
        let b = generate_random_walk(100, 50.0, 9);
        assert_eq!(a.len(), 100);
        assert_eq!(a, b);
        assert_well_formed(&a);
    }

    #[test]
    fn test_consolidation_narrows() {
        let bars = generate_consolidation(40, 20, 20.0, 5);
        assert_eq!(bars.len(), 60);
        assert_well_formed(&bars);

        let trend_avg: f64 = bars[..40].iter().map(Bar::range).sum::<f64>() / 40.0;
        let quiet_avg: f64 = bars[50..].iter().map(Bar::range).sum::<f64>() / 10.0;
        assert!(quiet_avg < trend_avg);
        assert!(bars[59].volume < bars[10].volume);
    }

    #[test]
    fn test_runner_day() {
        let bars = generate_runner(30, 5.0, 4.0, 1);
        assert_well_formed(&bars);
        let last = bars.last().unwrap();
        assert!(last.is_green());
        assert_eq!(last.close_position(), Some(1.0));
        assert!(!bars[29].is_green());
    }

    #[test]
    fn test_intraday_sessions() {
        let bars = generate_intraday(2, 390, 10.0, 3);
        assert_eq!(bars.len(), 780);
        assert_well_formed(&bars);
        assert_ne!(bars[0].timestamp.date_naive(), bars[390].timestamp.date_naive());
    }
}
