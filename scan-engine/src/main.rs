use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use rayon::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use scan_engine::{
    generate_random_walk, load_file, MarketContext, ScanConfig, ScanResult, Scanner, Series,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    Default,
    LargeCap,
    MicroCap,
}

#[derive(Parser, Debug)]
#[command(name = "oracle-scan")]
#[command(version = "0.1.0")]
#[command(about = "Scores stock setups from OHLCV bars: Oracle (0-165) and breakout (0-100)", long_about = None)]
struct Args {
    /// Data file path (CSV/JSON), repeatable. Without one, scans synthetic data.
    #[arg(short = 'f', long)]
    data_file: Vec<PathBuf>,

    /// Number of synthetic daily bars
    #[arg(short, long, default_value = "120")]
    days: usize,

    /// Initial price for synthetic data
    #[arg(long, default_value = "12.0")]
    initial_price: f64,

    /// Seed for synthetic data
    #[arg(long, default_value = "42")]
    seed: u64,

    /// JSON file overriding configuration values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Threshold preset, ignored when --config is given
    #[arg(long, value_enum, default_value = "default")]
    preset: Preset,

    /// Tradable float in shares
    #[arg(long)]
    float_shares: Option<f64>,

    /// Sector momentum in [0, 1]
    #[arg(long)]
    sector_momentum: Option<f64>,

    /// News headline, most recent first; repeatable
    #[arg(long)]
    headline: Vec<String>,

    /// Number of earlier multi-day runs
    #[arg(long, default_value = "0")]
    previous_runs: u32,

    /// Account value for position sizing
    #[arg(long)]
    account: Option<f64>,

    /// Output format (json, text)
    #[arg(short, long, default_value = "json")]
    output: String,

    /// Pretty print JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            ScanConfig::from_json_file(path)?
        }
        None => match args.preset {
            Preset::Default => ScanConfig::default(),
            Preset::LargeCap => ScanConfig::large_cap(),
            Preset::MicroCap => ScanConfig::micro_cap(),
        },
    };

    let mut scanner = Scanner::new(config)?;
    if let Some(account) = args.account {
        scanner = scanner.with_account(account);
    }

    let mut context = MarketContext {
        float_shares: args.float_shares,
        sector_momentum: args.sector_momentum,
        previous_multiday_runs: args.previous_runs,
        ..Default::default()
    };
    for headline in &args.headline {
        context = context.with_headline(headline);
    }

    let results: Vec<ScanResult> = if args.data_file.is_empty() {
        info!(
            days = args.days,
            initial_price = args.initial_price,
            seed = args.seed,
            "generating synthetic data"
        );
        let series = Series::new(generate_random_walk(args.days, args.initial_price, args.seed))?;
        vec![scanner.scan("SYNTH", &series, &context)?]
    } else {
        let scanned: Vec<_> = args
            .data_file
            .par_iter()
            .map(|path| {
                let ticker = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("UNKNOWN")
                    .to_uppercase();
                load_file(path).and_then(|series| scanner.scan(&ticker, &series, &context))
            })
            .collect();

        let mut ok = Vec::with_capacity(scanned.len());
        for (path, result) in args.data_file.iter().zip(scanned) {
            match result {
                Ok(r) => ok.push(r),
                Err(e) => warn!(path = %path.display(), error = %e, "scan failed"),
            }
        }
        if ok.is_empty() {
            bail!("no file could be scanned");
        }
        ok
    };

    match args.output.as_str() {
        "json" => {
            let json = if args.pretty {
                serde_json::to_string_pretty(&results)?
            } else {
                serde_json::to_string(&results)?
            };
            println!("{}", json);
        }
        "text" => results.iter().for_each(print_text_report),
        _ => {
            warn!(format = %args.output, "unknown output format, using text");
            results.iter().for_each(print_text_report);
        }
    }

    Ok(())
}

fn print_text_report(result: &ScanResult) {
    let oracle = &result.oracle;
    let breakout = &result.breakout;

    println!();
    println!("================================================================");
    println!("  SCAN REPORT - {}", result.ticker);
    println!("================================================================");
    println!();
    println!("  As of:            {}", result.as_of.format("%Y-%m-%d %H:%M UTC"));
    println!("  Last Close:       ${:>12.2}", result.last_close);
    println!("  Bars:             {:>12}", result.bars);
    println!();
    println!("----------------------------------------------------------------");
    println!("  ORACLE SCORE");
    println!("----------------------------------------------------------------");
    println!(
        "  Total:            {:>8.1} / {:.0}  ({}, {})",
        oracle.total, oracle.max_score, oracle.grade, oracle.confidence
    );
    for (name, category) in &oracle.categories {
        let marker = if category.available { "" } else { "  (no data)" };
        println!(
            "  {:<18}{:>8.1} / {:.0}{}",
            name, category.earned, category.max, marker
        );
    }
    println!(
        "  Synergy:          {:>8.1} / {:.0}  {:?}",
        oracle.synergy_points, oracle.synergy_ceiling, oracle.applied_bonuses
    );
    println!("  Quality:          {:>8.3}", oracle.quality_multiplier);
    for gate in &oracle.gates {
        let observed = gate
            .observed
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "  Gate {:<20} {:?} (observed {}, threshold {})",
            gate.name, gate.status, observed, gate.threshold
        );
    }
    if oracle.disqualified {
        println!("  DISQUALIFIED:     {}", oracle.failed_gates().join(", "));
    }
    println!();
    println!("----------------------------------------------------------------");
    println!("  BREAKOUT SCORE");
    println!("----------------------------------------------------------------");
    println!(
        "  Total:            {:>8.1} / {:.0}  ({})",
        breakout.total, breakout.max_score, breakout.grade
    );
    for (name, category) in &breakout.categories {
        println!("  {:<18}{:>8.1} / {:.0}", name, category.earned, category.max);
    }
    println!(
        "  Direction:        {:?} ({} bull / {} bear)",
        result.direction.direction, result.direction.bullish_votes, result.direction.bearish_votes
    );
    for reason in &result.direction.reasons {
        println!("    - {}", reason);
    }
    println!();
    println!("----------------------------------------------------------------");
    println!("  LEVELS");
    println!("----------------------------------------------------------------");
    for level in result.levels.resistances.iter().take(3).rev() {
        println!("  R {:<16}${:>10.2}  strength {:.2}", level.label, level.price, level.strength);
    }
    for level in result.levels.supports.iter().take(3) {
        println!("  S {:<16}${:>10.2}  strength {:.2}", level.label, level.price, level.strength);
    }
    if let Some(ratio) = result.levels.risk_reward.and_then(|rr| rr.ratio) {
        println!("  Risk/Reward:      {:>12.2}", ratio);
    }
    if let Some(position) = &result.position {
        println!(
            "  Position:         {:>12} shares (${:.2}, risk {:.2}%)",
            position.shares, position.position_value, position.risk_percent
        );
    }
    println!();
    println!("  Active signals:   {}", result.signals.active_names().join(", "));
    println!();
    println!("================================================================");
}
