//! One-shot scan: compute and print levels for a single instrument

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use level_watch::candles::points_from_candles;
use level_watch::levels::compute_levels;
use level_watch::{FileMarket, MarketData, Resolution, WatchConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scan-levels")]
#[command(about = "Compute support/resistance levels for one instrument")]
struct Args {
    /// Instrument ticker, e.g. SBER
    instrument: String,

    /// Resolution to scan: D, W or M
    #[arg(short, long, default_value = "M")]
    resolution: Resolution,

    /// Directory with exported candle files
    #[arg(short, long, env = "LEVEL_WATCH_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Candle scale to read
    #[arg(short, long, default_value = "M60")]
    scale: String,

    /// Emit the levels as JSON instead of the panel layout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = WatchConfig::default();
    let market = FileMarket::new(&args.data_dir);

    let now = Utc::now();
    let first = now - Duration::days(config.history_days);
    let candles = market
        .fetch_candles(&args.instrument, &args.scale, first, now)
        .context("Failed to read candles")?;
    let points = points_from_candles(&candles);
    let levels = compute_levels(&points, args.resolution, config.price_deviation);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&levels)?);
        return Ok(());
    }

    println!("[{}] resolution: {}\n", args.instrument, args.resolution);
    for level in &levels {
        println!("{}", level.format_at(now));
    }
    println!();

    Ok(())
}
