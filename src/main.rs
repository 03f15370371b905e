use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use level_watch::{
    catalog, run_batch, ConsoleSink, FileMarket, LevelStore, Monitor, SystemClock, WatchConfig,
};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "level-watch")]
#[command(about = "Support/resistance level detection and live price monitoring")]
struct Args {
    /// Directory the terminal exporter drops candle and quote files into
    #[arg(short, long, env = "LEVEL_WATCH_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Output directory for persisted level artifacts
    #[arg(short, long, env = "LEVEL_WATCH_OUT_DIR", default_value = "levels")]
    out_dir: PathBuf,

    /// Instrument catalogue, one ticker per line
    #[arg(long, default_value = "assets.txt")]
    instruments: PathBuf,

    /// Scale catalogue, one scale per line
    #[arg(long, default_value = "scales.txt")]
    scales: PathBuf,

    /// Compute and persist levels, then exit without monitoring
    #[arg(long)]
    batch_only: bool,

    /// Print verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = WatchConfig {
        data_dir: args.data_dir,
        out_dir: args.out_dir,
        ..WatchConfig::default()
    };

    let instruments = catalog::load_instruments(&args.instruments)
        .context("Failed to load instrument catalogue")?;
    let scales =
        catalog::load_scales(&args.scales).context("Failed to load scale catalogue")?;

    info!(
        "Loaded {} instrument(s), {} scale(s)",
        instruments.len(),
        scales.len()
    );

    std::fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("Failed to create output dir {:?}", config.out_dir))?;

    let market = FileMarket::new(&config.data_dir);
    let store = LevelStore::new();

    info!("=== BATCH ===");
    let reports = run_batch(&market, &store, &config, &instruments, &scales, Utc::now());
    let failed = reports.iter().filter(|r| r.result.is_err()).count();
    if failed > 0 {
        warn!("{} task(s) failed during the batch", failed);
    }

    if args.batch_only {
        info!("Batch-only run complete");
        return Ok(());
    }

    info!("=== MONITOR ===");
    let mut sink = ConsoleSink::new();
    let mut monitor = Monitor::new(&market, &store, &config);
    monitor.run(&mut sink, &SystemClock);

    Ok(())
}
