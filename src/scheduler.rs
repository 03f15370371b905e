use crate::candles::points_from_candles;
use crate::config::WatchConfig;
use crate::errors::Result;
use crate::levels::compute_levels;
use crate::market::MarketData;
use crate::store::LevelStore;
use crate::types::Resolution;
use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use tracing::{info, warn};

/// Per-instrument outcome of one batch run
#[derive(Debug)]
pub struct InstrumentReport {
    pub instrument: String,
    pub result: Result<BatchStats>,
}

/// What one instrument's task produced
#[derive(Debug, Clone)]
pub struct BatchStats {
    pub points: usize,
    pub week_levels: usize,
    pub month_levels: usize,
}

/// Compute and store levels for one instrument from its hourly history.
///
/// Week and Month frames are both derived from the seed-scale candles.
/// A persist failure is logged and does not fail the task; the levels are
/// already in the store.
pub fn compute_instrument(
    market: &dyn MarketData,
    store: &LevelStore,
    config: &WatchConfig,
    instrument: &str,
    now: DateTime<Utc>,
) -> Result<BatchStats> {
    let first = now - Duration::days(config.history_days);
    let candles = market.fetch_candles(instrument, &config.seed_scale, first, now)?;
    let points = points_from_candles(&candles);

    let week = compute_levels(&points, Resolution::Week, config.price_deviation);
    let month = compute_levels(&points, Resolution::Month, config.price_deviation);

    let stats = BatchStats {
        points: points.len(),
        week_levels: week.len(),
        month_levels: month.len(),
    };

    store.write(instrument, Resolution::Week, week);
    store.write(instrument, Resolution::Month, month);

    if let Err(e) = store.persist(instrument, &config.out_dir, now) {
        warn!("PERSIST failed for {}: {}", instrument, e);
    }

    Ok(stats)
}

/// Run the batch computation over the catalogue on the worker pool.
///
/// One task is scheduled per (instrument, scale) pair whose scale matches
/// the seed scale. The call returns only after every task has finished;
/// a failing task is reported and never takes its siblings down.
pub fn run_batch(
    market: &dyn MarketData,
    store: &LevelStore,
    config: &WatchConfig,
    instruments: &[String],
    scales: &[String],
    now: DateTime<Utc>,
) -> Vec<InstrumentReport> {
    let started = std::time::Instant::now();

    let tasks: Vec<&str> = instruments
        .iter()
        .flat_map(|instrument| {
            scales
                .iter()
                .filter(|scale| **scale == config.seed_scale)
                .map(move |_| instrument.as_str())
        })
        .collect();

    info!(
        "Scheduling {} tasks over {} instruments",
        tasks.len(),
        instruments.len()
    );

    let reports: Vec<InstrumentReport> = tasks
        .par_iter()
        .map(|instrument| {
            let result = compute_instrument(market, store, config, instrument, now);
            match &result {
                Ok(stats) => info!(
                    "Computed {}: {} points, {} week levels, {} month levels",
                    instrument, stats.points, stats.week_levels, stats.month_levels
                ),
                Err(e) => warn!("SKIP {}: {}", instrument, e),
            }
            InstrumentReport {
                instrument: instrument.to_string(),
                result,
            }
        })
        .collect();

    let succeeded = reports.iter().filter(|r| r.result.is_ok()).count();
    info!(
        "Batch finished: {}/{} tasks in {:.1}s",
        succeeded,
        reports.len(),
        started.elapsed().as_secs_f64()
    );

    reports
}
