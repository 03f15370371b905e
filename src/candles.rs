use crate::errors::{Result, WatchError};
use crate::types::{Candle, Point};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::io::{BufReader, Read};

/// Datetime layout used by the terminal export, e.g. `05/03/24 10:00:00`
const CANDLE_TIME_FORMAT: &str = "%d/%m/%y %H:%M:%S";

/// CSV row as exported: date,time,open,high,low,close,volume
#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

/// Parse candle records from a plain-text reader
///
/// Any malformed record aborts the parse with the offending line in the
/// error, so one instrument's bad export never poisons the batch silently.
pub fn parse_candles<R: Read>(reader: R) -> Result<Vec<Candle>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut candles = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|e| WatchError::Parse(format!("bad candle record: {}", e)))?;
        let row: CsvRow = record
            .deserialize(None)
            .map_err(|_| WatchError::Parse(format!("bad candle record: {}", join_record(&record))))?;
        candles.push(row_to_candle(row)?);
    }
    Ok(candles)
}

/// Parse candle records from a zstd-compressed reader
pub fn parse_candles_zst<R: Read>(reader: R) -> Result<Vec<Candle>> {
    let decoder = zstd::stream::Decoder::new(reader)
        .map_err(|e| WatchError::Parse(format!("zstd decoder: {}", e)))?;
    parse_candles(BufReader::new(decoder))
}

/// Collapse candles to their close prices for the level scan
pub fn points_from_candles(candles: &[Candle]) -> Vec<Point> {
    candles
        .iter()
        .map(|c| Point {
            time: c.time,
            price: c.close,
        })
        .collect()
}

fn row_to_candle(row: CsvRow) -> Result<Candle> {
    let stamp = format!("{} {}", row.date, row.time);
    let time = NaiveDateTime::parse_from_str(&stamp, CANDLE_TIME_FORMAT)
        .map_err(|e| WatchError::Parse(format!("bad candle time '{}': {}", stamp, e)))?
        .and_utc();
    Ok(Candle {
        time,
        open: row.open,
        high: row.high,
        low: row.low,
        close: row.close,
        volume: row.volume,
    })
}

fn join_record(record: &csv::StringRecord) -> String {
    record.iter().collect::<Vec<_>>().join(",")
}
