use crate::candles;
use crate::errors::{Result, WatchError};
use crate::types::Candle;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::path::PathBuf;

/// Synchronous market-data source used by the batch phase and the monitor
pub trait MarketData: Send + Sync {
    /// Historical candles for an instrument at a scale, within `[first, last]`
    fn fetch_candles(
        &self,
        instrument: &str,
        scale: &str,
        first: DateTime<Utc>,
        last: DateTime<Utc>,
    ) -> Result<Vec<Candle>>;

    /// Latest traded price for an instrument
    fn current_price(&self, instrument: &str) -> Result<f64>;
}

/// Flat-file market source
///
/// A terminal-side exporter drops `{instrument}_{scale}` candle files and
/// `{instrument}.price` quote files into a single directory. Candle files
/// may be plain or zstd-compressed.
pub struct FileMarket {
    dir: PathBuf,
}

const CANDLE_EXTENSIONS: [&str; 3] = ["txt", "csv", "csv.zst"];

impl FileMarket {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn candle_path(&self, instrument: &str, scale: &str) -> Option<PathBuf> {
        let stem = format!("{}_{}", instrument, scale);
        CANDLE_EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", stem, ext)))
            .find(|path| path.exists())
    }
}

impl MarketData for FileMarket {
    fn fetch_candles(
        &self,
        instrument: &str,
        scale: &str,
        first: DateTime<Utc>,
        last: DateTime<Utc>,
    ) -> Result<Vec<Candle>> {
        let path = self.candle_path(instrument, scale).ok_or_else(|| {
            WatchError::fetch(
                instrument,
                format!("no candle file for scale {} in {}", scale, self.dir.display()),
            )
        })?;

        let file = File::open(&path)
            .map_err(|e| WatchError::fetch(instrument, format!("{}: {}", path.display(), e)))?;

        let candles = if path.extension().map_or(false, |ext| ext == "zst") {
            candles::parse_candles_zst(file)?
        } else {
            candles::parse_candles(file)?
        };

        Ok(candles
            .into_iter()
            .filter(|c| c.time >= first && c.time <= last)
            .collect())
    }

    fn current_price(&self, instrument: &str) -> Result<f64> {
        let path = self.dir.join(format!("{}.price", instrument));
        let text = std::fs::read_to_string(&path)
            .map_err(|e| WatchError::fetch(instrument, format!("{}: {}", path.display(), e)))?;

        text.trim()
            .parse::<f64>()
            .map_err(|e| WatchError::fetch(instrument, format!("bad quote '{}': {}", text.trim(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    const SAMPLE: &str = "04/03/24,10:00:00,100.0,101.5,99.5,101.0,1200\n\
                          05/03/24,10:00:00,101.0,102.0,100.5,101.8,900\n\
                          06/03/24,10:00:00,101.8,103.0,101.0,102.5,1100\n";

    fn wide_range() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_fetch_plain_candles() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("SBER_M60.txt"), SAMPLE).unwrap();

        let market = FileMarket::new(dir.path());
        let (first, last) = wide_range();
        let candles = market.fetch_candles("SBER", "M60", first, last).unwrap();
        assert_eq!(candles.len(), 3);
        assert_eq!(candles[2].close, 102.5);
    }

    #[test]
    fn test_fetch_filters_range() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("SBER_M60.txt"), SAMPLE).unwrap();

        let market = FileMarket::new(dir.path());
        let first = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        let last = Utc.with_ymd_and_hms(2024, 3, 5, 23, 59, 59).unwrap();
        let candles = market.fetch_candles("SBER", "M60", first, last).unwrap();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].close, 101.8);
    }

    #[test]
    fn test_fetch_compressed_candles() {
        let dir = tempfile::tempdir().unwrap();
        let compressed = zstd::stream::encode_all(SAMPLE.as_bytes(), 0).unwrap();
        let mut file = std::fs::File::create(dir.path().join("SBER_M60.csv.zst")).unwrap();
        file.write_all(&compressed).unwrap();

        let market = FileMarket::new(dir.path());
        let (first, last) = wide_range();
        let candles = market.fetch_candles("SBER", "M60", first, last).unwrap();
        assert_eq!(candles.len(), 3);
    }

    #[test]
    fn test_fetch_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let market = FileMarket::new(dir.path());
        let (first, last) = wide_range();
        let err = market.fetch_candles("SBER", "M60", first, last).unwrap_err();
        assert!(matches!(err, WatchError::Fetch { .. }));
    }

    #[test]
    fn test_current_price() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("SBER.price"), "250.37\n").unwrap();

        let market = FileMarket::new(dir.path());
        assert_eq!(market.current_price("SBER").unwrap(), 250.37);
    }

    #[test]
    fn test_current_price_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("SBER.price"), "n/a\n").unwrap();

        let market = FileMarket::new(dir.path());
        let err = market.current_price("SBER").unwrap_err();
        assert!(matches!(err, WatchError::Fetch { .. }));
    }
}
