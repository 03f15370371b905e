//! Configuration for the batch computation and the live monitor

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration shared by the batch phase and the monitor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Relative deviation for clustering and for flagging a level active
    pub price_deviation: f64,

    /// Relative offset for the stop band shown on the quote panel
    pub price_limit: f64,

    /// Candle scale the batch computes from (hourly bars feed every frame)
    pub seed_scale: String,

    /// Trailing history window fetched per instrument, in days
    pub history_days: i64,

    /// Session hours: start hour (exchange local time)
    pub start_hour: u32,

    /// Session hours: start minute
    pub start_minute: u32,

    /// Session hours: end hour
    pub end_hour: u32,

    /// Session hours: end minute
    pub end_minute: u32,

    /// Exchange timezone the session window is expressed in
    pub session_tz: Tz,

    /// Minimum seconds between proximity alerts
    pub alert_cooldown_secs: u64,

    /// Directory the market collaborator drops candle and quote files into
    pub data_dir: PathBuf,

    /// Directory persisted level artifacts are written to
    pub out_dir: PathBuf,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            price_deviation: 0.0025, // 0.25% proximity band
            price_limit: 0.01,       // 1% stop band on the panel
            seed_scale: "M60".to_string(),
            history_days: 365,
            start_hour: 10,
            start_minute: 0,
            end_hour: 23,
            end_minute: 50, // evening clearing cutoff
            session_tz: chrono_tz::Europe::Moscow,
            alert_cooldown_secs: 60,
            data_dir: PathBuf::from("data"),
            out_dir: PathBuf::from("levels"),
        }
    }
}

impl WatchConfig {
    /// Check if the session is open at the given exchange-local wall time.
    /// Start is inclusive, end exclusive.
    pub fn is_session_open(&self, hour: u32, minute: u32) -> bool {
        let current = hour * 60 + minute;
        let start = self.start_hour * 60 + self.start_minute;
        let end = self.end_hour * 60 + self.end_minute;
        current >= start && current < end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_window() {
        let config = WatchConfig::default();

        // Before open
        assert!(!config.is_session_open(0, 0));
        assert!(!config.is_session_open(9, 59));

        // During session
        assert!(config.is_session_open(10, 0));
        assert!(config.is_session_open(15, 30));
        assert!(config.is_session_open(23, 49));

        // After close
        assert!(!config.is_session_open(23, 50));
        assert!(!config.is_session_open(23, 59));
    }
}
