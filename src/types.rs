use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV candle as exported by the terminal feed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// A single (time, price) observation on an instrument's history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub time: DateTime<Utc>,
    pub price: f64,
}

/// Detection timeframe. The frame is the window length in hourly points:
/// one trading day is 9 hourly bars, a week 5 days, a month 4 weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resolution {
    Day,
    Week,
    Month,
}

impl Resolution {
    /// Fixed iteration order used for scheduling and persisted artifacts
    pub const ALL: [Resolution; 3] = [Resolution::Day, Resolution::Week, Resolution::Month];

    /// Window length in points
    pub fn frame(&self) -> usize {
        match self {
            Resolution::Day => 9,
            Resolution::Week => 9 * 5,
            Resolution::Month => 9 * 5 * 4,
        }
    }

    /// Short label used in persisted artifacts and panels
    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Day => "D",
            Resolution::Week => "W",
            Resolution::Month => "M",
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "D" | "DAY" => Ok(Resolution::Day),
            "W" | "WEEK" => Ok(Resolution::Week),
            "M" | "MONTH" => Ok(Resolution::Month),
            other => Err(format!("unknown resolution: {}", other)),
        }
    }
}

/// A turning point straight out of the window scan, before clustering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawLevel {
    pub time: DateTime<Utc>,
    pub price: f64,
}

/// A clustered support/resistance level
///
/// `strength` counts the raw detections merged into this level, the level
/// itself included, so it is always >= 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub time: DateTime<Utc>,
    pub price: f64,
    pub strength: u32,
}

impl Level {
    /// Render the level line used by persisted artifacts and the live panel.
    /// `alive` is whole days elapsed between the detection time and `now`.
    pub fn format_at(&self, now: DateTime<Utc>) -> String {
        let alive = (now - self.time).num_days();
        format!(
            "price: {:.2} since: {} alive: {:>3} power: {}",
            self.price,
            self.time.format("%y.%m.%d"),
            alive,
            self.strength
        )
    }
}
