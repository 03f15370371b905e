// Library crate - exports the level engine, store, scheduler and monitor

pub mod candles;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod levels;
pub mod market;
pub mod monitor;
pub mod scheduler;
pub mod sink;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use types::*;
pub use config::WatchConfig;
pub use errors::WatchError;
pub use market::{FileMarket, MarketData};
pub use monitor::{Clock, Monitor, SystemClock};
pub use scheduler::run_batch;
pub use sink::{ConsoleSink, PresentationSink};
pub use store::LevelStore;
