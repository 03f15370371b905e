/// Failure taxonomy for the engine
///
/// `Config` is fatal during startup. `Fetch` and `Parse` abort a single
/// instrument's batch task and leave the rest of the batch running.
/// `Persist` is logged and the in-memory levels stay valid.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("config: {0}")]
    Config(String),

    #[error("fetch {instrument}: {reason}")]
    Fetch { instrument: String, reason: String },

    #[error("parse: {0}")]
    Parse(String),

    #[error("persist {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl WatchError {
    pub fn fetch(instrument: impl Into<String>, reason: impl Into<String>) -> Self {
        WatchError::Fetch {
            instrument: instrument.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, WatchError>;
