use crate::errors::{Result, WatchError};
use crate::types::{Level, Resolution};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::RwLock;

/// Thread-safe repository of computed levels
///
/// One coarse lock covers the whole table. Writers replace an instrument's
/// list for a resolution wholesale, so readers never observe a partially
/// updated list; snapshots clone under the shared lock.
pub struct LevelStore {
    levels: RwLock<BTreeMap<String, HashMap<Resolution, Vec<Level>>>>,
}

impl LevelStore {
    pub fn new() -> Self {
        Self {
            levels: RwLock::new(BTreeMap::new()),
        }
    }

    /// Replace an instrument's levels at one resolution
    pub fn write(&self, instrument: &str, resolution: Resolution, levels: Vec<Level>) {
        let mut table = self.levels.write().expect("level table lock poisoned");
        table
            .entry(instrument.to_string())
            .or_default()
            .insert(resolution, levels);
    }

    /// Clone everything stored for an instrument
    pub fn snapshot(&self, instrument: &str) -> Option<HashMap<Resolution, Vec<Level>>> {
        let table = self.levels.read().expect("level table lock poisoned");
        table.get(instrument).cloned()
    }

    /// Instruments currently held, in sorted order
    pub fn instruments(&self) -> Vec<String> {
        let table = self.levels.read().expect("level table lock poisoned");
        table.keys().cloned().collect()
    }

    /// Write an instrument's levels to `{dir}/{instrument}.txt`.
    ///
    /// Sections appear in Day, Week, Month order, each a header line, a
    /// blank line, one line per level and a closing blank line. An
    /// instrument with nothing stored writes no file. Failures leave the
    /// in-memory table untouched and valid.
    pub fn persist(&self, instrument: &str, dir: &Path, now: DateTime<Utc>) -> Result<()> {
        let text = {
            let table = self.levels.read().expect("level table lock poisoned");
            let Some(by_resolution) = table.get(instrument) else {
                return Ok(());
            };
            render_sections(instrument, by_resolution, now)
        };

        let path = dir.join(format!("{}.txt", instrument));
        std::fs::write(&path, text).map_err(|e| WatchError::Persist {
            path: path.display().to_string(),
            source: e,
        })
    }
}

impl Default for LevelStore {
    fn default() -> Self {
        Self::new()
    }
}

fn render_sections(
    instrument: &str,
    by_resolution: &HashMap<Resolution, Vec<Level>>,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    for resolution in Resolution::ALL {
        if let Some(levels) = by_resolution.get(&resolution) {
            out.push_str(&format!("[{}] resolution: {}\n\n", instrument, resolution));
            for level in levels {
                out.push_str(&level.format_at(now));
                out.push('\n');
            }
            out.push('\n');
        }
    }
    out
}
