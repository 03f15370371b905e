use crate::errors::{Result, WatchError};
use std::path::Path;

/// Load the newline-delimited instrument catalogue.
/// Read once at startup; an unreadable file is fatal.
pub fn load_instruments(path: &Path) -> Result<Vec<String>> {
    read_lines(path)
}

/// Load the newline-delimited scale catalogue (e.g. `M60`)
pub fn load_scales(path: &Path) -> Result<Vec<String>> {
    read_lines(path)
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| WatchError::Config(format!("catalogue {}: {}", path.display(), e)))?;
    // Entries are kept verbatim; a blank line is an empty entry and the
    // batch isolates whatever fails downstream of it.
    Ok(text.lines().map(str::to_string).collect())
}
