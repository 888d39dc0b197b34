use std::fs::OpenOptions;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use tracing::Level;

/// Parse a level name, defaulting to INFO for anything unrecognised
pub fn parse_level(level: &str) -> Level {
    Level::from_str(level.trim()).unwrap_or(Level::INFO)
}

/// Route tracing output to an append-only file; the terminal belongs to the TUI.
///
/// Returns false when the file cannot be opened or a subscriber is already
/// installed, in which case logging is simply off.
pub fn init(path: &Path, level: &str) -> bool {
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return false;
        }
    }

    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return false;
    };

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(parse_level(level))
        .with_target(false)
        .try_init()
        .is_ok()
}
