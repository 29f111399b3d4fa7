//! XDG directory helpers for the default storage root.

use std::path::PathBuf;

/// Default storage root for bases.
///
/// Uses `SETLOGS_DATA_DIR` if set, otherwise `$XDG_DATA_HOME/setlogs` or
/// `~/.local/share/setlogs`.
pub(crate) fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SETLOGS_DATA_DIR")
        && !dir.trim().is_empty()
    {
        return PathBuf::from(dir);
    }

    std::env::var("XDG_DATA_HOME")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".local")
                .join("share")
        })
        .join("setlogs")
}
