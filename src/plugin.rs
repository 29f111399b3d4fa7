//! Built-in transformation plugins.
//!
//! A plugin reads a materialized view and derives a mutate log; the command
//! surface decides whether to preview the result or persist it.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::{ID, Kind, Record, SetLog};

pub const HOMEWORK_COUNT: &str = "homework-count";

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("unknown plugin `{0}`")]
    Unknown(String),

    #[error("plugin usage: {0}")]
    Usage(&'static str),

    #[error("reading {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Derive a mutate log that sets `field` to `value` for every student id
/// found in the submission directory's file names.
///
/// A student id is the first run of ASCII digits in a file name; names
/// without digits are skipped. Ids are deduplicated, so one submission per
/// student is enough and extras are harmless.
pub fn homework_count(dir: &Path, field: &str, value: &str) -> Result<SetLog, PluginError> {
    let entries = fs::read_dir(dir).map_err(|e| io_err(dir, e))?;

    let mut ids = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let name = entry.file_name();
        if let Some(id) = digit_run(&name.to_string_lossy()) {
            ids.insert(id.to_string());
        }
    }
    tracing::debug!(count = ids.len(), dir = %dir.display(), "collected submission ids");

    let mut log = SetLog::new(Kind::Mutate);
    log.comment = format!(
        "set {field:?} = {value:?} for submissions found under {}",
        dir.display()
    );
    for id in ids {
        let mut record = Record::new();
        record.set(ID, id);
        record.set(field, value);
        log.append_records([record]);
    }
    Ok(log)
}

/// First maximal run of ASCII digits in `name`, if any.
fn digit_run(name: &str) -> Option<&str> {
    let start = name.find(|c: char| c.is_ascii_digit())?;
    let rest = &name[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

fn io_err(path: &Path, source: std::io::Error) -> PluginError {
    PluginError::Io {
        path: path.to_path_buf(),
        source,
    }
}
