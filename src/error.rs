use std::path::PathBuf;

use thiserror::Error;

use crate::core::{CoreError, MergeError};
use crate::import::ImportError;
use crate::plugin::PluginError;
use crate::store::StoreError;

/// Crate-level convenience error.
///
/// Not a "god error": it is a thin wrapper over canonical capability errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error("{path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Usage(String),
}

impl From<MergeError> for Error {
    fn from(e: MergeError) -> Self {
        Error::Core(CoreError::Merge(e))
    }
}
