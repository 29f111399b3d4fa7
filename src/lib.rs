#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod error;
pub mod import;
mod paths;
pub mod plugin;
pub mod store;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

// Re-export core types at crate root for convenience
pub use crate::core::{DELETED, ID, Kind, MergeError, Record, SetLog, filter, filter_by_id};
pub use crate::store::{BaseMeta, Registry, Store};
