//! Core data model: records, set logs, and the merge engine.

pub mod error;
mod merge;
mod record;
mod setlog;

pub use error::{CoreError, InvalidKind};
pub use merge::MergeError;
pub use record::{DELETED, ID, Record};
pub use setlog::{Kind, SetLog, filter, filter_by_id};
