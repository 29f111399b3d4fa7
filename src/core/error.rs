//! Core capability errors (kind parsing, merge contract violations).
//!
//! These are bounded and stable: they represent domain/refusal states, not
//! library implementation details.

use thiserror::Error;

use super::merge::MergeError;

/// Invalid log kind string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("log kind `{raw}` is invalid: expected base, mutate, set or empty")]
pub struct InvalidKind {
    pub raw: String,
}

/// Canonical error enum for the core capability.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum CoreError {
    #[error(transparent)]
    InvalidKind(#[from] InvalidKind),
    #[error(transparent)]
    Merge(#[from] MergeError),
}
