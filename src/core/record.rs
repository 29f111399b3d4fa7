//! Record type and reserved field names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reserved field holding a record's unique identifier within a base.
pub const ID: &str = "@id";

/// Reserved field marking an entity for removal when a patch is applied.
///
/// Transient: the merge engine consumes it; it never survives on a stored
/// base record.
pub const DELETED: &str = "@deleted";

/// A mapping from field name to field value. An unset field and a field
/// holding the empty string are indistinguishable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, String>);

impl Record {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Field value, with a missing field reading as `""` (unset).
    pub fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// The record's identifier value (`""` when unset).
    pub fn id(&self) -> &str {
        self.value(ID)
    }

    /// True when the deletion marker is present with a non-empty value.
    pub fn is_marked_deleted(&self) -> bool {
        !self.value(DELETED).is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Record {
    fn from(fields: [(&str, &str); N]) -> Self {
        fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}
