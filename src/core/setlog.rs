//! Set logs: ordered record collections with a kind tag and comment.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::InvalidKind;
use super::record::Record;

/// What role a log plays in a base's history.
///
/// `Base` is the canonical starting enumeration, `Mutate` an ordered list of
/// per-entity deltas, `Set` a fully materialized read-only view. `Empty` is
/// the placeholder for an uninitialized log awaiting its first base.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Empty,
    Base,
    Mutate,
    Set,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Empty => "empty",
            Kind::Base => "base",
            Kind::Mutate => "mutate",
            Kind::Set => "set",
        }
    }

    pub fn parse(s: &str) -> Result<Kind, InvalidKind> {
        match s {
            "empty" => Ok(Kind::Empty),
            "base" => Ok(Kind::Base),
            "mutate" => Ok(Kind::Mutate),
            "set" => Ok(Kind::Set),
            _ => Err(InvalidKind { raw: s.to_string() }),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = InvalidKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::parse(s)
    }
}

/// An ordered sequence of records plus a kind tag and free-text comment.
///
/// Serializes to `{ "kind": ..., "records": [...], "comment": ... }` and
/// round-trips exactly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetLog {
    pub kind: Kind,
    pub records: Vec<Record>,
    pub comment: String,
}

impl SetLog {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            records: Vec::new(),
            comment: String::new(),
        }
    }

    /// Consistency predicate. Pure; never mutates or repairs.
    ///
    /// `Empty` logs are always valid. Otherwise every record must carry a
    /// non-empty identifier, and `base`/`set` logs must not repeat an
    /// identifier. `mutate` logs may repeat identifiers freely (each record
    /// is a delta, not an entity).
    pub fn check(&self) -> bool {
        if self.kind == Kind::Empty {
            return true;
        }

        for record in &self.records {
            if record.id().is_empty() {
                return false;
            }
        }

        if matches!(self.kind, Kind::Base | Kind::Set) {
            let mut seen = BTreeSet::new();
            for record in &self.records {
                if !seen.insert(record.id()) {
                    return false;
                }
            }
        }

        true
    }

    /// Every non-empty value found under `key` across all records.
    ///
    /// Empty values are excluded: they mean "unset", not a value.
    pub fn values_of(&self, key: &str) -> BTreeSet<String> {
        let mut values = BTreeSet::new();
        for record in &self.records {
            let v = record.value(key);
            if !v.is_empty() {
                values.insert(v.to_string());
            }
        }
        values
    }

    /// Union of all field names across records, sorted ascending.
    ///
    /// Deterministic regardless of record order or which record introduced a
    /// field; used to derive a stable column order for presentation.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = BTreeSet::new();
        for record in &self.records {
            for (k, _) in record.fields() {
                keys.insert(k);
            }
        }
        keys.into_iter().map(String::from).collect()
    }

    pub fn append_records(&mut self, records: impl IntoIterator<Item = Record>) {
        self.records.extend(records);
    }

    pub fn filter<F>(&self, exist: F) -> Vec<Record>
    where
        F: FnMut(&Record) -> bool,
    {
        filter(&self.records, exist)
    }

    pub fn filter_by_id(&self, id_set: &BTreeSet<String>) -> Vec<Record> {
        filter_by_id(&self.records, id_set)
    }

    /// Visit every record once; returning `None` drops the record.
    ///
    /// The only record-mutation primitive. The merge engine builds its
    /// per-entity updates and entity deletion on top of it.
    pub fn update<F>(&mut self, f: F)
    where
        F: FnMut(Record) -> Option<Record>,
    {
        let records = std::mem::take(&mut self.records);
        self.records = records.into_iter().filter_map(f).collect();
    }
}

/// Records for which `exist` holds, relative order preserved.
pub fn filter<F>(records: &[Record], mut exist: F) -> Vec<Record>
where
    F: FnMut(&Record) -> bool,
{
    records.iter().filter(|r| exist(r)).cloned().collect()
}

/// Records whose identifier is a member of `id_set`.
pub fn filter_by_id(records: &[Record], id_set: &BTreeSet<String>) -> Vec<Record> {
    filter(records, |r| id_set.contains(r.id()))
}
