//! Merge engine: fold a patch log into a base log.

use std::collections::BTreeSet;

use thiserror::Error;

use super::record::{ID, Record};
use super::setlog::{Kind, SetLog};

/// Merge contract violations.
///
/// These indicate the caller assembled a log chain out of order, not a data
/// quality problem. There is no retry or partial-result path; callers treat
/// them as fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("cannot merge a `{patch}` log into an uninitialized base; the first log must be `base`")]
    UninitializedBase { patch: Kind },

    #[error("merge target must be a `base` log, got `{base}`")]
    TargetNotBase { base: Kind },

    #[error("cannot merge a `{patch}` log into a base; only `mutate` logs carry deltas")]
    PatchNotMutate { patch: Kind },
}

impl SetLog {
    /// Fold `patch` into `self`.
    ///
    /// Dispatch on kinds:
    /// - `self` empty: `patch` must be `base` and is adopted verbatim.
    /// - `self` must otherwise be `base`.
    /// - `empty`/`set` patches carry no deltas; no-op.
    /// - `mutate` patches are folded record by record, in sequence order.
    ///
    /// Per patch record: a record whose identifier already exists updates
    /// the matching base record field by field (non-empty value upserts,
    /// empty value removes the field); an unknown identifier is appended as
    /// a new entity. A record left carrying the deletion marker is dropped
    /// from the base, so the marker never persists.
    ///
    /// Later records in the same patch see the effect of earlier ones; the
    /// fold is sequential, not a batch union.
    pub fn merge(&mut self, patch: &SetLog) -> Result<(), MergeError> {
        if self.kind == Kind::Empty {
            if patch.kind != Kind::Base {
                return Err(MergeError::UninitializedBase { patch: patch.kind });
            }
            self.kind = patch.kind;
            self.records = patch.records.clone();
            self.comment = patch.comment.clone();
            return Ok(());
        }

        if self.kind != Kind::Base {
            return Err(MergeError::TargetNotBase { base: self.kind });
        }

        match patch.kind {
            Kind::Empty | Kind::Set => return Ok(()),
            Kind::Mutate => {}
            Kind::Base => return Err(MergeError::PatchNotMutate { patch: patch.kind }),
        }

        // Identifier membership, kept current across the fold so a later
        // record in this patch can address an entity an earlier one inserted.
        let mut ids = self.values_of(ID);
        for delta in &patch.records {
            if ids.contains(delta.id()) {
                self.apply_delta(delta, &mut ids);
            } else if delta.is_marked_deleted() {
                // Inserting and immediately deleting folds to nothing.
            } else {
                ids.insert(delta.id().to_string());
                self.records.push(delta.clone());
            }
        }
        Ok(())
    }

    /// Single pass over the base records, updating the one matching
    /// `delta`'s identifier (at most one, by the base invariant).
    fn apply_delta(&mut self, delta: &Record, ids: &mut BTreeSet<String>) {
        let mut deleted = false;
        self.update(|mut record| {
            if record.id() != delta.id() {
                return Some(record);
            }
            for (key, value) in delta.fields() {
                if value.is_empty() {
                    record.remove(key);
                } else {
                    record.set(key, value);
                }
            }
            if record.is_marked_deleted() {
                deleted = true;
                None
            } else {
                Some(record)
            }
        });
        if deleted {
            ids.remove(delta.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::DELETED;

    fn base(records: Vec<Record>) -> SetLog {
        let mut log = SetLog::new(Kind::Base);
        log.append_records(records);
        log
    }

    fn mutate(records: Vec<Record>) -> SetLog {
        let mut log = SetLog::new(Kind::Mutate);
        log.append_records(records);
        log
    }

    #[test]
    fn empty_adopts_base_verbatim() {
        let mut first = base(vec![Record::from([(ID, "1"), ("name", "Alice")])]);
        first.comment = "initial import".to_string();

        let mut target = SetLog::new(Kind::Empty);
        target.merge(&first).unwrap();
        assert_eq!(target, first);
    }

    #[test]
    fn empty_rejects_non_base() {
        for kind in [Kind::Empty, Kind::Mutate, Kind::Set] {
            let mut target = SetLog::new(Kind::Empty);
            let err = target.merge(&SetLog::new(kind)).unwrap_err();
            assert_eq!(err, MergeError::UninitializedBase { patch: kind });
        }
    }

    #[test]
    fn target_must_be_base() {
        for kind in [Kind::Mutate, Kind::Set] {
            let mut target = SetLog::new(kind);
            let err = target.merge(&mutate(vec![])).unwrap_err();
            assert_eq!(err, MergeError::TargetNotBase { base: kind });
        }
    }

    #[test]
    fn base_patch_into_base_is_contract_violation() {
        let mut target = base(vec![]);
        let err = target.merge(&base(vec![])).unwrap_err();
        assert_eq!(err, MergeError::PatchNotMutate { patch: Kind::Base });
    }

    #[test]
    fn empty_and_set_patches_are_noops() {
        let original = base(vec![Record::from([(ID, "1"), ("name", "Alice")])]);
        for kind in [Kind::Empty, Kind::Set] {
            let mut target = original.clone();
            let mut patch = SetLog::new(kind);
            patch.append_records([Record::from([(ID, "1"), ("name", "Mallory")])]);
            target.merge(&patch).unwrap();
            assert_eq!(target, original);
        }
    }

    #[test]
    fn empty_mutate_is_identity() {
        let original = base(vec![
            Record::from([(ID, "1"), ("name", "Alice")]),
            Record::from([(ID, "2"), ("name", "Bob")]),
        ]);
        let mut target = original.clone();
        target.merge(&mutate(vec![])).unwrap();
        assert_eq!(target.records, original.records);
    }

    #[test]
    fn upsert_sets_and_adds_fields() {
        let mut target = base(vec![Record::from([(ID, "1"), ("name", "Alice")])]);
        let patch = mutate(vec![Record::from([(ID, "1"), ("name", "Alicia"), ("mark", "A")])]);
        target.merge(&patch).unwrap();

        assert_eq!(target.records.len(), 1);
        assert_eq!(target.records[0].value("name"), "Alicia");
        assert_eq!(target.records[0].value("mark"), "A");
    }

    #[test]
    fn setting_a_field_twice_is_stable() {
        let mut once = base(vec![Record::from([(ID, "1"), ("name", "Alice")])]);
        let patch = mutate(vec![Record::from([(ID, "1"), ("mark", "B")])]);
        once.merge(&patch).unwrap();

        let mut twice = once.clone();
        twice.merge(&patch).unwrap();
        assert_eq!(twice.records, once.records);
    }

    #[test]
    fn empty_value_removes_the_field() {
        let mut target = base(vec![Record::from([(ID, "1"), ("name", "foo")])]);
        let patch = mutate(vec![Record::from([(ID, "1"), ("name", "")])]);
        target.merge(&patch).unwrap();

        assert_eq!(target.records.len(), 1);
        assert_eq!(target.records[0].get("name"), None);
    }

    #[test]
    fn deletion_marker_removes_the_entity() {
        let mut target = base(vec![
            Record::from([(ID, "1"), ("name", "Alice")]),
            Record::from([(ID, "2"), ("name", "Bob")]),
        ]);
        let patch = mutate(vec![Record::from([(ID, "1"), (DELETED, "T"), ("name", "ignored")])]);
        target.merge(&patch).unwrap();

        assert_eq!(target.records.len(), 1);
        assert_eq!(target.records[0].id(), "2");
    }

    #[test]
    fn unknown_id_is_appended_verbatim() {
        let mut target = base(vec![Record::from([(ID, "1"), ("name", "Alice")])]);
        let patch = mutate(vec![Record::from([(ID, "3"), ("name", "Carol"), ("mark", "")])]);
        target.merge(&patch).unwrap();

        assert_eq!(target.records.len(), 2);
        // Verbatim: the empty-valued field is kept as written, not stripped.
        assert_eq!(target.records[1], patch.records[0]);
    }

    #[test]
    fn deletion_marker_on_absent_entity_is_net_noop() {
        let original = base(vec![Record::from([(ID, "1"), ("name", "Alice")])]);
        let mut target = original.clone();
        let patch = mutate(vec![Record::from([(ID, "9"), (DELETED, "T"), ("name", "ghost")])]);
        target.merge(&patch).unwrap();
        assert_eq!(target.records, original.records);
    }

    #[test]
    fn later_records_see_earlier_inserts() {
        let mut target = base(vec![Record::from([(ID, "1"), ("name", "Alice")])]);
        let patch = mutate(vec![
            Record::from([(ID, "9"), ("name", "Nina")]),
            Record::from([(ID, "9"), ("mark", "A")]),
        ]);
        target.merge(&patch).unwrap();

        // One entity, updated in place; not two appended deltas.
        assert_eq!(target.records.len(), 2);
        assert_eq!(target.records[1].value("name"), "Nina");
        assert_eq!(target.records[1].value("mark"), "A");
    }

    #[test]
    fn insert_then_delete_within_one_patch() {
        let mut target = base(vec![Record::from([(ID, "1"), ("name", "Alice")])]);
        let patch = mutate(vec![
            Record::from([(ID, "9"), ("name", "Nina")]),
            Record::from([(ID, "9"), (DELETED, "T")]),
        ]);
        target.merge(&patch).unwrap();

        assert_eq!(target.records.len(), 1);
        assert_eq!(target.records[0].id(), "1");
    }

    #[test]
    fn patch_is_left_unmodified() {
        let mut target = base(vec![Record::from([(ID, "1"), ("name", "Alice")])]);
        let patch = mutate(vec![Record::from([(ID, "1"), ("name", "Alicia")])]);
        let before = patch.clone();
        target.merge(&patch).unwrap();
        assert_eq!(patch, before);
    }

    #[test]
    fn end_to_end_scenario() {
        let mut target = base(vec![
            Record::from([(ID, "1"), ("name", "Alice")]),
            Record::from([(ID, "2"), ("name", "Bob")]),
        ]);
        let patch = mutate(vec![
            Record::from([(ID, "1"), ("name", "Alicia")]),
            Record::from([(ID, "3"), ("name", "Carol")]),
        ]);
        target.merge(&patch).unwrap();

        assert_eq!(target.records.len(), 3);
        assert_eq!(target.records[0], Record::from([(ID, "1"), ("name", "Alicia")]));
        assert_eq!(target.records[1], Record::from([(ID, "2"), ("name", "Bob")]));
        assert_eq!(target.records[2], Record::from([(ID, "3"), ("name", "Carol")]));
        assert!(target.check());
    }
}
