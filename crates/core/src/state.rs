//! Operator session as a value.
//!
//! Each operator action is a transition that consumes the current [`SessionState`] and returns
//! the next one. Nothing here performs I/O; identifiers and timestamps are passed in.

use crate::merge::{merge_at, MergedRecord};
use crate::query::{search, FilterCriteria, GroupedResult};
use crate::record::PatientRecord;
use crate::selection::SelectionSet;
use crate::store::RecordStore;
use chrono::{DateTime, Utc};
use ontop_uuid::UserId;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    criteria: FilterCriteria,
    results: GroupedResult,
    selection: SelectionSet,
    merged: Option<MergedRecord>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Criteria the next search will use.
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Result of the most recent search.
    pub fn results(&self) -> &GroupedResult {
        &self.results
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// The merged record currently on display, if any.
    pub fn merged(&self) -> Option<&MergedRecord> {
        self.merged.as_ref()
    }

    /// Replaces the pending criteria without running a search.
    pub fn with_criteria(self, criteria: FilterCriteria) -> Self {
        Self {
            criteria: criteria.normalised(),
            ..self
        }
    }

    /// Runs the pending criteria against `store`.
    ///
    /// The selection is left alone, so records selected under an earlier filter stay selected.
    pub fn apply_filter(self, store: &RecordStore, groups: &[String]) -> Self {
        let results = search(store.records(), &self.criteria, groups);
        Self { results, ..self }
    }

    pub fn toggle_selection(mut self, record: &PatientRecord) -> Self {
        self.selection.toggle(record);
        self
    }

    pub fn clear_selection(mut self) -> Self {
        self.selection.clear();
        self
    }

    /// Folds the selection into a merged record.
    ///
    /// A successful merge consumes the selection. An empty selection clears any merged record
    /// left over from before.
    pub fn merge_with(mut self, user_id: UserId, now: DateTime<Utc>) -> Self {
        match merge_at(self.selection.all(), user_id, now) {
            Some(merged) => {
                self.selection.clear();
                self.merged = Some(merged);
            }
            None => self.merged = None,
        }
        self
    }
}
