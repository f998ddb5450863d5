//! Operator-curated selection of records awaiting a merge.
//!
//! Membership is decided by [`RecordKey`], never by instance, so a record that was re-fetched
//! by a later search is still recognised as selected.

use crate::record::{PatientRecord, RecordKey};
use serde::Serialize;

/// Insertion-ordered set of selected records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SelectionSet {
    records: Vec<PatientRecord>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes `record` if a record with the same key is selected, otherwise appends it.
    ///
    /// The record does not have to come from the latest search.
    pub fn toggle(&mut self, record: &PatientRecord) {
        let key = record.key();
        match self.position(&key) {
            Some(index) => {
                self.records.remove(index);
            }
            None => self.records.push(record.clone()),
        }
    }

    pub fn contains(&self, record: &PatientRecord) -> bool {
        self.contains_key(&record.key())
    }

    pub fn contains_key(&self, key: &RecordKey) -> bool {
        self.position(key).is_some()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Selected records in selection order.
    pub fn all(&self) -> &[PatientRecord] {
        &self.records
    }

    pub fn keys(&self) -> impl Iterator<Item = RecordKey> + '_ {
        self.records.iter().map(PatientRecord::key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, key: &RecordKey) -> Option<usize> {
        self.records.iter().position(|r| key.identifies(r))
    }
}
