//! Read-only record store loaded once at startup.
//!
//! The source document is a single JSON object keyed by provider group name:
//!
//! ```json
//! { "eCW": [ { "patientID": "P001", ... } ], "AMD": [ ... ] }
//! ```
//!
//! Only configured provider groups are loaded. A missing or unreadable document leaves the
//! store empty rather than failing, since an empty store is a valid, matches-nothing state for
//! the query engine.

use crate::record::{PatientRecord, RecordKey};
use crate::{RecordError, RecordResult};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordStore {
    groups: Vec<(String, Vec<PatientRecord>)>,
}

impl RecordStore {
    /// An empty store.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a store directly from `(group, records)` pairs.
    pub fn from_groups(groups: Vec<(String, Vec<PatientRecord>)>) -> Self {
        Self { groups }
    }

    /// Parses a records document, keeping only `provider_groups`, in that order.
    ///
    /// Configured groups that are absent from the document load as empty. Keys that are not
    /// configured groups are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Deserialization`] if the document is not a JSON object or a
    /// configured group is not an array of records.
    pub fn from_json_str(json: &str, provider_groups: &[String]) -> RecordResult<Self> {
        let mut document: Map<String, Value> =
            serde_json::from_str(json).map_err(RecordError::Deserialization)?;

        let mut groups = Vec::with_capacity(provider_groups.len());
        for group in provider_groups {
            let records = match document.remove(group) {
                Some(value) => serde_json::from_value::<Vec<PatientRecord>>(value)
                    .map_err(RecordError::Deserialization)?,
                None => Vec::new(),
            };
            groups.push((group.clone(), records));
        }

        for unknown in document.keys() {
            tracing::warn!("ignoring records under unconfigured provider group: {}", unknown);
        }

        Ok(Self { groups })
    }

    /// Reads and parses the records document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::FileRead`] if the file cannot be read, or any error from
    /// [`RecordStore::from_json_str`].
    pub fn load(path: &Path, provider_groups: &[String]) -> RecordResult<Self> {
        let contents = fs::read_to_string(path).map_err(RecordError::FileRead)?;
        Self::from_json_str(&contents, provider_groups)
    }

    /// Like [`RecordStore::load`], but any failure yields an empty store.
    pub fn load_or_empty(path: &Path, provider_groups: &[String]) -> Self {
        match Self::load(path, provider_groups) {
            Ok(store) => {
                tracing::info!(
                    "loaded {} records from {}",
                    store.len(),
                    path.display()
                );
                store
            }
            Err(e) => {
                tracing::warn!(
                    "no records loaded from {}: {}; continuing with an empty store",
                    path.display(),
                    e
                );
                Self::empty()
            }
        }
    }

    /// Group names in load order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    /// Records as they were filed under `group` in the source document.
    pub fn group(&self, name: &str) -> Option<&[PatientRecord]> {
        self.groups
            .iter()
            .find(|(group, _)| group == name)
            .map(|(_, records)| records.as_slice())
    }

    /// All records, group by group, in document order within each group.
    pub fn records(&self) -> impl Iterator<Item = &PatientRecord> {
        self.groups.iter().flat_map(|(_, records)| records.iter())
    }

    /// First record carrying `key`, if any.
    pub fn find(&self, key: &RecordKey) -> Option<&PatientRecord> {
        self.records().find(|r| key.identifies(r))
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, records)| records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_provider_groups;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DOCUMENT: &str = r#"{
        "eCW": [
            { "patientID": "P1", "patientName": "Jane Doe", "providers": "eCW" },
            { "patientID": "P2", "patientName": "John Roe", "providers": "eCW, AMD" }
        ],
        "AMD": [
            { "patientID": "P3", "patientName": "Ann Poe", "providers": "AMD" }
        ],
        "Legacy": [
            { "patientID": "X9", "patientName": "Old Record", "providers": "Legacy" }
        ]
    }"#;

    fn groups(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn keeps_configured_groups_in_order() {
        let store = RecordStore::from_json_str(DOCUMENT, &groups(&["AMD", "eCW", "Quest"]))
            .expect("parse document");

        assert_eq!(store.groups().collect::<Vec<_>>(), vec!["AMD", "eCW", "Quest"]);
        let ids: Vec<_> = store.records().map(|r| r.patient_id.as_str()).collect();
        assert_eq!(ids, vec!["P3", "P1", "P2"]);
        assert_eq!(store.group("Quest"), Some(&[][..]));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn unconfigured_groups_are_not_searchable() {
        let store = RecordStore::from_json_str(DOCUMENT, &default_provider_groups()).unwrap();
        assert!(store.records().all(|r| r.patient_id != "X9"));
        assert!(store.group("Legacy").is_none());
    }

    #[test]
    fn rejects_malformed_documents() {
        let not_object = RecordStore::from_json_str("[1, 2]", &default_provider_groups());
        assert!(matches!(not_object, Err(RecordError::Deserialization(_))));

        let bad_group =
            RecordStore::from_json_str(r#"{"eCW": "nope"}"#, &default_provider_groups());
        assert!(matches!(bad_group, Err(RecordError::Deserialization(_))));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(DOCUMENT.as_bytes()).unwrap();

        let store = RecordStore::load(file.path(), &default_provider_groups()).unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn load_or_empty_degrades_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");

        assert!(matches!(
            RecordStore::load(&missing, &default_provider_groups()),
            Err(RecordError::FileRead(_))
        ));
        let store = RecordStore::load_or_empty(&missing, &default_provider_groups());
        assert!(store.is_empty());
    }

    #[test]
    fn load_or_empty_degrades_on_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let store = RecordStore::load_or_empty(file.path(), &default_provider_groups());
        assert!(store.is_empty());
        assert_eq!(store.records().count(), 0);
    }

    #[test]
    fn find_uses_logical_key() {
        let store = RecordStore::from_json_str(DOCUMENT, &default_provider_groups()).unwrap();
        let found = store.find(&RecordKey::new("P2", "eCW, AMD")).unwrap();
        assert_eq!(found.patient_name, "John Roe");
        assert!(store.find(&RecordKey::new("P2", "eCW")).is_none());
    }
}
