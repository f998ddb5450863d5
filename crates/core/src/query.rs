//! Multi-field record search.
//!
//! A search evaluates [`FilterCriteria`] against every record in the store and then files
//! each match under every provider group whose name occurs in the record's `providers` field.
//! Where a record was filed in the source document plays no part in the result.

use crate::record::{PatientRecord, RecordKey};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Conjunctive substring constraints. An absent or blank field places no constraint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

impl FilterCriteria {
    /// Criteria that match every record.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = normalise(Some(name.into()));
        self
    }

    pub fn with_dob(mut self, dob: impl Into<String>) -> Self {
        self.dob = normalise(Some(dob.into()));
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = normalise(Some(gender.into()));
        self
    }

    pub fn with_zip_code(mut self, zip_code: impl Into<String>) -> Self {
        self.zip_code = normalise(Some(zip_code.into()));
        self
    }

    /// Trims every field and drops the ones left empty.
    pub fn normalised(self) -> Self {
        Self {
            name: normalise(self.name),
            dob: normalise(self.dob),
            gender: normalise(self.gender),
            zip_code: normalise(self.zip_code),
        }
    }

    /// True when no field constrains the search.
    pub fn is_empty(&self) -> bool {
        [&self.name, &self.dob, &self.gender, &self.zip_code]
            .iter()
            .all(|field| active(field).is_none())
    }

    /// Evaluates the filter against one record.
    ///
    /// Name and gender compare case-insensitively; date of birth and zip code are literal
    /// substrings, so `"05-12"` matches a birth date of `"1990-05-12"`.
    pub fn matches(&self, record: &PatientRecord) -> bool {
        let name_ok = active(&self.name).map_or(true, |name| {
            record
                .patient_name
                .to_lowercase()
                .contains(&name.to_lowercase())
        });
        let dob_ok = active(&self.dob).map_or(true, |dob| record.patient_dob.contains(dob));
        let gender_ok = active(&self.gender).map_or(true, |gender| {
            record
                .patient_gender
                .to_lowercase()
                .contains(&gender.to_lowercase())
        });
        let zip_ok =
            active(&self.zip_code).map_or(true, |zip| record.patient_zip_code.contains(zip));

        name_ok && dob_ok && gender_ok && zip_ok
    }
}

fn normalise(field: Option<String>) -> Option<String> {
    field
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn active(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Matches for a single provider group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderGroupResult {
    pub name: String,
    pub records: Vec<PatientRecord>,
}

/// Search output: one entry per configured provider group, in configured order.
///
/// Groups without matches are present with an empty list. Serialises as a JSON object keyed
/// by group name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupedResult {
    groups: Vec<ProviderGroupResult>,
    matches: Vec<PatientRecord>,
}

impl GroupedResult {
    /// Groups in configured order.
    pub fn groups(&self) -> &[ProviderGroupResult] {
        &self.groups
    }

    /// Matches filed under `name`, or `None` if `name` is not a configured group.
    pub fn group(&self, name: &str) -> Option<&[PatientRecord]> {
        self.groups
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.records.as_slice())
    }

    /// Every matching record once, in store order, whether or not it landed in a group.
    pub fn matches(&self) -> &[PatientRecord] {
        &self.matches
    }

    /// Matching record with `key`, if any.
    pub fn find(&self, key: &RecordKey) -> Option<&PatientRecord> {
        self.matches.iter().find(|r| key.identifies(r))
    }

    /// Number of distinct matching records.
    pub fn total(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

impl Serialize for GroupedResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.name, &group.records)?;
        }
        map.end()
    }
}

/// Filters `records` by `criteria` and files the matches under `groups`.
///
/// A record is filed under every group whose name is a substring of its `providers` field,
/// so one record can appear in several groups. Exact copies of a record (the same entry
/// filed under two document keys) are counted once. Records that only share a [`RecordKey`]
/// but differ elsewhere, such as two visits to the same provider, are all kept.
pub fn search<'a, I>(records: I, criteria: &FilterCriteria, groups: &[String]) -> GroupedResult
where
    I: IntoIterator<Item = &'a PatientRecord>,
{
    let mut matches: Vec<PatientRecord> = Vec::new();
    for record in records {
        if criteria.matches(record) && !matches.contains(record) {
            matches.push(record.clone());
        }
    }

    let groups: Vec<ProviderGroupResult> = groups
        .iter()
        .map(|name| ProviderGroupResult {
            name: name.clone(),
            records: matches
                .iter()
                .filter(|record| record.belongs_to(name))
                .cloned()
                .collect(),
        })
        .collect();

    tracing::debug!(
        ?criteria,
        total = matches.len(),
        "search matched {} records across {} groups",
        matches.len(),
        groups.iter().filter(|g| !g.records.is_empty()).count()
    );

    GroupedResult { groups, matches }
}
