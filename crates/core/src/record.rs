//! Patient records as exported by a single provider system.
//!
//! Every field is a string in the source format. Records are immutable once loaded; the query
//! and merge engines only ever read or clone them.

use crate::{RecordError, RecordResult};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// One entry from one provider's export.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PatientRecord {
    #[serde(rename = "patientID", default)]
    pub patient_id: String,
    #[serde(rename = "patientName", default)]
    pub patient_name: String,
    #[serde(rename = "patientDOB", default)]
    pub patient_dob: String,
    #[serde(rename = "patientGender", default)]
    pub patient_gender: String,
    #[serde(rename = "patientZipCode", default)]
    pub patient_zip_code: String,
    /// Free text, possibly a comma-joined list of provider names.
    #[serde(default)]
    pub providers: String,
    #[serde(rename = "providerURL", default)]
    pub provider_url: String,
    #[serde(rename = "treatmentDate", default)]
    pub treatment_date: String,
    #[serde(rename = "startTime", default)]
    pub start_time: String,
    #[serde(rename = "endTime", default)]
    pub end_time: String,
    #[serde(default)]
    pub features: String,
}

impl PatientRecord {
    /// The logical identity of this record.
    ///
    /// `patient_id` alone is not unique across provider groups, so the key pairs it with the
    /// `providers` field.
    pub fn key(&self) -> RecordKey {
        RecordKey {
            patient_id: self.patient_id.clone(),
            providers: self.providers.clone(),
        }
    }

    /// Returns true if `group` appears anywhere in this record's `providers` field.
    ///
    /// Membership is a plain substring test, so a record listing `"eCW, AMD"` belongs to both
    /// `eCW` and `AMD`.
    pub fn belongs_to(&self, group: &str) -> bool {
        self.providers.contains(group)
    }
}

/// Stable logical key of a [`PatientRecord`].
///
/// Textual form is `<patientID>|<providers>`. Parsing splits on the last `|`, so patient ids
/// may contain `|` but provider lists may not. Both parts are kept exactly as given, since
/// [`RecordKey::identifies`] compares without normalising.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecordKey {
    #[serde(rename = "patientID")]
    pub patient_id: String,
    pub providers: String,
}

impl RecordKey {
    pub fn new(patient_id: impl Into<String>, providers: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            providers: providers.into(),
        }
    }

    /// Returns true if `record` has this key.
    pub fn identifies(&self, record: &PatientRecord) -> bool {
        record.patient_id == self.patient_id && record.providers == self.providers
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.patient_id, self.providers)
    }
}

impl FromStr for RecordKey {
    type Err = RecordError;

    fn from_str(s: &str) -> RecordResult<Self> {
        let (patient_id, providers) = s.rsplit_once('|').ok_or_else(|| {
            RecordError::InvalidInput(format!(
                "record key must look like '<patientID>|<providers>', got: '{}'",
                s
            ))
        })?;
        if patient_id.trim().is_empty() {
            return Err(RecordError::InvalidInput(format!(
                "record key is missing a patient id: '{}'",
                s
            )));
        }
        Ok(Self::new(patient_id, providers))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::PatientRecord;

    /// Builds a record with the searchable fields set and the rest derived from them.
    pub(crate) fn record(
        id: &str,
        name: &str,
        dob: &str,
        gender: &str,
        zip: &str,
        providers: &str,
    ) -> PatientRecord {
        PatientRecord {
            patient_id: id.into(),
            patient_name: name.into(),
            patient_dob: dob.into(),
            patient_gender: gender.into(),
            patient_zip_code: zip.into(),
            providers: providers.into(),
            provider_url: format!("https://{}.example/{}", providers.to_lowercase(), id),
            treatment_date: "2023-04-01".into(),
            start_time: "2023-04-01T09:00:00.000Z".into(),
            end_time: "2023-04-01T09:30:00.000Z".into(),
            features: format!("visit-{}", id),
        }
    }
}
