//! Folding selected records into one merged record.
//!
//! Field rules, applied over the selection in selection order:
//!
//! | Field | Rule |
//! |-------|------|
//! | `userID` | freshly generated, unrelated to any input |
//! | `patientID` | every value joined with `", "` |
//! | `patientName` | distinct values in first-occurrence order, joined |
//! | `patientDOB`, `patientGender`, `patientZipCode` | first record wins |
//! | `providers`, `providerURL`, `features` | every value joined |
//! | `treatmentDate` | merge date, `YYYY-MM-DD` |
//! | `startTime`, `endTime` | merge instant |
//!
//! Disagreeing first-wins fields are not an error; later values are dropped.

use crate::constants::JOIN_SEPARATOR;
use crate::record::PatientRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use ontop_uuid::{UserId, UserIdScheme};
use serde::{Deserialize, Serialize};

/// Fields whose value comes from the first selected record only.
pub const FIRST_WINS_FIELDS: [&str; 3] = ["patientDOB", "patientGender", "patientZipCode"];

/// A record synthesised from one or more selected records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MergedRecord {
    #[serde(rename = "userID")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "3fa9c1"))]
    pub user_id: UserId,
    #[serde(rename = "patientID")]
    pub patient_id: String,
    #[serde(rename = "patientName")]
    pub patient_name: String,
    #[serde(rename = "patientDOB")]
    pub patient_dob: String,
    #[serde(rename = "patientGender")]
    pub patient_gender: String,
    #[serde(rename = "patientZipCode")]
    pub patient_zip_code: String,
    pub providers: String,
    #[serde(rename = "providerURL")]
    pub provider_url: String,
    #[serde(rename = "treatmentDate")]
    pub treatment_date: String,
    #[serde(rename = "startTime")]
    pub start_time: String,
    #[serde(rename = "endTime")]
    pub end_time: String,
    pub features: String,
}

/// Merges `selection` using the wall clock and a new identifier from `scheme`.
///
/// Returns `None` for an empty selection.
pub fn merge(selection: &[PatientRecord], scheme: UserIdScheme) -> Option<MergedRecord> {
    if selection.is_empty() {
        return None;
    }
    merge_at(selection, UserId::generate(scheme), Utc::now())
}

/// Deterministic merge with a caller-supplied identifier and instant.
///
/// Returns `None` for an empty selection.
pub fn merge_at(
    selection: &[PatientRecord],
    user_id: UserId,
    now: DateTime<Utc>,
) -> Option<MergedRecord> {
    let first = selection.first()?;

    for later in &selection[1..] {
        let discarded = [
            (FIRST_WINS_FIELDS[0], &first.patient_dob, &later.patient_dob),
            (FIRST_WINS_FIELDS[1], &first.patient_gender, &later.patient_gender),
            (FIRST_WINS_FIELDS[2], &first.patient_zip_code, &later.patient_zip_code),
        ];
        for (field, kept, dropped) in discarded {
            if kept != dropped {
                tracing::debug!(
                    field,
                    patient_id = %later.patient_id,
                    "merge keeps '{}' from the first record, discarding '{}'",
                    kept,
                    dropped
                );
            }
        }
    }

    let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);

    let merged = MergedRecord {
        user_id,
        patient_id: join(selection, |r| &r.patient_id),
        patient_name: distinct_names(selection),
        patient_dob: first.patient_dob.clone(),
        patient_gender: first.patient_gender.clone(),
        patient_zip_code: first.patient_zip_code.clone(),
        providers: join(selection, |r| &r.providers),
        provider_url: join(selection, |r| &r.provider_url),
        treatment_date: now.format("%Y-%m-%d").to_string(),
        start_time: timestamp.clone(),
        end_time: timestamp,
        features: join(selection, |r| &r.features),
    };

    tracing::debug!(
        user_id = %merged.user_id,
        records = selection.len(),
        "merged selection"
    );

    Some(merged)
}

fn join<F>(selection: &[PatientRecord], field: F) -> String
where
    F: Fn(&PatientRecord) -> &String,
{
    selection
        .iter()
        .map(|r| field(r).as_str())
        .collect::<Vec<_>>()
        .join(JOIN_SEPARATOR)
}

fn distinct_names(selection: &[PatientRecord]) -> String {
    let mut names: Vec<&str> = Vec::new();
    for record in selection {
        if !names.contains(&record.patient_name.as_str()) {
            names.push(&record.patient_name);
        }
    }
    names.join(JOIN_SEPARATOR)
}
