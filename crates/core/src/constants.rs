//! Constants used throughout the core crate.

/// Provider groups searched when no explicit list is configured, in display order.
pub const DEFAULT_PROVIDER_GROUPS: [&str; 5] = ["OonTop", "eCW", "AMD", "Quest", "Behavidance"];

/// Default location of the records document.
pub const DEFAULT_RECORDS_PATH: &str = "patients.json";

/// Default directory merged records are exported into.
pub const DEFAULT_EXPORT_DIR: &str = ".";

/// Suggested filename for an exported merged record.
pub const EXPORT_FILENAME: &str = "merged_patient.json";

/// Separator used when joining field values of several records.
pub const JOIN_SEPARATOR: &str = ", ";
