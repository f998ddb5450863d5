//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services. The
//! helpers below take the raw environment value as an argument instead of reading the
//! environment themselves, so request handling and tests never depend on process-wide state.

use crate::constants::{DEFAULT_EXPORT_DIR, DEFAULT_PROVIDER_GROUPS, DEFAULT_RECORDS_PATH};
use crate::{RecordError, RecordResult};
use ontop_uuid::UserIdScheme;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    records_path: PathBuf,
    provider_groups: Vec<String>,
    user_id_scheme: UserIdScheme,
    export_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidInput`] if `provider_groups` is empty, contains a blank
    /// name, or names the same group twice.
    pub fn new(
        records_path: PathBuf,
        provider_groups: Vec<String>,
        user_id_scheme: UserIdScheme,
        export_dir: PathBuf,
    ) -> RecordResult<Self> {
        if provider_groups.is_empty() {
            return Err(RecordError::InvalidInput(
                "at least one provider group is required".into(),
            ));
        }
        if provider_groups.iter().any(|g| g.trim().is_empty()) {
            return Err(RecordError::InvalidInput(
                "provider group names cannot be empty".into(),
            ));
        }
        for (i, group) in provider_groups.iter().enumerate() {
            if provider_groups[..i].contains(group) {
                return Err(RecordError::InvalidInput(format!(
                    "provider group '{}' is listed more than once",
                    group
                )));
            }
        }

        Ok(Self {
            records_path,
            provider_groups,
            user_id_scheme,
            export_dir,
        })
    }

    pub fn records_path(&self) -> &Path {
        &self.records_path
    }

    pub fn provider_groups(&self) -> &[String] {
        &self.provider_groups
    }

    pub fn user_id_scheme(&self) -> UserIdScheme {
        self.user_id_scheme
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            records_path: PathBuf::from(DEFAULT_RECORDS_PATH),
            provider_groups: default_provider_groups(),
            user_id_scheme: UserIdScheme::default(),
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
        }
    }
}

/// The built-in provider group list.
pub fn default_provider_groups() -> Vec<String> {
    DEFAULT_PROVIDER_GROUPS.iter().map(|g| g.to_string()).collect()
}

/// Parse the provider group list from an optional comma-separated value.
///
/// Entries are trimmed and empty entries dropped. If `value` is `None` or contains no
/// non-empty entries, the built-in list is returned.
pub fn provider_groups_from_env_value(value: Option<String>) -> Vec<String> {
    let groups: Vec<String> = value
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty())
        .collect();

    if groups.is_empty() {
        default_provider_groups()
    } else {
        groups
    }
}

/// Parse the identifier scheme from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default scheme.
pub fn user_id_scheme_from_env_value(value: Option<String>) -> RecordResult<UserIdScheme> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value.map(|v| v.parse::<UserIdScheme>()).transpose()?;

    Ok(parsed.unwrap_or_default())
}

/// Resolve a path from an optional string value, falling back to `default`.
pub fn path_from_env_value(value: Option<String>, default: &str) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}
