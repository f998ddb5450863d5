//! # Ontop Core
//!
//! Identity query and merge engine for patient records exported by several provider systems.
//!
//! This crate contains pure data operations:
//! - Loading the grouped records document ([`RecordStore`])
//! - Multi-field search, re-partitioned into provider groups ([`query`])
//! - The operator's selection of records ([`SelectionSet`])
//! - Folding a selection into one [`MergedRecord`] ([`merge`])
//! - Session transitions over all of the above ([`SessionState`])
//! - Writing merged records to disk ([`export`])
//!
//! **No API concerns**: HTTP servers and command line handling belong in `api-rest` and
//! `ontop-cli`.

pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod merge;
pub mod query;
pub mod record;
pub mod selection;
pub mod service;
pub mod state;
pub mod store;

pub use config::CoreConfig;
pub use constants::{DEFAULT_PROVIDER_GROUPS, EXPORT_FILENAME};
pub use error::{RecordError, RecordResult};
pub use merge::MergedRecord;
pub use query::{FilterCriteria, GroupedResult, ProviderGroupResult};
pub use record::{PatientRecord, RecordKey};
pub use selection::SelectionSet;
pub use service::IdentityService;
pub use state::SessionState;
pub use store::RecordStore;

pub use ontop_uuid::{UserId, UserIdScheme};
