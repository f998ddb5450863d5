//! Service facade tying configuration, the record store and session transitions together.

use crate::config::CoreConfig;
use crate::query::{search, FilterCriteria, GroupedResult};
use crate::state::SessionState;
use crate::store::RecordStore;
use chrono::Utc;
use ontop_uuid::UserId;
use std::sync::Arc;

/// Record search and merge operations - no API concerns.
#[derive(Clone, Debug)]
pub struct IdentityService {
    cfg: Arc<CoreConfig>,
    store: Arc<RecordStore>,
}

impl IdentityService {
    /// Creates a service, loading the record store named by `cfg`.
    ///
    /// A missing or malformed records file leaves the store empty.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        let store = RecordStore::load_or_empty(cfg.records_path(), cfg.provider_groups());
        Self::with_store(cfg, store)
    }

    /// Creates a service over an already loaded store.
    pub fn with_store(cfg: Arc<CoreConfig>, store: RecordStore) -> Self {
        Self {
            cfg,
            store: Arc::new(store),
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Searches the whole store.
    pub fn search(&self, criteria: &FilterCriteria) -> GroupedResult {
        search(self.store.records(), criteria, self.cfg.provider_groups())
    }

    /// Runs the session's pending criteria against the store.
    pub fn apply_filter(&self, state: SessionState) -> SessionState {
        state.apply_filter(&self.store, self.cfg.provider_groups())
    }

    /// Merges the session's selection with a fresh identifier and the current time.
    pub fn merge(&self, state: SessionState) -> SessionState {
        state.merge_with(UserId::generate(self.cfg.user_id_scheme()), Utc::now())
    }
}
