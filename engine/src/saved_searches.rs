//! Named filter snapshots per signed-in user.
//!
//! The store keeps no state of its own between calls: every operation loads
//! the user's list from the backend, edits a copy and writes it back, so a
//! failed write leaves nothing half-applied.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use chrono::{DateTime, Utc};
use common::{
    saved_search::{FilterPreset, SavedSearch},
    search_filters::SearchFilters,
};
use uuid::Uuid;

use crate::{config::EngineConfig, error::SavedSearchError, lock, presets};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionContext {
    pub is_authenticated: bool,
    pub user_id: Option<String>,
}

impl SessionContext {
    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self { is_authenticated: true, user_id: Some(user_id.into()) }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    fn user_id(&self) -> Result<&str, SavedSearchError> {
        match (&self.user_id, self.is_authenticated) {
            (Some(user_id), true) => Ok(user_id.as_str()),
            _ => Err(SavedSearchError::NotAuthenticated),
        }
    }
}

/// Persistence seam for saved-search lists, most-recent-first.
pub trait SavedSearchBackend: Send + Sync {
    fn load(&self, user_id: &str) -> anyhow::Result<Vec<SavedSearch>>;
    fn store(&self, user_id: &str, searches: &[SavedSearch]) -> anyhow::Result<()>;
}

/// Session-scoped storage; lost when dropped.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    lists: Mutex<HashMap<String, Vec<SavedSearch>>>,
}

impl SavedSearchBackend for InMemoryBackend {
    fn load(&self, user_id: &str) -> anyhow::Result<Vec<SavedSearch>> {
        Ok(lock(&self.lists).get(user_id).cloned().unwrap_or_default())
    }

    fn store(&self, user_id: &str, searches: &[SavedSearch]) -> anyhow::Result<()> {
        lock(&self.lists).insert(user_id.to_string(), searches.to_vec());
        Ok(())
    }
}

/// One JSON file per user under `dir`.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, user_id: &str) -> anyhow::Result<PathBuf> {
        let file_safe = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
        if user_id.is_empty() || !user_id.chars().all(file_safe) {
            anyhow::bail!("user id {:?} cannot be used as a file name", user_id);
        }
        Ok(self.dir.join(format!("{user_id}.json")))
    }
}

impl SavedSearchBackend for JsonFileBackend {
    fn load(&self, user_id: &str) -> anyhow::Result<Vec<SavedSearch>> {
        let path = self.path_for(user_id)?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_slice(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    fn store(&self, user_id: &str, searches: &[SavedSearch]) -> anyhow::Result<()> {
        let path = self.path_for(user_id)?;
        std::fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(searches)?)?;
        std::fs::rename(&tmp, &path).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct SavedSearchStore<B> {
    backend: B,
    session: SessionContext,
    max_saved: usize,
    clock: Clock,
    write_guard: Mutex<()>,
}

impl<B: SavedSearchBackend> SavedSearchStore<B> {
    pub fn new(backend: B, session: SessionContext, config: &EngineConfig) -> Self {
        Self {
            backend,
            session,
            max_saved: config.max_saved_searches.max(1),
            clock: Arc::new(Utc::now),
            write_guard: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn save(
        &self,
        name: &str,
        filters: &SearchFilters,
    ) -> Result<SavedSearch, SavedSearchError> {
        let user_id = self.session.user_id()?;
        let _guard = lock(&self.write_guard);
        let mut searches = self.backend.load(user_id)?;
        let now = (self.clock)();
        let saved = SavedSearch {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            filters: filters.clone(),
            alerts_enabled: false,
            created_at: now,
            last_used_at: now,
        };
        searches.insert(0, saved.clone());
        if searches.len() > self.max_saved {
            for evicted in searches.drain(self.max_saved..) {
                tracing::info!("Evicting saved search {:?} ({})", evicted.name, evicted.id);
            }
        }
        self.backend.store(user_id, &searches)?;
        Ok(saved)
    }

    /// Mark a saved search as used and hand back a copy of its filters.
    pub fn apply(&self, id: &str) -> Result<SearchFilters, SavedSearchError> {
        let user_id = self.session.user_id()?;
        let _guard = lock(&self.write_guard);
        let mut searches = self.backend.load(user_id)?;
        let search = searches
            .iter_mut()
            .find(|search| search.id == id)
            .ok_or_else(|| SavedSearchError::NotFound(id.to_string()))?;
        search.last_used_at = (self.clock)();
        let filters = search.filters.clone();
        self.backend.store(user_id, &searches)?;
        Ok(filters)
    }

    /// Delete by id. Unknown ids are ignored.
    pub fn remove(&self, id: &str) -> Result<(), SavedSearchError> {
        let user_id = self.session.user_id()?;
        let _guard = lock(&self.write_guard);
        let mut searches = self.backend.load(user_id)?;
        let before = searches.len();
        searches.retain(|search| search.id != id);
        if searches.len() != before {
            self.backend.store(user_id, &searches)?;
        }
        Ok(())
    }

    pub fn set_alerts(&self, id: &str, enabled: bool) -> Result<SavedSearch, SavedSearchError> {
        let user_id = self.session.user_id()?;
        let _guard = lock(&self.write_guard);
        let mut searches = self.backend.load(user_id)?;
        let search = searches
            .iter_mut()
            .find(|search| search.id == id)
            .ok_or_else(|| SavedSearchError::NotFound(id.to_string()))?;
        search.alerts_enabled = enabled;
        let updated = search.clone();
        self.backend.store(user_id, &searches)?;
        Ok(updated)
    }

    pub fn list(&self) -> Result<Vec<SavedSearch>, SavedSearchError> {
        let user_id = self.session.user_id()?;
        Ok(self.backend.load(user_id)?)
    }

    pub fn list_presets(&self) -> &'static [FilterPreset] {
        presets::list_presets()
    }
}
