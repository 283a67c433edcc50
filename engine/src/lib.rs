//! Faceted product search and smart filter engine.
//!
//! Turns a free-text query plus facet selections into suggestions, inferred
//! "smart" filters and a canonical [`common::search_filters::SearchFilters`]
//! state, and keeps named snapshots of that state.

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod catalog_index;
pub mod config;
pub mod debounce;
pub mod error;
pub mod filter_state;
pub mod presets;
pub mod saved_searches;
pub mod selection;
pub mod smart_filters;
pub mod suggestions;

pub use catalog_index::CatalogIndex;
pub use config::EngineConfig;
pub use debounce::Debouncer;
pub use error::{FilterError, SavedSearchError};
pub use filter_state::FilterStateManager;
pub use saved_searches::{
    InMemoryBackend, JsonFileBackend, SavedSearchBackend, SavedSearchStore, SessionContext,
};
pub use suggestions::SuggestionSession;

// State behind these locks is only ever replaced whole, so a poisoned lock
// still holds a consistent value.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
