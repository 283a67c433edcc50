//! Search-as-you-type suggestions over the catalog index and recent queries.
//!
//! The returned list holds product names in catalog order, then categories
//! and brands alphabetically, then matching recent queries in the order
//! given. Products, categories and brands are each capped. Recent queries
//! are not: room for them is reserved first, and the catalog kinds share
//! what is left of the overall maximum, front to back.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{
    facet_option::product_count_label,
    search_filters::FacetKey,
    suggestion::{Suggestion, SuggestionKind},
};

use crate::{catalog_index::CatalogIndex, config::EngineConfig, debounce::Debouncer, lock};

pub const MIN_QUERY_CHARS: usize = 2;
pub const MAX_RECENT_QUERIES: usize = 10;

/// Generate suggestions with the default limits.
pub fn generate(
    query: &str,
    index: &CatalogIndex,
    recent_queries: &[String],
) -> Vec<Suggestion> {
    generate_with_config(query, index, recent_queries, &EngineConfig::default())
}

pub fn generate_with_config(
    query: &str,
    index: &CatalogIndex,
    recent_queries: &[String],
    config: &EngineConfig,
) -> Vec<Suggestion> {
    if query.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }
    let needle = query.to_lowercase();

    let mut recent = Vec::new();
    let mut seen_queries = HashSet::new();
    for query in recent_queries {
        let lowered = query.trim().to_lowercase();
        if lowered.contains(&needle) && seen_queries.insert(lowered) {
            recent.push(Suggestion {
                kind: SuggestionKind::Query,
                value: query.clone(),
                label: query.clone(),
                match_count: None,
                is_recent_query: true,
            });
        }
    }
    recent.truncate(config.max_suggestions);

    let mut suggestions = catalog_suggestions(&needle, index, config);
    suggestions.truncate(config.max_suggestions - recent.len());
    suggestions.extend(recent);
    suggestions
}

fn catalog_suggestions(
    needle: &str,
    index: &CatalogIndex,
    config: &EngineConfig,
) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    let mut seen_products = HashSet::new();
    for product in index.products() {
        if seen_products.len() >= config.max_product_suggestions {
            break;
        }
        if product.name_lower.contains(needle)
            && seen_products.insert(product.name_lower.as_str())
        {
            suggestions.push(Suggestion {
                kind: SuggestionKind::Product,
                value: product.name.clone(),
                label: product.name.clone(),
                match_count: None,
                is_recent_query: false,
            });
        }
    }

    for (key, kind, cap) in [
        (FacetKey::Categories, SuggestionKind::Category, config.max_category_suggestions),
        (FacetKey::Brands, SuggestionKind::Brand, config.max_brand_suggestions),
    ] {
        let matches = index
            .facet_counts(key)
            .filter(|(value, _)| value.to_lowercase().contains(needle))
            .take(cap);
        for (value, count) in matches {
            suggestions.push(Suggestion {
                kind,
                value: value.to_string(),
                label: product_count_label(value, count),
                match_count: Some(count),
                is_recent_query: false,
            });
        }
    }
    suggestions
}

struct SessionState {
    index: Arc<CatalogIndex>,
    recent_queries: Vec<String>,
}

/// Debounced suggestion pipeline for one search box.
///
/// Every fired generation replaces the previous list wholesale through the
/// `on_suggestions` callback, which must not call back into the session.
pub struct SuggestionSession {
    state: Arc<Mutex<SessionState>>,
    debouncer: Debouncer<String>,
}

impl SuggestionSession {
    /// Must be created inside a Tokio runtime.
    pub fn new(
        config: EngineConfig,
        index: CatalogIndex,
        on_suggestions: impl Fn(Vec<Suggestion>) + Send + Sync + 'static,
    ) -> Self {
        let state = Arc::new(Mutex::new(SessionState {
            index: Arc::new(index),
            recent_queries: Vec::new(),
        }));
        let delay = Duration::from_millis(config.suggestion_debounce_ms);
        let generator_state = Arc::clone(&state);
        let debouncer = Debouncer::new(delay, move |query: String| {
            let (index, recent) = {
                let state = lock(&generator_state);
                (Arc::clone(&state.index), state.recent_queries.clone())
            };
            let suggestions = generate_with_config(&query, &index, &recent, &config);
            tracing::debug!("Generated {} suggestions for {:?}", suggestions.len(), query);
            on_suggestions(suggestions);
        });
        Self { state, debouncer }
    }

    /// Feed a keystroke.
    pub fn input(&self, query: impl Into<String>) {
        let query = query.into();
        self.debouncer.call(query);
    }

    /// Swap in a rebuilt index after the catalog changed.
    pub fn replace_index(&self, index: CatalogIndex) {
        lock(&self.state).index = Arc::new(index);
    }

    /// Remember a submitted query; newest first, duplicates collapsed.
    pub fn record_query(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        let mut state = lock(&self.state);
        state.recent_queries.retain(|existing| !existing.eq_ignore_ascii_case(query));
        state.recent_queries.insert(0, query.to_string());
        state.recent_queries.truncate(MAX_RECENT_QUERIES);
    }

    pub fn recent_queries(&self) -> Vec<String> {
        lock(&self.state).recent_queries.clone()
    }

    pub fn cancel(&self) {
        self.debouncer.cancel();
    }
}
