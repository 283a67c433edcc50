//! Engine tuning knobs, overridable from the environment.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub suggestion_debounce_ms: u64,
    pub max_suggestions: usize,
    pub max_product_suggestions: usize,
    pub max_category_suggestions: usize,
    pub max_brand_suggestions: usize,
    pub max_saved_searches: usize,
    pub new_arrival_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            suggestion_debounce_ms: 300,
            max_suggestions: 8,
            max_product_suggestions: 3,
            max_category_suggestions: 3,
            max_brand_suggestions: 3,
            max_saved_searches: 10,
            new_arrival_days: 30,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with any `FACET_ENGINE_*` variables that parse.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            suggestion_debounce_ms: read(
                &lookup,
                "FACET_ENGINE_SUGGESTION_DEBOUNCE_MS",
                defaults.suggestion_debounce_ms,
            ),
            max_suggestions: read(
                &lookup,
                "FACET_ENGINE_MAX_SUGGESTIONS",
                defaults.max_suggestions,
            ),
            max_product_suggestions: read(
                &lookup,
                "FACET_ENGINE_MAX_PRODUCT_SUGGESTIONS",
                defaults.max_product_suggestions,
            ),
            max_category_suggestions: read(
                &lookup,
                "FACET_ENGINE_MAX_CATEGORY_SUGGESTIONS",
                defaults.max_category_suggestions,
            ),
            max_brand_suggestions: read(
                &lookup,
                "FACET_ENGINE_MAX_BRAND_SUGGESTIONS",
                defaults.max_brand_suggestions,
            ),
            max_saved_searches: read(
                &lookup,
                "FACET_ENGINE_MAX_SAVED_SEARCHES",
                defaults.max_saved_searches,
            ),
            new_arrival_days: read(
                &lookup,
                "FACET_ENGINE_NEW_ARRIVAL_DAYS",
                defaults.new_arrival_days,
            ),
        }
    }
}

fn read<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Ignoring unparsable {}={:?}", key, raw);
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_overrides_and_bad_values_fall_back() {
        let config = EngineConfig::from_lookup(|key| match key {
            "FACET_ENGINE_MAX_SAVED_SEARCHES" => Some("3".to_string()),
            "FACET_ENGINE_SUGGESTION_DEBOUNCE_MS" => Some("soon".to_string()),
            _ => None,
        });
        assert_eq!(config.max_saved_searches, 3);
        assert_eq!(config.suggestion_debounce_ms, 300);
        assert_eq!(config.max_suggestions, 8);
    }
}
