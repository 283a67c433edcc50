//! Saved searches and bundled filter presets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::search_filters::{SearchFilters, SearchFiltersPatch};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearch {
    pub id: String,
    pub name: String,
    pub filters: SearchFilters,
    pub alerts_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPreset {
    pub name: String,
    pub partial_filters: SearchFiltersPatch,
}
