//! Facet option lists derived from the catalog.

use serde::{Deserialize, Serialize};

use crate::search_filters::FacetKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetOptions {
    pub facet: FacetKey,
    pub options: Vec<FacetOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetOption {
    pub display_string: String,
    pub value: String,
    pub count: u64,
}

impl FacetOption {
    /// Label used by facet lists and suggestions, e.g. `Electronics (42 products)`.
    pub fn label(&self) -> String {
        product_count_label(&self.display_string, self.count)
    }
}

pub fn product_count_label(name: &str, count: u64) -> String {
    if count == 1 {
        format!("{name} (1 product)")
    } else {
        format!("{name} ({count} products)")
    }
}
