//! In-memory facet index over the product catalog.

use std::collections::{BTreeMap, HashMap};

use common::{
    catalog::CatalogEntry,
    facet_option::{FacetOption, FacetOptions},
    search_filters::FacetKey,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IndexedProduct {
    pub name: String,
    pub name_lower: String,
}

/// Derived, read-only view of a catalog. Rebuilt wholesale when the catalog changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogIndex {
    products: Vec<IndexedProduct>,
    facet_counts: HashMap<FacetKey, BTreeMap<String, u64>>,
}

impl CatalogIndex {
    /// Build from a catalog that may not have loaded. A missing catalog is
    /// recovered into the empty index.
    pub fn build(catalog: Option<&[CatalogEntry]>) -> Self {
        match catalog {
            Some(entries) => Self::from_entries(entries),
            None => {
                tracing::warn!("Catalog unavailable, using an empty index");
                Self::default()
            }
        }
    }

    pub fn from_entries(entries: &[CatalogEntry]) -> Self {
        let mut index = CatalogIndex {
            products: Vec::with_capacity(entries.len()),
            facet_counts: HashMap::new(),
        };
        for entry in entries {
            index.products.push(IndexedProduct {
                name: entry.name.clone(),
                name_lower: entry.name.to_lowercase(),
            });
            index.bump(FacetKey::Categories, &entry.category);
            if let Some(brand) = entry.brand_or_seller() {
                index.bump(FacetKey::Brands, brand);
            }
            if let Some(seller) = &entry.seller_name {
                index.bump(FacetKey::Sellers, seller);
            }
            if let Some(condition) = &entry.condition {
                index.bump(FacetKey::Condition, condition);
            }
            if let Some(availability) = &entry.availability {
                index.bump(FacetKey::Availability, availability);
            }
            for shipping in &entry.shipping {
                index.bump(FacetKey::Shipping, shipping);
            }
            for feature in &entry.features {
                index.bump(FacetKey::Features, feature);
            }
        }
        tracing::debug!(
            "Indexed {} catalog entries: {} categories, {} brands",
            index.products.len(),
            index.facet_len(FacetKey::Categories),
            index.facet_len(FacetKey::Brands),
        );
        index
    }

    fn bump(&mut self, key: FacetKey, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        *self.facet_counts.entry(key).or_default().entry(value.to_string()).or_insert(0) += 1;
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub(crate) fn products(&self) -> &[IndexedProduct] {
        &self.products
    }

    fn facet_len(&self, key: FacetKey) -> usize {
        self.facet_counts.get(&key).map_or(0, |counts| counts.len())
    }

    /// Distinct values of one facet with their item counts, sorted by value.
    pub fn facet_counts(&self, key: FacetKey) -> impl Iterator<Item = (&str, u64)> {
        self.facet_counts
            .get(&key)
            .into_iter()
            .flat_map(|counts| counts.iter().map(|(value, count)| (value.as_str(), *count)))
    }

    pub fn count(&self, key: FacetKey, value: &str) -> u64 {
        self.facet_counts
            .get(&key)
            .and_then(|counts| counts.get(value))
            .copied()
            .unwrap_or(0)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.facet_counts(FacetKey::Categories).map(|(value, _)| value)
    }

    pub fn brands(&self) -> impl Iterator<Item = &str> {
        self.facet_counts(FacetKey::Brands).map(|(value, _)| value)
    }

    pub fn sellers(&self) -> impl Iterator<Item = &str> {
        self.facet_counts(FacetKey::Sellers).map(|(value, _)| value)
    }

    /// Option list for a facet panel, most populated first.
    pub fn facet_options(&self, key: FacetKey) -> FacetOptions {
        let mut options = self
            .facet_counts(key)
            .map(|(value, count)| FacetOption {
                display_string: value.to_string(),
                value: value.to_string(),
                count,
            })
            .collect::<Vec<_>>();
        options.sort_by_key(|item| (u64::MAX - item.count, item.display_string.clone()));
        FacetOptions { facet: key, options }
    }
}
