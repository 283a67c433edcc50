//! Shared search filter models and helpers.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PRICE_MIN: f64 = 0.0;
pub const DEFAULT_PRICE_MAX: f64 = 1000.0;
pub const MAX_RATING: u8 = 4;

/// Inclusive price bounds, serialized as a `[min, max]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange(pub f64, pub f64);

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self(min, max)
    }
    pub fn min(&self) -> f64 {
        self.0
    }
    pub fn max(&self) -> f64 {
        self.1
    }
    pub fn contains(&self, price: f64) -> bool {
        price >= self.0 && price <= self.1
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self(DEFAULT_PRICE_MIN, DEFAULT_PRICE_MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at >= from) && self.to.is_none_or(|to| at <= to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Relevance,
    Price,
    Rating,
    Newest,
    Popular,
    Discount,
    Sales,
    Reviews,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// The canonical filter state of one search session.
///
/// Always fully populated: `SearchFilters::default()` is the zero state that
/// active-filter counts and diffs are measured against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchFilters {
    pub query: String,
    pub categories: BTreeSet<String>,
    pub brands: BTreeSet<String>,
    pub sellers: BTreeSet<String>,
    pub condition: BTreeSet<String>,
    pub shipping: BTreeSet<String>,
    pub availability: BTreeSet<String>,
    pub features: BTreeSet<String>,
    pub price_range: PriceRange,
    pub rating: u8,
    pub location: String,
    pub date_range: DateRange,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub include_out_of_stock: bool,
    pub verified_sellers_only: bool,
    pub free_shipping_only: bool,
    pub new_arrivals_only: bool,
    pub on_sale_only: bool,
    pub local_delivery_only: bool,
    pub custom_fields: BTreeMap<String, serde_json::Value>,
}

impl SearchFilters {
    pub fn is_default(&self) -> bool {
        self == &SearchFilters::default()
    }

    pub fn facet(&self, key: FacetKey) -> &BTreeSet<String> {
        match key {
            FacetKey::Categories => &self.categories,
            FacetKey::Brands => &self.brands,
            FacetKey::Sellers => &self.sellers,
            FacetKey::Condition => &self.condition,
            FacetKey::Shipping => &self.shipping,
            FacetKey::Availability => &self.availability,
            FacetKey::Features => &self.features,
        }
    }

    pub fn facet_mut(&mut self, key: FacetKey) -> &mut BTreeSet<String> {
        match key {
            FacetKey::Categories => &mut self.categories,
            FacetKey::Brands => &mut self.brands,
            FacetKey::Sellers => &mut self.sellers,
            FacetKey::Condition => &mut self.condition,
            FacetKey::Shipping => &mut self.shipping,
            FacetKey::Availability => &mut self.availability,
            FacetKey::Features => &mut self.features,
        }
    }
}

/// The set-valued fields of [`SearchFilters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FacetKey {
    Categories,
    Brands,
    Sellers,
    Condition,
    Shipping,
    Availability,
    Features,
}

impl FacetKey {
    pub const ALL: [FacetKey; 7] = [
        FacetKey::Categories,
        FacetKey::Brands,
        FacetKey::Sellers,
        FacetKey::Condition,
        FacetKey::Shipping,
        FacetKey::Availability,
        FacetKey::Features,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FacetKey::Categories => "categories",
            FacetKey::Brands => "brands",
            FacetKey::Sellers => "sellers",
            FacetKey::Condition => "condition",
            FacetKey::Shipping => "shipping",
            FacetKey::Availability => "availability",
            FacetKey::Features => "features",
        }
    }
}

impl Display for FacetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFacetKey(pub String);

impl Display for UnknownFacetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown facet key: {}", self.0)
    }
}

impl std::error::Error for UnknownFacetKey {}

impl FromStr for FacetKey {
    type Err = UnknownFacetKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FacetKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownFacetKey(s.to_string()))
    }
}

/// A partial filter update. `None` fields are left untouched by a merge;
/// `Some` fields replace the current value wholesale (sets are not unioned).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchFiltersPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brands: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sellers: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_out_of_stock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_sellers_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_shipping_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_arrivals_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_sale_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_delivery_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<BTreeMap<String, serde_json::Value>>,
}

impl SearchFiltersPatch {
    pub fn is_empty(&self) -> bool {
        self == &SearchFiltersPatch::default()
    }

    pub fn with_facet(mut self, key: FacetKey, values: BTreeSet<String>) -> Self {
        let slot = match key {
            FacetKey::Categories => &mut self.categories,
            FacetKey::Brands => &mut self.brands,
            FacetKey::Sellers => &mut self.sellers,
            FacetKey::Condition => &mut self.condition,
            FacetKey::Shipping => &mut self.shipping,
            FacetKey::Availability => &mut self.availability,
            FacetKey::Features => &mut self.features,
        };
        *slot = Some(values);
        self
    }

    /// Shallow merge of this patch over `base`.
    pub fn merged_over(&self, base: &SearchFilters) -> SearchFilters {
        let mut out = base.clone();
        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                $(
                    if let Some(value) = &self.$field {
                        out.$field = value.clone();
                    }
                )*
            };
        }
        overlay!(
            query,
            categories,
            brands,
            sellers,
            condition,
            shipping,
            availability,
            features,
            price_range,
            rating,
            location,
            date_range,
            sort_by,
            sort_order,
            include_out_of_stock,
            verified_sellers_only,
            free_shipping_only,
            new_arrivals_only,
            on_sale_only,
            local_delivery_only,
            custom_fields,
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_filters_serialize_as_plain_json() {
        let json = serde_json::to_value(SearchFilters::default()).unwrap();
        assert_eq!(json["query"], "");
        assert_eq!(json["categories"], serde_json::json!([]));
        assert_eq!(json["priceRange"], serde_json::json!([0.0, 1000.0]));
        assert_eq!(json["sortBy"], "relevance");
        assert_eq!(json["sortOrder"], "desc");
        assert_eq!(json["dateRange"], serde_json::json!({"from": null, "to": null}));
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let filters: SearchFilters = serde_json::from_str(
            r#"{"query":"lamp","brands":["Acme"],"dateRange":{"from":"2024-01-02T03:04:05Z"}}"#,
        )
        .unwrap();
        assert_eq!(filters.query, "lamp");
        assert!(filters.brands.contains("Acme"));
        assert_eq!(filters.price_range, PriceRange::default());
        assert_eq!(
            filters.date_range.from.unwrap().to_rfc3339(),
            "2024-01-02T03:04:05+00:00"
        );
        assert_eq!(filters.date_range.to, None);
    }

    #[test]
    fn patch_replaces_sets_instead_of_union() {
        let mut base = SearchFilters::default();
        base.brands.insert("Acme".to_string());
        let patch = SearchFiltersPatch::default()
            .with_facet(FacetKey::Brands, BTreeSet::from(["Globex".to_string()]));
        let merged = patch.merged_over(&base);
        assert_eq!(merged.brands, BTreeSet::from(["Globex".to_string()]));
    }

    #[test]
    fn empty_patch_serializes_to_empty_object() {
        let patch = SearchFiltersPatch::default();
        assert!(patch.is_empty());
        assert_eq!(serde_json::to_string(&patch).unwrap(), "{}");
    }

    #[test]
    fn facet_key_parses_from_field_name() {
        assert_eq!("shipping".parse::<FacetKey>(), Ok(FacetKey::Shipping));
        assert!("colour".parse::<FacetKey>().is_err());
    }
}
