//! Read-only product catalog entries supplied by the host application.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_in_stock() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub seller_name: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub rating: f64,

    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default)]
    pub verified_seller: bool,
    #[serde(default)]
    pub free_shipping: bool,
    #[serde(default)]
    pub local_delivery: bool,
    #[serde(default)]
    pub discount_percent: f64,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub shipping: BTreeSet<String>,
    #[serde(default)]
    pub features: BTreeSet<String>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sales: u64,
    #[serde(default)]
    pub review_count: u64,
}

impl CatalogEntry {
    /// Minimal entry; every optional attribute takes its serde default.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            brand: None,
            seller_name: None,
            price,
            rating: 0.0,
            in_stock: true,
            verified_seller: false,
            free_shipping: false,
            local_delivery: false,
            discount_percent: 0.0,
            condition: None,
            shipping: BTreeSet::new(),
            features: BTreeSet::new(),
            availability: None,
            location: None,
            created_at: None,
            sales: 0,
            review_count: 0,
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_seller(mut self, seller: impl Into<String>) -> Self {
        self.seller_name = Some(seller.into());
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    /// The label shown in the brand facet: the brand if known, else the seller.
    pub fn brand_or_seller(&self) -> Option<&str> {
        self.brand.as_deref().or(self.seller_name.as_deref())
    }

    pub fn is_on_sale(&self) -> bool {
        self.discount_percent > 0.0
    }
}
