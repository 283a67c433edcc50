//! Apply a filter state to an in-memory catalog.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use common::{
    catalog::CatalogEntry,
    search_filters::{SearchFilters, SortBy, SortOrder},
};

use crate::config::EngineConfig;

/// Entries matching every active filter, sorted per `sort_by`/`sort_order`.
///
/// Values inside one facet are alternatives; facets and toggles must all
/// hold. `Relevance` keeps catalog order. Other sorts break ties by id.
pub fn select<'a>(
    catalog: &'a [CatalogEntry],
    filters: &SearchFilters,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Vec<&'a CatalogEntry> {
    let query = filters.query.trim().to_lowercase();
    let location = filters.location.trim().to_lowercase();
    let new_since = now - Duration::days(config.new_arrival_days);

    let mut selected = catalog
        .iter()
        .filter(|entry| {
            matches_query(entry, &query)
                && in_set(&filters.categories, Some(entry.category.as_str()))
                && in_set(&filters.brands, entry.brand_or_seller())
                && in_set(&filters.sellers, entry.seller_name.as_deref())
                && in_set(&filters.condition, entry.condition.as_deref())
                && in_set(&filters.availability, entry.availability.as_deref())
                && overlaps(&filters.shipping, &entry.shipping)
                && overlaps(&filters.features, &entry.features)
                && filters.price_range.contains(entry.price)
                && entry.rating >= f64::from(filters.rating)
                && (location.is_empty()
                    || entry
                        .location
                        .as_deref()
                        .is_some_and(|l| l.to_lowercase().contains(&location)))
                && (filters.date_range.is_unbounded()
                    || entry.created_at.is_some_and(|at| filters.date_range.contains(at)))
                && (filters.include_out_of_stock || entry.in_stock)
                && (!filters.verified_sellers_only || entry.verified_seller)
                && (!filters.free_shipping_only || entry.free_shipping)
                && (!filters.new_arrivals_only
                    || entry.created_at.is_some_and(|at| at >= new_since))
                && (!filters.on_sale_only || entry.is_on_sale())
                && (!filters.local_delivery_only || entry.local_delivery)
        })
        .collect::<Vec<_>>();

    if filters.sort_by != SortBy::Relevance {
        selected.sort_by(|a, b| {
            let ordering = compare(a, b, filters.sort_by);
            let ordering = match filters.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            };
            ordering.then_with(|| a.id.cmp(&b.id))
        });
    }
    selected
}

fn matches_query(entry: &CatalogEntry, query: &str) -> bool {
    query.is_empty()
        || entry.name.to_lowercase().contains(query)
        || entry.category.to_lowercase().contains(query)
        || entry.brand_or_seller().is_some_and(|brand| brand.to_lowercase().contains(query))
}

fn in_set(selected: &BTreeSet<String>, value: Option<&str>) -> bool {
    selected.is_empty() || value.is_some_and(|value| selected.contains(value))
}

fn overlaps(selected: &BTreeSet<String>, values: &BTreeSet<String>) -> bool {
    selected.is_empty() || !selected.is_disjoint(values)
}

fn compare(a: &CatalogEntry, b: &CatalogEntry, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::Relevance => Ordering::Equal,
        SortBy::Price => a.price.total_cmp(&b.price),
        SortBy::Rating => a.rating.total_cmp(&b.rating),
        SortBy::Newest => a.created_at.cmp(&b.created_at),
        SortBy::Popular => (a.review_count, a.sales).cmp(&(b.review_count, b.sales)),
        SortBy::Discount => a.discount_percent.total_cmp(&b.discount_percent),
        SortBy::Sales => a.sales.cmp(&b.sales),
        SortBy::Reviews => a.review_count.cmp(&b.review_count),
    }
}
