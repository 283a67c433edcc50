//! Owner of the live filter state for one search session.

use std::collections::BTreeSet;
use std::sync::Mutex;

use common::search_filters::{FacetKey, MAX_RATING, PriceRange, SearchFilters, SearchFiltersPatch};

use crate::{error::FilterError, lock, smart_filters};

pub type FiltersListener = Box<dyn Fn(&SearchFilters) + Send + Sync>;

/// Holds the canonical [`SearchFilters`] and reports every accepted change.
///
/// Mutations merge, validate, store and notify while holding one lock, so
/// concurrent callers are serialized and listeners observe changes in order.
/// The listener must not call back into the same manager.
pub struct FilterStateManager {
    baseline: SearchFilters,
    current: Mutex<SearchFilters>,
    on_change: FiltersListener,
}

impl FilterStateManager {
    pub fn new(on_change: impl Fn(&SearchFilters) + Send + Sync + 'static) -> Self {
        Self {
            baseline: SearchFilters::default(),
            current: Mutex::new(SearchFilters::default()),
            on_change: Box::new(on_change),
        }
    }

    pub fn current(&self) -> SearchFilters {
        lock(&self.current).clone()
    }

    pub fn baseline(&self) -> &SearchFilters {
        &self.baseline
    }

    /// Merge `patch` over the current state. Rejected patches leave the state
    /// untouched and notify nobody.
    pub fn update(&self, patch: &SearchFiltersPatch) -> Result<SearchFilters, FilterError> {
        let mut current = lock(&self.current);
        let next = validated(patch.merged_over(&current))?;
        Ok(self.commit(&mut current, next))
    }

    /// Flip membership of `value` in the facet `key`.
    pub fn toggle_facet(&self, key: FacetKey, value: &str) -> Result<SearchFilters, FilterError> {
        let mut current = lock(&self.current);
        let mut next = current.clone();
        *next.facet_mut(key) = toggled_facet(&current, key, value);
        let next = validated(next)?;
        Ok(self.commit(&mut current, next))
    }

    /// Reset to the baseline. Notifies even when nothing changed.
    pub fn clear(&self) -> SearchFilters {
        let mut current = lock(&self.current);
        tracing::debug!("Filters cleared");
        self.commit(&mut current, self.baseline.clone())
    }

    /// Reset to the baseline and overlay `patch`, as one notification.
    pub fn apply_preset(
        &self,
        patch: &SearchFiltersPatch,
    ) -> Result<SearchFilters, FilterError> {
        let mut current = lock(&self.current);
        let next = validated(patch.merged_over(&self.baseline))?;
        Ok(self.commit(&mut current, next))
    }

    /// Replace the whole state, e.g. with a saved search being re-applied.
    pub fn restore(&self, filters: SearchFilters) -> Result<SearchFilters, FilterError> {
        let mut current = lock(&self.current);
        let next = validated(filters)?;
        Ok(self.commit(&mut current, next))
    }

    /// Submit `query` together with whatever filters its keywords imply.
    /// Returns `None` when neither the query nor any filter would change.
    pub fn apply_smart_filters(
        &self,
        query: &str,
    ) -> Result<Option<SearchFilters>, FilterError> {
        let mut patch = smart_filters::infer(query);
        let mut current = lock(&self.current);
        if patch.is_empty() && current.query == query {
            return Ok(None);
        }
        patch.query = Some(query.to_string());
        let next = validated(patch.merged_over(&current))?;
        Ok(Some(self.commit(&mut current, next)))
    }

    // Store and announce an already validated state; caller holds the lock.
    fn commit(&self, current: &mut SearchFilters, next: SearchFilters) -> SearchFilters {
        *current = next;
        tracing::debug!(
            "Filters updated, {} active",
            active_filter_count(current, &self.baseline)
        );
        (self.on_change)(current);
        current.clone()
    }

    pub fn active_filter_count(&self) -> usize {
        active_filter_count(&lock(&self.current), &self.baseline)
    }
}

/// The facet set after toggling `value`: added if absent, removed if present.
pub fn toggled_facet(filters: &SearchFilters, key: FacetKey, value: &str) -> BTreeSet<String> {
    let mut values = filters.facet(key).clone();
    if !values.remove(value) {
        values.insert(value.to_string());
    }
    values
}

/// Number of filters that differ from the zero state.
///
/// `sellers`, `date_range`, `local_delivery_only` and `include_out_of_stock`
/// are not counted.
pub fn active_filter_count(filters: &SearchFilters, baseline: &SearchFilters) -> usize {
    [
        !filters.query.is_empty(),
        !filters.categories.is_empty(),
        filters.price_range != baseline.price_range,
        filters.rating > 0,
        !filters.condition.is_empty(),
        !filters.shipping.is_empty(),
        !filters.brands.is_empty(),
        !filters.location.is_empty(),
        !filters.availability.is_empty(),
        !filters.features.is_empty(),
        filters.verified_sellers_only,
        filters.free_shipping_only,
        filters.new_arrivals_only,
        filters.on_sale_only,
    ]
    .into_iter()
    .filter(|active| *active)
    .count()
}

fn validated(mut filters: SearchFilters) -> Result<SearchFilters, FilterError> {
    let PriceRange(min, max) = filters.price_range;
    if !min.is_finite() || !max.is_finite() {
        return Err(reject(format!("price bounds must be finite, got ({min}, {max})")));
    }
    let (min, max) = (min.max(0.0), max.max(0.0));
    if min > max {
        return Err(reject(format!("price range minimum {min} exceeds maximum {max}")));
    }
    filters.price_range = PriceRange(min, max);

    if filters.rating > MAX_RATING {
        return Err(reject(format!("rating {} is above {MAX_RATING}", filters.rating)));
    }
    if let (Some(from), Some(to)) = (filters.date_range.from, filters.date_range.to) {
        if from > to {
            return Err(reject(format!("date range starts at {from} after it ends at {to}")));
        }
    }
    Ok(filters)
}

fn reject(reason: String) -> FilterError {
    tracing::warn!("Rejected filter update: {}", reason);
    FilterError::InvalidFilter(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use common::search_filters::{DateRange, SortBy};
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    fn recording_manager() -> (FilterStateManager, Arc<Mutex<Vec<SearchFilters>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let manager =
            FilterStateManager::new(move |filters| sink.lock().unwrap().push(filters.clone()));
        (manager, seen)
    }

    #[test]
    fn update_merges_and_notifies_once() {
        let (manager, seen) = recording_manager();
        let patch = SearchFiltersPatch {
            query: Some("kettle".to_string()),
            rating: Some(3),
            ..Default::default()
        };
        let next = manager.update(&patch).unwrap();
        assert_eq!(next.query, "kettle");
        assert_eq!(next.rating, 3);
        assert_eq!(next.sort_by, SortBy::Relevance);
        assert_eq!(*seen.lock().unwrap(), vec![next.clone()]);
        assert_eq!(manager.current(), next);
    }

    #[test]
    fn inverted_price_range_is_rejected_silently() {
        let (manager, seen) = recording_manager();
        let patch = price_patch(50.0, 10.0);
        let err = manager.update(&patch).unwrap_err();
        assert!(matches!(err, FilterError::InvalidFilter(_)));
        assert!(manager.current().is_default());
        assert!(seen.lock().unwrap().is_empty());
    }

    fn price_patch(min: f64, max: f64) -> SearchFiltersPatch {
        SearchFiltersPatch { price_range: Some(PriceRange(min, max)), ..Default::default() }
    }

    #[test]
    fn non_finite_price_bounds_are_rejected() {
        let (manager, seen) = recording_manager();
        for (min, max) in [(0.0, f64::INFINITY), (f64::NEG_INFINITY, 10.0), (f64::NAN, 10.0)] {
            let err = manager.update(&price_patch(min, max)).unwrap_err();
            assert!(matches!(err, FilterError::InvalidFilter(_)));
        }
        let mut restored = SearchFilters::default();
        restored.price_range = PriceRange(5.0, f64::INFINITY);
        assert!(manager.restore(restored).is_err());

        assert!(manager.current().is_default());
        assert!(seen.lock().unwrap().is_empty());
        // Whatever was accepted must survive a JSON round trip.
        let json = serde_json::to_string(&manager.current()).unwrap();
        let parsed: SearchFilters = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, manager.current());
    }

    #[test]
    fn negative_prices_are_clamped() {
        let (manager, _) = recording_manager();
        let patch = price_patch(-20.0, 80.0);
        assert_eq!(manager.update(&patch).unwrap().price_range, PriceRange(0.0, 80.0));
    }

    #[test]
    fn out_of_range_rating_and_dates_are_rejected() {
        let (manager, _) = recording_manager();
        let rating = SearchFiltersPatch { rating: Some(5), ..Default::default() };
        assert!(manager.update(&rating).is_err());

        let dates = SearchFiltersPatch {
            date_range: Some(DateRange {
                from: Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()),
                to: Some(Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()),
            }),
            ..Default::default()
        };
        assert!(manager.update(&dates).is_err());
        assert!(manager.current().is_default());
    }

    #[test]
    fn toggling_twice_restores_the_original() {
        let (manager, seen) = recording_manager();
        let original = manager.current();
        let once = manager.toggle_facet(FacetKey::Brands, "Acme").unwrap();
        assert!(once.brands.contains("Acme"));
        let twice = manager.toggle_facet(FacetKey::Brands, "Acme").unwrap();
        assert_eq!(twice, original);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn clear_at_default_still_notifies() {
        let (manager, seen) = recording_manager();
        manager.clear();
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn preset_is_one_notification_from_a_clean_slate() {
        let (manager, seen) = recording_manager();
        let desk = SearchFiltersPatch { query: Some("desk".to_string()), ..Default::default() };
        manager.update(&desk).unwrap();
        seen.lock().unwrap().clear();

        let preset = SearchFiltersPatch { on_sale_only: Some(true), ..Default::default() };
        let next = manager.apply_preset(&preset).unwrap();
        assert_eq!(next.query, "");
        assert!(next.on_sale_only);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn count_tracks_one_facet_at_a_time() {
        let (manager, _) = recording_manager();
        assert_eq!(manager.active_filter_count(), 0);
        manager.update(&SearchFiltersPatch { rating: Some(4), ..Default::default() }).unwrap();
        assert_eq!(manager.active_filter_count(), 1);
        manager.clear();
        assert_eq!(manager.active_filter_count(), 0);
    }

    #[test]
    fn local_delivery_and_out_of_stock_are_not_counted() {
        let (manager, _) = recording_manager();
        let patch = SearchFiltersPatch {
            local_delivery_only: Some(true),
            include_out_of_stock: Some(true),
            ..Default::default()
        };
        manager.update(&patch).unwrap();
        assert_eq!(manager.active_filter_count(), 0);
    }

    #[test]
    fn every_counted_field_adds_one() {
        let mut filters = SearchFilters::default();
        filters.query = "q".to_string();
        filters.price_range = PriceRange(10.0, 20.0);
        filters.rating = 2;
        filters.location = "Berlin".to_string();
        filters.verified_sellers_only = true;
        filters.free_shipping_only = true;
        filters.new_arrivals_only = true;
        filters.on_sale_only = true;
        for key in [
            FacetKey::Categories,
            FacetKey::Brands,
            FacetKey::Condition,
            FacetKey::Shipping,
            FacetKey::Availability,
            FacetKey::Features,
        ] {
            filters.facet_mut(key).insert("x".to_string());
        }
        assert_eq!(active_filter_count(&filters, &SearchFilters::default()), 14);
        filters.sellers.insert("ignored".to_string());
        assert_eq!(active_filter_count(&filters, &SearchFilters::default()), 14);
    }

    #[test]
    fn smart_filters_skip_noop_updates() {
        let (manager, seen) = recording_manager();
        assert_eq!(manager.apply_smart_filters("").unwrap(), None);
        assert!(seen.lock().unwrap().is_empty());

        let next = manager.apply_smart_filters("cheap headphones").unwrap().unwrap();
        assert_eq!(next.query, "cheap headphones");
        assert_eq!(next.price_range, PriceRange(0.0, 50.0));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn smart_filters_noop_check_sees_the_latest_query() {
        let (manager, seen) = recording_manager();
        let lamp = SearchFiltersPatch { query: Some("lamp".to_string()), ..Default::default() };
        manager.update(&lamp).unwrap();
        assert_eq!(manager.apply_smart_filters("lamp").unwrap(), None);
        assert_eq!(seen.lock().unwrap().len(), 1);

        let next = manager.apply_smart_filters("desk").unwrap().unwrap();
        assert_eq!(next.query, "desk");
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn concurrent_updates_do_not_interleave() {
        let (manager, seen) = recording_manager();
        let manager = Arc::new(manager);
        let handles = (0..8)
            .map(|i| {
                let manager = Arc::clone(&manager);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        manager.toggle_facet(FacetKey::Features, &format!("f{i}")).unwrap();
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }
        // Each feature was toggled an odd number of times.
        assert_eq!(manager.current().features.len(), 8);
        assert_eq!(seen.lock().unwrap().len(), 200);
    }
}
