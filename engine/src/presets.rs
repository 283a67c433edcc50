//! Filter presets bundled with the application.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use common::{
    saved_search::FilterPreset,
    search_filters::{PriceRange, SearchFiltersPatch, SortBy, SortOrder},
};

static PRESETS: LazyLock<Vec<FilterPreset>> = LazyLock::new(|| {
    vec![
        preset("Budget Friendly", SearchFiltersPatch {
            price_range: Some(PriceRange::new(0.0, 50.0)),
            sort_by: Some(SortBy::Price),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        }),
        preset("Top Rated", SearchFiltersPatch {
            rating: Some(4),
            sort_by: Some(SortBy::Rating),
            sort_order: Some(SortOrder::Desc),
            ..Default::default()
        }),
        preset("Fast Delivery", SearchFiltersPatch {
            free_shipping_only: Some(true),
            shipping: Some(BTreeSet::from(["Express".to_string(), "Same Day".to_string()])),
            ..Default::default()
        }),
        preset("New Arrivals", SearchFiltersPatch {
            new_arrivals_only: Some(true),
            sort_by: Some(SortBy::Newest),
            ..Default::default()
        }),
        preset("On Sale", SearchFiltersPatch {
            on_sale_only: Some(true),
            sort_by: Some(SortBy::Discount),
            ..Default::default()
        }),
        preset("Premium Sellers", SearchFiltersPatch {
            price_range: Some(PriceRange::new(200.0, 1000.0)),
            verified_sellers_only: Some(true),
            ..Default::default()
        }),
    ]
});

fn preset(name: &str, partial_filters: SearchFiltersPatch) -> FilterPreset {
    FilterPreset { name: name.to_string(), partial_filters }
}

pub fn list_presets() -> &'static [FilterPreset] {
    &PRESETS
}

pub fn find_preset(name: &str) -> Option<&'static FilterPreset> {
    PRESETS.iter().find(|preset| preset.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_named_and_non_empty() {
        let presets = list_presets();
        assert_eq!(presets.len(), 6);
        assert!(presets.iter().all(|p| !p.partial_filters.is_empty()));
        assert_eq!(find_preset("on sale").map(|p| p.name.as_str()), Some("On Sale"));
    }
}
