//! Keyword rules that turn query intent into filter updates.
//!
//! Rules run in declaration order and every matching rule writes its fields,
//! so when two classes set the same field the later one wins.

use std::collections::BTreeSet;

use common::search_filters::{PriceRange, SearchFiltersPatch, SortBy, SortOrder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordClass {
    Budget,
    Premium,
    Quality,
    Speed,
    Recency,
    Discount,
}

struct Rule {
    class: KeywordClass,
    keywords: &'static [&'static str],
    apply: fn(&mut SearchFiltersPatch),
}

const RULES: [Rule; 6] = [
    Rule {
        class: KeywordClass::Budget,
        keywords: &["cheap", "budget", "affordable", "under"],
        apply: budget,
    },
    Rule {
        class: KeywordClass::Premium,
        keywords: &["premium", "luxury", "expensive", "high-end"],
        apply: premium,
    },
    Rule {
        class: KeywordClass::Quality,
        keywords: &["best", "top", "highest rated", "excellent"],
        apply: quality,
    },
    Rule {
        class: KeywordClass::Speed,
        keywords: &["fast", "quick", "express", "urgent"],
        apply: speed,
    },
    Rule {
        class: KeywordClass::Recency,
        keywords: &["new", "latest", "trending", "recent"],
        apply: recency,
    },
    Rule {
        class: KeywordClass::Discount,
        keywords: &["sale", "discount", "deal", "offer"],
        apply: discount,
    },
];

fn budget(patch: &mut SearchFiltersPatch) {
    patch.price_range = Some(PriceRange::new(0.0, 50.0));
    patch.sort_by = Some(SortBy::Price);
    patch.sort_order = Some(SortOrder::Asc);
}

fn premium(patch: &mut SearchFiltersPatch) {
    patch.price_range = Some(PriceRange::new(200.0, 1000.0));
    patch.verified_sellers_only = Some(true);
}

fn quality(patch: &mut SearchFiltersPatch) {
    patch.rating = Some(4);
    patch.sort_by = Some(SortBy::Rating);
}

fn speed(patch: &mut SearchFiltersPatch) {
    patch.free_shipping_only = Some(true);
    patch.shipping = Some(BTreeSet::from(["Express".to_string(), "Same Day".to_string()]));
}

fn recency(patch: &mut SearchFiltersPatch) {
    patch.new_arrivals_only = Some(true);
    patch.sort_by = Some(SortBy::Newest);
}

fn discount(patch: &mut SearchFiltersPatch) {
    patch.on_sale_only = Some(true);
    patch.sort_by = Some(SortBy::Discount);
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

// Whole-word, case-insensitive occurrence of `keyword` in the lowercased haystack.
fn contains_word(haystack: &str, keyword: &str) -> bool {
    haystack.match_indices(keyword).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + keyword.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

/// Keyword classes present in `query`, in evaluation order.
pub fn matched_classes(query: &str) -> Vec<KeywordClass> {
    let lowered = query.to_lowercase();
    RULES
        .iter()
        .filter(|rule| rule.keywords.iter().any(|keyword| contains_word(&lowered, keyword)))
        .map(|rule| rule.class)
        .collect()
}

/// Infer filter updates from free text. Empty when nothing matches.
pub fn infer(query: &str) -> SearchFiltersPatch {
    let lowered = query.to_lowercase();
    let mut patch = SearchFiltersPatch::default();
    for rule in RULES.iter() {
        if rule.keywords.iter().any(|keyword| contains_word(&lowered, keyword)) {
            (rule.apply)(&mut patch);
        }
    }
    patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn quality_overrides_budget_sort() {
        let query = "best deals under $50";
        assert_eq!(matched_classes(query), vec![KeywordClass::Budget, KeywordClass::Quality]);

        let patch = infer(query);
        // Budget runs first and sets price sorting; quality runs later and wins.
        assert_eq!(patch.sort_by, Some(SortBy::Rating));
        assert_eq!(patch.sort_order, Some(SortOrder::Asc));
        assert_eq!(patch.price_range, Some(PriceRange::new(0.0, 50.0)));
        assert_eq!(patch.rating, Some(4));
        assert_eq!(patch.on_sale_only, None);
    }

    #[test]
    fn later_price_rule_overwrites_earlier() {
        let patch = infer("cheap luxury watch");
        assert_eq!(patch.price_range, Some(PriceRange::new(200.0, 1000.0)));
        assert_eq!(patch.verified_sellers_only, Some(true));
        assert_eq!(patch.sort_by, Some(SortBy::Price));
    }

    #[test]
    fn speed_keywords_request_fast_shipping() {
        let patch = infer("Express charger");
        assert_eq!(patch.free_shipping_only, Some(true));
        assert_eq!(
            patch.shipping,
            Some(BTreeSet::from(["Express".to_string(), "Same Day".to_string()]))
        );
    }

    #[test]
    fn multi_word_and_hyphenated_keywords() {
        assert_eq!(matched_classes("Highest Rated blenders"), vec![KeywordClass::Quality]);
        assert_eq!(matched_classes("high-end audio"), vec![KeywordClass::Premium]);
    }

    #[test]
    fn keywords_inside_other_words_do_not_match() {
        assert!(infer("renewable stopwatch").is_empty());
        assert!(infer("thunderbolt cable").is_empty());
    }

    #[test]
    fn recency_then_discount_sort() {
        let patch = infer("new sale items");
        assert_eq!(patch.new_arrivals_only, Some(true));
        assert_eq!(patch.on_sale_only, Some(true));
        assert_eq!(patch.sort_by, Some(SortBy::Discount));
    }
}
