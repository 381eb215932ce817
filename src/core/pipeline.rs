//! Filter, sort and paginate catalog records for display.
//!
//! Every function here is pure: inputs are borrowed, results are new vectors.

use crate::core::{CatalogRecord, FavoriteSet, SortMode, VisibleWindow};
use icu_collator::{Collator, CollatorOptions};
use serde::Serialize;
use std::cmp::Ordering;

/// Keeps records whose identity is in `favorites`, in input order.
/// `None` means no restriction.
pub fn restrict(records: &[CatalogRecord], favorites: Option<&FavoriteSet>) -> Vec<CatalogRecord> {
    match favorites {
        Some(set) => records
            .iter()
            .filter(|record| set.contains(record.identity()))
            .cloned()
            .collect(),
        None => records.to_vec(),
    }
}

/// Orders display names the way a Unicode collator does: accents and case are
/// secondary to the base letter, and each script keeps its alphabet order
/// (`Émile` before `Zoe`, `Ірина` before `Яна`).
struct NameOrder {
    collator: Option<Collator>,
}

impl NameOrder {
    fn new() -> Self {
        let collator = Collator::try_new(&Default::default(), CollatorOptions::new())
            .map_err(|e| {
                tracing::warn!("⚠️ Name collator unavailable, comparing case-folded names: {:?}", e)
            })
            .ok();
        Self { collator }
    }

    /// Names the collator treats as equal fall back to code point order.
    fn compare(&self, a: &str, b: &str) -> Ordering {
        let collated = match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a
                .chars()
                .flat_map(char::to_lowercase)
                .cmp(b.chars().flat_map(char::to_lowercase)),
        };
        collated.then_with(|| a.cmp(b))
    }
}

fn compare(names: &NameOrder, a: &CatalogRecord, b: &CatalogRecord, mode: SortMode) -> Ordering {
    match mode {
        SortMode::NameAsc => names.compare(&a.name, &b.name),
        SortMode::NameDesc => names.compare(&b.name, &a.name),
        SortMode::PriceAsc => a.hourly_rate().total_cmp(&b.hourly_rate()),
        SortMode::PriceDesc => b.hourly_rate().total_cmp(&a.hourly_rate()),
        SortMode::RatingAsc => a.rating_score().total_cmp(&b.rating_score()),
        SortMode::RatingDesc => b.rating_score().total_cmp(&a.rating_score()),
        SortMode::Default => Ordering::Equal,
    }
}

/// Stable sort; equal records keep their input order in both directions.
pub fn sort(records: &[CatalogRecord], mode: SortMode) -> Vec<CatalogRecord> {
    let mut sorted = records.to_vec();
    if mode != SortMode::Default {
        let names = NameOrder::new();
        sorted.sort_by(|a, b| compare(&names, a, b, mode));
    }
    sorted
}

pub fn paginate(records: &[CatalogRecord], window: VisibleWindow) -> Vec<CatalogRecord> {
    records.iter().take(window.count).cloned().collect()
}

pub fn advance(window: VisibleWindow, step: usize) -> VisibleWindow {
    VisibleWindow::new(window.count.saturating_add(step))
}

/// Everything a view needs to derive one page.
#[derive(Debug, Clone, Copy)]
pub struct ListQuery<'a> {
    pub mode: SortMode,
    pub favorites: Option<&'a FavoriteSet>,
    /// `None` shows the whole sorted list.
    pub window: Option<VisibleWindow>,
}

impl<'a> ListQuery<'a> {
    pub fn new(mode: SortMode) -> Self {
        Self {
            mode,
            favorites: None,
            window: None,
        }
    }

    pub fn restricted_to(mut self, favorites: &'a FavoriteSet) -> Self {
        self.favorites = Some(favorites);
        self
    }

    pub fn windowed(mut self, window: VisibleWindow) -> Self {
        self.window = Some(window);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub mode: SortMode,
    pub items: Vec<CatalogRecord>,
    /// Length of the sorted list before the window was applied.
    pub total: usize,
    pub has_more: bool,
}

/// restrict → sort → paginate.
pub fn derive(records: &[CatalogRecord], query: &ListQuery<'_>) -> Page {
    let restricted = restrict(records, query.favorites);
    let sorted = sort(&restricted, query.mode);
    let total = sorted.len();

    let (items, has_more) = match query.window {
        Some(window) => (paginate(&sorted, window), window.count < total),
        None => (sorted, false),
    };

    tracing::debug!(
        "Derived {} of {} records (mode: {:?}, has_more: {})",
        items.len(),
        total,
        query.mode,
        has_more
    );

    Page {
        mode: query.mode,
        items,
        total,
        has_more,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str, price: f64, rating: f64) -> CatalogRecord {
        CatalogRecord {
            id: None,
            name: name.to_string(),
            avatar_url: String::new(),
            experience: String::new(),
            reviews: vec![],
            price_per_hour: Some(price),
            rating: Some(rating),
            license: String::new(),
            specialization: String::new(),
            initial_consultation: String::new(),
            about: String::new(),
        }
    }

    fn names(records: &[CatalogRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    fn scenario() -> Vec<CatalogRecord> {
        vec![rec("B", 10.0, 3.0), rec("A", 20.0, 5.0), rec("C", 15.0, 4.0)]
    }

    /// Several records share prices and ratings so ties are exercised.
    fn with_ties() -> Vec<CatalogRecord> {
        vec![
            rec("t1", 160.0, 4.8),
            rec("t2", 120.0, 4.75),
            rec("t3", 160.0, 4.75),
            rec("t4", 180.0, 4.8),
            rec("t5", 120.0, 4.8),
            rec("t6", 180.0, 4.55),
        ]
    }

    #[test]
    fn test_scenario_name_and_price() {
        let records = scenario();

        assert_eq!(names(&sort(&records, SortMode::NameAsc)), vec!["A", "B", "C"]);

        let by_price = sort(&records, SortMode::PriceDesc);
        assert_eq!(names(&by_price), vec!["A", "C", "B"]);
        assert_eq!(by_price[0].hourly_rate(), 20.0);

        let page = paginate(&by_price, VisibleWindow::new(2));
        assert_eq!(names(&page), vec!["A", "C"]);
    }

    #[test]
    fn test_scenario_restrict_to_single_favorite() {
        let favorites: FavoriteSet = ["A"].into_iter().collect();
        let restricted = restrict(&scenario(), Some(&favorites));
        assert_eq!(names(&restricted), vec!["A"]);
    }

    #[test]
    fn test_scenario_advance_then_paginate() {
        let window = VisibleWindow::new(3);
        let advanced = advance(window, 3);
        assert_eq!(advanced, VisibleWindow::new(6));

        let five = vec![
            rec("a", 1.0, 1.0),
            rec("b", 2.0, 2.0),
            rec("c", 3.0, 3.0),
            rec("d", 4.0, 4.0),
            rec("e", 5.0, 5.0),
        ];
        let sorted = sort(&five, SortMode::NameAsc);
        assert_eq!(paginate(&sorted, advanced).len(), 5);
    }

    #[test]
    fn test_sort_is_stable_for_every_mode() {
        let records = with_ties();
        let order = NameOrder::new();
        for mode in SortMode::ALL {
            let sorted = sort(&records, mode);
            for pair in sorted.windows(2) {
                if compare(&order, &pair[0], &pair[1], mode) == Ordering::Equal {
                    let first = records.iter().position(|r| r.name == pair[0].name);
                    let second = records.iter().position(|r| r.name == pair[1].name);
                    assert!(first < second, "{:?} broke input order", mode);
                }
            }
        }
    }

    #[test]
    fn test_default_mode_keeps_input_order() {
        let records = with_ties();
        assert_eq!(sort(&records, SortMode::Default), records);
    }

    #[test]
    fn test_descending_mirrors_ascending_up_to_ties() {
        let records = with_ties();
        let pairs = [
            (SortMode::PriceAsc, SortMode::PriceDesc),
            (SortMode::RatingAsc, SortMode::RatingDesc),
        ];
        for (asc, desc) in pairs {
            let key = |r: &CatalogRecord| match asc {
                SortMode::PriceAsc => r.hourly_rate(),
                _ => r.rating_score(),
            };
            let mut reversed: Vec<f64> = sort(&records, asc).iter().map(key).collect();
            reversed.reverse();
            let descending: Vec<f64> = sort(&records, desc).iter().map(key).collect();
            assert_eq!(reversed, descending);
        }

        let mut reversed = names(&sort(&scenario(), SortMode::NameAsc))
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        reversed.reverse();
        let descending = names(&sort(&scenario(), SortMode::NameDesc))
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        assert_eq!(reversed, descending);
    }

    #[test]
    fn test_sort_leaves_input_untouched() {
        let records = scenario();
        let before = records.clone();
        let _ = sort(&records, SortMode::RatingDesc);
        assert_eq!(records, before);
    }

    #[test]
    fn test_name_sort_keeps_case_variants_adjacent() {
        let records = vec![rec("bob", 1.0, 1.0), rec("Anna", 1.0, 1.0), rec("anna", 1.0, 1.0)];
        assert_eq!(
            names(&sort(&records, SortMode::NameAsc)),
            vec!["anna", "Anna", "bob"]
        );
    }

    #[test]
    fn test_name_sort_follows_alphabet_across_scripts() {
        let records = vec![
            rec("Яна", 1.0, 1.0),
            rec("Ірина", 1.0, 1.0),
            rec("Zoe", 1.0, 1.0),
            rec("Émile", 1.0, 1.0),
            rec("Adam", 1.0, 1.0),
        ];
        assert_eq!(
            names(&sort(&records, SortMode::NameAsc)),
            vec!["Adam", "Émile", "Zoe", "Ірина", "Яна"]
        );
        assert_eq!(
            names(&sort(&records, SortMode::NameDesc)),
            vec!["Яна", "Ірина", "Zoe", "Émile", "Adam"]
        );

        let ukrainian = vec![
            rec("Ґанна", 1.0, 1.0),
            rec("Гліб", 1.0, 1.0),
            rec("Єва", 1.0, 1.0),
            rec("Дарина", 1.0, 1.0),
        ];
        assert_eq!(
            names(&sort(&ukrainian, SortMode::NameAsc)),
            vec!["Гліб", "Ґанна", "Дарина", "Єва"]
        );
    }

    #[test]
    fn test_missing_numbers_sort_deterministically() {
        let mut missing = rec("m", 0.0, 0.0);
        missing.price_per_hour = None;
        missing.rating = Some(f64::NAN);
        let records = vec![rec("x", 5.0, 2.0), missing, rec("y", 0.0, 0.0)];

        assert_eq!(names(&sort(&records, SortMode::PriceAsc)), vec!["m", "y", "x"]);
        assert_eq!(names(&sort(&records, SortMode::RatingAsc)), vec!["m", "y", "x"]);
    }

    #[test]
    fn test_paginate_is_prefix_of_min_length() {
        let records = with_ties();
        for count in 0..=records.len() + 2 {
            let page = paginate(&records, VisibleWindow::new(count));
            assert_eq!(page.len(), count.min(records.len()));
            assert_eq!(page[..], records[..page.len()]);
        }
    }

    #[test]
    fn test_advance_is_monotonic() {
        let window = VisibleWindow::new(4);
        for step in 1..5 {
            assert!(advance(window, step).count > window.count);
        }
        assert_eq!(advance(window, 0), window);
        assert_eq!(advance(VisibleWindow::new(usize::MAX), 3).count, usize::MAX);
    }

    #[test]
    fn test_restrict_preserves_order_and_handles_none() {
        let records = with_ties();
        let favorites: FavoriteSet = ["t5", "t1", "t3", "missing"].into_iter().collect();

        assert_eq!(
            names(&restrict(&records, Some(&favorites))),
            vec!["t1", "t3", "t5"]
        );
        assert_eq!(restrict(&records, None), records);
        assert!(restrict(&records, Some(&FavoriteSet::new())).is_empty());
    }

    #[test]
    fn test_derive_reports_total_and_has_more() {
        let records = with_ties();
        let page = derive(
            &records,
            &ListQuery::new(SortMode::PriceAsc).windowed(VisibleWindow::new(3)),
        );
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total, 6);
        assert!(page.has_more);
        assert_eq!(names(&page.items), vec!["t2", "t5", "t1"]);

        let favorites: FavoriteSet = ["t4", "t6"].into_iter().collect();
        let page = derive(
            &records,
            &ListQuery::new(SortMode::RatingDesc).restricted_to(&favorites),
        );
        assert_eq!(names(&page.items), vec!["t4", "t6"]);
        assert!(!page.has_more);
    }
}
