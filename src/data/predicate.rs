//! Filter Engine Module
//! Typed predicates over the canonical table.

use crate::data::model::{EntityCategory, Observation, ValueType};
use chrono::NaiveDate;
use std::collections::HashSet;

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A single-day range.
    pub fn on(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Conjunction of optional constraints. `None` or an empty set leaves that
/// dimension unconstrained.
#[derive(Debug, Clone, Default)]
pub struct FilterPredicate {
    pub date_range: Option<DateRange>,
    pub entities: Option<HashSet<String>>,
    pub products: Option<HashSet<String>>,
    pub value_type: Option<ValueType>,
    pub category_filter: Option<HashSet<EntityCategory>>,
}

impl FilterPredicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn with_entities<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities = Some(entities.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_products<I, S>(mut self, products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.products = Some(products.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = EntityCategory>) -> Self {
        self.category_filter = Some(categories.into_iter().collect());
        self
    }

    /// True when the row satisfies every non-empty dimension.
    pub fn matches(&self, row: &Observation) -> bool {
        if let Some(range) = &self.date_range {
            if !range.contains(row.date_field) {
                return false;
            }
        }
        if !set_allows(&self.entities, &row.entity_name) {
            return false;
        }
        if !set_allows(&self.products, &row.product_name) {
            return false;
        }
        if let Some(value_type) = &self.value_type {
            if &row.p_type != value_type {
                return false;
            }
        }
        match &self.category_filter {
            Some(categories) if !categories.is_empty() => {
                categories.contains(&row.entity_category)
            }
            _ => true,
        }
    }
}

fn set_allows(set: &Option<HashSet<String>>, value: &str) -> bool {
    match set {
        Some(set) if !set.is_empty() => set.contains(value),
        _ => true,
    }
}

/// Matching rows in table order. Empty output is a normal result.
pub fn filter<'a>(rows: &'a [Observation], predicate: &FilterPredicate) -> Vec<&'a Observation> {
    rows.iter().filter(|row| predicate.matches(row)).collect()
}

/// Matching rows ordered ascending by date; ties keep table order.
pub fn filter_by_date<'a>(
    rows: &'a [Observation],
    predicate: &FilterPredicate,
) -> Vec<&'a Observation> {
    let mut matched = filter(rows, predicate);
    matched.sort_by_key(|row| row.date_field);
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<Observation> {
        vec![
            Observation::new("B.Pichincha", "Consumo", ValueType::Rate, date(2024, 3, 1), Some(15.2)),
            Observation::new("C.Jep", "Consumo", ValueType::Rate, date(2024, 1, 1), Some(16.1)),
            Observation::new("B.Pichincha", "Vivienda", ValueType::Amount, date(2024, 2, 1), Some(1e6)),
            Observation::new("Mutualista", "Consumo", ValueType::Rate, date(2024, 2, 1), None),
            Observation::new("B.Pichincha", "Consumo", ValueType::Rate, date(2024, 1, 1), Some(14.9)),
        ]
    }

    #[test]
    fn empty_predicate_matches_everything() {
        let rows = sample();
        assert_eq!(filter(&rows, &FilterPredicate::new()).len(), rows.len());
        let empty_sets = FilterPredicate::new()
            .with_entities(Vec::<String>::new())
            .with_products(Vec::<String>::new())
            .with_categories([]);
        assert_eq!(filter(&rows, &empty_sets).len(), rows.len());
    }

    #[test]
    fn date_range_is_inclusive() {
        let rows = sample();
        let predicate =
            FilterPredicate::new().with_date_range(DateRange::new(date(2024, 1, 1), date(2024, 2, 1)));
        let matched = filter(&rows, &predicate);
        assert_eq!(matched.len(), 4);
        assert!(matched.iter().all(|r| r.date_field <= date(2024, 2, 1)));
    }

    #[test]
    fn dimensions_combine_conjunctively() {
        let rows = sample();
        let predicate = FilterPredicate::new()
            .with_entities(["B.Pichincha"])
            .with_products(["Consumo"])
            .with_value_type(ValueType::Rate)
            .with_categories([EntityCategory::Bank]);
        let matched = filter(&rows, &predicate);
        assert_eq!(matched.len(), 2);
        assert!(matched
            .iter()
            .all(|r| r.entity_name == "B.Pichincha" && r.product_name == "Consumo"));
    }

    #[test]
    fn membership_is_exact_string_equality() {
        let rows = sample();
        let predicate = FilterPredicate::new().with_entities(["b.pichincha", "B.Pichincha "]);
        assert!(filter(&rows, &predicate).is_empty());
    }

    #[test]
    fn date_ordered_output_keeps_table_order_on_ties() {
        let rows = sample();
        let matched = filter_by_date(&rows, &FilterPredicate::new());
        let names: Vec<(&str, NaiveDate)> = matched
            .iter()
            .map(|r| (r.entity_name.as_str(), r.date_field))
            .collect();
        assert_eq!(
            names,
            vec![
                ("C.Jep", date(2024, 1, 1)),
                ("B.Pichincha", date(2024, 1, 1)),
                ("B.Pichincha", date(2024, 2, 1)),
                ("Mutualista", date(2024, 2, 1)),
                ("B.Pichincha", date(2024, 3, 1)),
            ]
        );
    }

    #[test]
    fn no_match_is_empty_not_error() {
        let rows = sample();
        let predicate = FilterPredicate::new().with_products(["Microcrédito"]);
        assert!(filter(&rows, &predicate).is_empty());
    }

    fn arb_row() -> impl Strategy<Value = Observation> {
        (
            prop::sample::select(vec!["B.Uno", "C.Dos", "Tres"]),
            prop::sample::select(vec!["Consumo", "Vivienda"]),
            prop::sample::select(vec![ValueType::Rate, ValueType::Amount, ValueType::Operations]),
            0i64..120,
            prop::option::of(0.0f64..1e7),
        )
            .prop_map(|(entity, product, p_type, offset, value)| {
                let day = date(2024, 1, 1) + chrono::Duration::days(offset);
                Observation::new(entity, product, p_type, day, value)
            })
    }

    proptest! {
        #[test]
        fn every_result_satisfies_every_dimension(
            rows in prop::collection::vec(arb_row(), 0..60),
            start in 0i64..120,
            len in 0i64..60,
        ) {
            let range = DateRange::new(
                date(2024, 1, 1) + chrono::Duration::days(start),
                date(2024, 1, 1) + chrono::Duration::days(start + len),
            );
            let predicate = FilterPredicate::new()
                .with_date_range(range)
                .with_entities(["B.Uno", "Tres"])
                .with_value_type(ValueType::Rate);

            let matched = filter_by_date(&rows, &predicate);
            for row in &matched {
                prop_assert!(range.start <= row.date_field && row.date_field <= range.end);
                prop_assert!(row.entity_name == "B.Uno" || row.entity_name == "Tres");
                prop_assert_eq!(&row.p_type, &ValueType::Rate);
            }
            prop_assert!(matched.windows(2).all(|w| w[0].date_field <= w[1].date_field));
            let expected = rows.iter().filter(|r| predicate.matches(r)).count();
            prop_assert_eq!(matched.len(), expected);
        }
    }
}
