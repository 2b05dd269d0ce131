//! Domain Model Module
//! Observation rows, metric kinds and entity categories of the canonical table.

use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt;

/// Amounts are reported in units and displayed in millions.
pub const AMOUNT_SCALE: f64 = 1_000_000.0;

/// Round to `decimals` places, ties to even.
pub fn round_decimals(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Metric kind reported in the `p_type` column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Rate,
    Amount,
    Operations,
    /// Unrecognized `p_type` text, kept verbatim.
    Other(String),
}

impl ValueType {
    /// Resolve a raw `p_type` cell. Accepts the Spanish source vocabulary and
    /// the English names, case-insensitive.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "tasa" | "rate" => ValueType::Rate,
            "monto" | "amount" => ValueType::Amount,
            "operaciones" | "operations" => ValueType::Operations,
            _ => ValueType::Other(raw.trim().to_string()),
        }
    }

    /// Y-axis label for the evolution chart.
    pub fn axis_label(&self) -> &'static str {
        match self {
            ValueType::Rate => "Tasa (%)",
            ValueType::Amount => "Monto (en millones)",
            ValueType::Operations => "Operaciones (unidades)",
            ValueType::Other(_) => "Valor",
        }
    }

    /// Display transform applied to a raw value of this kind.
    pub fn transform(&self, value: f64) -> f64 {
        match self {
            ValueType::Rate => round_decimals(value, 2),
            ValueType::Amount => round_decimals(value / AMOUNT_SCALE, 2),
            ValueType::Operations => round_decimals(value, 0),
            ValueType::Other(_) => value,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            ValueType::Rate => "tasa",
            ValueType::Amount => "monto",
            ValueType::Operations => "operaciones",
            ValueType::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Entity classification derived from the name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityCategory {
    Bank,
    Cooperative,
    Other,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 3] = [
        EntityCategory::Bank,
        EntityCategory::Cooperative,
        EntityCategory::Other,
    ];

    /// Exact, case-sensitive two-character prefix match; no trimming.
    pub fn classify(entity_name: &str) -> Self {
        if entity_name.starts_with("B.") {
            EntityCategory::Bank
        } else if entity_name.starts_with("C.") {
            EntityCategory::Cooperative
        } else {
            EntityCategory::Other
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EntityCategory::Bank => "Banco",
            EntityCategory::Cooperative => "Cooperativa",
            EntityCategory::Other => "Otro",
        }
    }
}

/// Column the ranking table is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Rate,
    Amount,
    Operations,
}

impl SortColumn {
    pub const ALL: [SortColumn; 3] = [SortColumn::Rate, SortColumn::Amount, SortColumn::Operations];

    pub fn display_name(&self) -> &'static str {
        match self {
            SortColumn::Rate => "Tasa",
            SortColumn::Amount => "Monto",
            SortColumn::Operations => "Operaciones",
        }
    }
}

/// One reported value for an entity/product/metric/date.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub entity_name: String,
    pub product_name: String,
    pub p_type: ValueType,
    pub date_field: NaiveDate,
    /// `None` when the source cell was blank.
    pub value: Option<f64>,
    /// Always `EntityCategory::classify(&entity_name)`.
    pub entity_category: EntityCategory,
}

impl Observation {
    pub fn new(
        entity_name: impl Into<String>,
        product_name: impl Into<String>,
        p_type: ValueType,
        date_field: NaiveDate,
        value: Option<f64>,
    ) -> Self {
        let entity_name = entity_name.into();
        let entity_category = EntityCategory::classify(&entity_name);
        Self {
            entity_name,
            product_name: product_name.into(),
            p_type,
            date_field,
            value,
            entity_category,
        }
    }
}

/// Unified, validated set of all observations. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct CanonicalTable {
    rows: Vec<Observation>,
}

impl CanonicalTable {
    pub fn new(rows: Vec<Observation>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn min_date(&self) -> Option<NaiveDate> {
        self.rows.iter().map(|r| r.date_field).min()
    }

    pub fn max_date(&self) -> Option<NaiveDate> {
        self.rows.iter().map(|r| r.date_field).max()
    }

    /// Distinct dates, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.rows.iter().map(|r| r.date_field).collect();
        dates.sort_unstable();
        dates.dedup();
        dates
    }

    /// Distinct entity names whose category is selected, in first-seen order.
    pub fn entities_in(&self, categories: &[EntityCategory]) -> Vec<String> {
        unique_in_order(
            self.rows
                .iter()
                .filter(|r| categories.contains(&r.entity_category))
                .map(|r| r.entity_name.as_str()),
        )
    }

    /// Distinct product names, in first-seen order.
    pub fn products(&self) -> Vec<String> {
        unique_in_order(self.rows.iter().map(|r| r.product_name.as_str()))
    }

    /// Distinct metric kinds, in first-seen order.
    pub fn value_types(&self) -> Vec<ValueType> {
        let mut seen = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.p_type) {
                seen.push(row.p_type.clone());
            }
        }
        seen
    }
}

fn unique_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn classifies_entities_by_prefix() {
        assert_eq!(EntityCategory::classify("B.Pichincha"), EntityCategory::Bank);
        assert_eq!(EntityCategory::classify("C.Policia"), EntityCategory::Cooperative);
        assert_eq!(EntityCategory::classify("X.Other"), EntityCategory::Other);
    }

    #[test]
    fn classification_is_case_sensitive_and_untrimmed() {
        assert_eq!(EntityCategory::classify("b.Pichincha"), EntityCategory::Other);
        assert_eq!(EntityCategory::classify(" B.Pichincha"), EntityCategory::Other);
        assert_eq!(EntityCategory::classify("B"), EntityCategory::Other);
        assert_eq!(EntityCategory::classify("BC.Mixed"), EntityCategory::Other);
    }

    #[test]
    fn parses_value_types_from_either_vocabulary() {
        assert_eq!(ValueType::parse("Tasa"), ValueType::Rate);
        assert_eq!(ValueType::parse("amount"), ValueType::Amount);
        assert_eq!(ValueType::parse(" OPERACIONES "), ValueType::Operations);
        assert_eq!(
            ValueType::parse("plazo"),
            ValueType::Other("plazo".to_string())
        );
        assert_eq!(ValueType::parse("plazo").axis_label(), "Valor");
    }

    #[test]
    fn transforms_scale_and_round_per_kind() {
        assert_eq!(ValueType::Amount.transform(2_345_678.0), 2.35);
        assert_eq!(ValueType::Rate.transform(5.555), 5.56);
        assert_eq!(ValueType::Operations.transform(1234.4), 1234.0);
        assert_eq!(ValueType::Other("x".into()).transform(1.23456), 1.23456);
    }

    #[test]
    fn observation_derives_category_on_construction() {
        let obs = Observation::new("C.Jep", "Consumo", ValueType::Rate, date(2024, 1, 1), Some(1.0));
        assert_eq!(obs.entity_category, EntityCategory::Cooperative);
    }

    #[test]
    fn table_selector_helpers() {
        let table = CanonicalTable::new(vec![
            Observation::new("C.Jep", "Consumo", ValueType::Rate, date(2024, 2, 1), Some(1.0)),
            Observation::new("B.Guayaquil", "Vivienda", ValueType::Amount, date(2024, 1, 1), None),
            Observation::new("C.Jep", "Vivienda", ValueType::Rate, date(2024, 2, 1), Some(2.0)),
            Observation::new("Mutualista", "Consumo", ValueType::Operations, date(2024, 3, 1), None),
        ]);

        assert_eq!(table.min_date(), Some(date(2024, 1, 1)));
        assert_eq!(table.max_date(), Some(date(2024, 3, 1)));
        assert_eq!(
            table.dates(),
            vec![date(2024, 1, 1), date(2024, 2, 1), date(2024, 3, 1)]
        );
        assert_eq!(
            table.entities_in(&[EntityCategory::Cooperative, EntityCategory::Bank]),
            vec!["C.Jep".to_string(), "B.Guayaquil".to_string()]
        );
        assert_eq!(table.products(), vec!["Consumo".to_string(), "Vivienda".to_string()]);
        assert_eq!(
            table.value_types(),
            vec![ValueType::Rate, ValueType::Amount, ValueType::Operations]
        );
    }
}
