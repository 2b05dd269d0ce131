//! Ranking Builder Module
//! Pivots a single-date subset into one row per entity and ranks by a metric.

use crate::data::{round_decimals, Observation, SortColumn, ValueType, AMOUNT_SCALE};
use std::cmp::Ordering;

/// One entity's metrics plus its position.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingRow {
    pub rank: usize,
    pub entity_name: String,
    pub rate: f64,
    /// In millions.
    pub amount: f64,
    pub operations: i64,
}

/// Pivot cell collection: first-seen raw value per metric kind.
#[derive(Debug, Default)]
struct PivotEntry<'a> {
    entity_name: &'a str,
    rate: Option<f64>,
    amount: Option<f64>,
    operations: Option<f64>,
}

impl<'a> PivotEntry<'a> {
    fn new(entity_name: &'a str) -> Self {
        Self {
            entity_name,
            ..Default::default()
        }
    }

    /// Later rows of an already-seen kind are shadowed, not aggregated.
    fn take(&mut self, p_type: &ValueType, value: f64) {
        let slot = match p_type {
            ValueType::Rate => &mut self.rate,
            ValueType::Amount => &mut self.amount,
            ValueType::Operations => &mut self.operations,
            ValueType::Other(_) => return,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    fn into_row(self) -> RankingRow {
        RankingRow {
            rank: 0,
            entity_name: self.entity_name.to_string(),
            rate: round_decimals(self.rate.unwrap_or(0.0), 2),
            amount: round_decimals(self.amount.unwrap_or(0.0) / AMOUNT_SCALE, 2),
            // Counts are integral; any fraction is truncated.
            operations: self.operations.unwrap_or(0.0) as i64,
        }
    }
}

impl RankingRow {
    fn sort_key(&self, column: SortColumn) -> f64 {
        match column {
            SortColumn::Rate => self.rate,
            SortColumn::Amount => self.amount,
            SortColumn::Operations => self.operations as f64,
        }
    }
}

/// Build the ranking: pivot by entity, fill missing metrics with 0, scale,
/// sort descending (stable) and number positions 1..N.
pub fn rank(rows: &[&Observation], sort_column: SortColumn) -> Vec<RankingRow> {
    let mut entries: Vec<PivotEntry<'_>> = Vec::new();
    for row in rows {
        let idx = match entries.iter().position(|e| e.entity_name == row.entity_name) {
            Some(idx) => idx,
            None => {
                entries.push(PivotEntry::new(&row.entity_name));
                entries.len() - 1
            }
        };
        // Blank cells behave like an absent metric.
        if let Some(value) = row.value.filter(|v| !v.is_nan()) {
            entries[idx].take(&row.p_type, value);
        }
    }

    let mut ranking: Vec<RankingRow> = entries.into_iter().map(PivotEntry::into_row).collect();
    // `sort_by` is stable: equal keys keep input order.
    ranking.sort_by(|a, b| {
        b.sort_key(sort_column)
            .partial_cmp(&a.sort_key(sort_column))
            .unwrap_or(Ordering::Equal)
    });
    for (i, row) in ranking.iter_mut().enumerate() {
        row.rank = i + 1;
    }

    tracing::debug!(entities = ranking.len(), sort = sort_column.display_name(), "ranking built");
    ranking
}
