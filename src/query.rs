//! Query interface used by the presentation layer.
//!
//! Each call is one interaction cycle over the shared, read-only table:
//! validate the selection, filter, then shape or rank. Validation failures
//! and empty selections never touch the table.

use crate::charts::{shape, ChartSeries};
use crate::data::{
    filter, filter_by_date, CanonicalTable, DateRange, EntityCategory, FilterPredicate,
    SortColumn, ValueType,
};
use crate::ranking::{rank, RankingRow};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("La fecha 'Desde' debe ser menor o igual a la fecha 'Hasta'.")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Why there is nothing to plot. Not an error: the UI shows a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptySelection {
    NoEntities,
    NoProducts,
    NoMatchingRows,
}

impl EmptySelection {
    pub fn prompt(&self) -> &'static str {
        match self {
            EmptySelection::NoEntities => "Selecciona al menos una entidad para ver la gráfica.",
            EmptySelection::NoProducts => "Selecciona al menos un producto para ver la gráfica.",
            EmptySelection::NoMatchingRows => "No hay datos para la selección actual.",
        }
    }
}

/// Selector state of the evolution chart.
#[derive(Debug, Clone)]
pub struct ChartQuery {
    pub date_range: DateRange,
    /// Entity types the entities are picked from. Empty leaves nothing to
    /// pick, so the view reports `EmptySelection::NoEntities`.
    pub categories: Vec<EntityCategory>,
    /// Selection order drives series colours.
    pub entities: Vec<String>,
    pub products: Vec<String>,
    pub value_type: ValueType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutcome {
    Series(ChartSeries),
    EmptySelection(EmptySelection),
}

/// Selector state of the ranking table.
#[derive(Debug, Clone)]
pub struct RankingQuery {
    pub date: NaiveDate,
    pub product: String,
    pub categories: Vec<EntityCategory>,
    pub sort_column: SortColumn,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RankingOutcome {
    Rows(Vec<RankingRow>),
    NoData { date: NaiveDate, product: String },
}

impl RankingOutcome {
    pub fn message(&self) -> Option<String> {
        match self {
            RankingOutcome::Rows(_) => None,
            RankingOutcome::NoData { date, .. } => Some(format!(
                "No hay datos disponibles para la fecha {date} y el producto seleccionado."
            )),
        }
    }
}

/// Evolution chart: range check first, then empty-selection checks, then
/// filter and shape. As in the ranking, an empty category list selects nothing.
pub fn chart_view(table: &CanonicalTable, query: &ChartQuery) -> Result<ChartOutcome, QueryError> {
    let range = query.date_range;
    if !range.is_valid() {
        tracing::warn!(start = %range.start, end = %range.end, "rejected inverted date range");
        return Err(QueryError::InvalidRange {
            start: range.start,
            end: range.end,
        });
    }
    if query.entities.is_empty() || query.categories.is_empty() {
        return Ok(ChartOutcome::EmptySelection(EmptySelection::NoEntities));
    }
    if query.products.is_empty() {
        return Ok(ChartOutcome::EmptySelection(EmptySelection::NoProducts));
    }

    let predicate = FilterPredicate::new()
        .with_date_range(range)
        .with_entities(query.entities.iter().cloned())
        .with_products(query.products.iter().cloned())
        .with_value_type(query.value_type.clone())
        .with_categories(query.categories.iter().copied());

    let rows = filter_by_date(table.rows(), &predicate);
    let series = shape(&rows, &query.value_type, &query.entities);
    tracing::debug!(
        rows = rows.len(),
        entities = series.series.len(),
        value_type = %query.value_type,
        "chart query"
    );

    if series.is_empty() {
        return Ok(ChartOutcome::EmptySelection(EmptySelection::NoMatchingRows));
    }
    Ok(ChartOutcome::Series(series))
}

/// Ranking table for one date and product.
pub fn ranking_view(table: &CanonicalTable, query: &RankingQuery) -> RankingOutcome {
    let predicate = FilterPredicate::new()
        .with_date_range(DateRange::on(query.date))
        .with_products([query.product.as_str()])
        .with_categories(query.categories.iter().copied());

    let rows = filter(table.rows(), &predicate);
    // An empty category selection excludes everything, as in the chart selectors.
    if rows.is_empty() || query.categories.is_empty() {
        tracing::info!(date = %query.date, product = %query.product, "no ranking data");
        return RankingOutcome::NoData {
            date: query.date,
            product: query.product.clone(),
        };
    }

    RankingOutcome::Rows(rank(&rows, query.sort_column))
}
