//! Data module - source loading, domain model and filtering

mod loader;
mod model;
mod predicate;

pub use loader::{
    load_table, parse_date, read_source, DataLoader, LoadError, SourceSet, REQUIRED_COLUMNS,
};
pub use model::{
    round_decimals, CanonicalTable, EntityCategory, Observation, SortColumn, ValueType,
    AMOUNT_SCALE,
};
pub use predicate::{filter, filter_by_date, DateRange, FilterPredicate};
