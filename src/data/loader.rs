//! Data Loader Module
//! Reads the rate, amount and operations sources (CSV through Polars, workbooks
//! through calamine) and unifies them into the canonical observation table.

use crate::data::model::{CanonicalTable, Observation, ValueType};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Columns every source must provide. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 5] =
    ["entity_name", "product_name", "p_type", "date_field", "value"];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read '{path}': {error}")]
    Unreadable { path: PathBuf, error: PolarsError },
    #[error("Failed to read workbook '{path}': {error}")]
    UnreadableWorkbook {
        path: PathBuf,
        error: calamine::Error,
    },
    #[error("Workbook '{path}' has no sheets")]
    EmptyWorkbook { path: PathBuf },
    #[error("'{path}' is missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("'{path}' line {line}: empty '{column}'")]
    MissingField {
        path: PathBuf,
        line: usize,
        column: &'static str,
    },
    #[error("'{path}' line {line}: unparseable date '{value}'")]
    InvalidDate {
        path: PathBuf,
        line: usize,
        value: String,
    },
    #[error("'{path}' line {line}: non-numeric value '{value}'")]
    InvalidValue {
        path: PathBuf,
        line: usize,
        value: String,
    },
}

/// The three tabular sources, concatenated in this field order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSet {
    pub rate: PathBuf,
    pub amount: PathBuf,
    pub operations: PathBuf,
}

impl SourceSet {
    pub fn new(
        rate: impl Into<PathBuf>,
        amount: impl Into<PathBuf>,
        operations: impl Into<PathBuf>,
    ) -> Self {
        Self {
            rate: rate.into(),
            amount: amount.into(),
            operations: operations.into(),
        }
    }

    pub fn paths(&self) -> [&Path; 3] {
        [&self.rate, &self.amount, &self.operations]
    }
}

/// Loads source sets once and hands out the shared, read-only table.
///
/// The memo is keyed by source identity and never invalidated: updated files
/// are only picked up by a new process.
#[derive(Default)]
pub struct DataLoader {
    cache: HashMap<SourceSet, Arc<CanonicalTable>>,
}

impl DataLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and unify the three sources, or return the memoized table.
    pub fn load(&mut self, sources: &SourceSet) -> Result<Arc<CanonicalTable>, LoadError> {
        if let Some(table) = self.cache.get(sources) {
            tracing::debug!("canonical table served from cache");
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(load_table(sources)?);
        self.cache.insert(sources.clone(), Arc::clone(&table));
        Ok(table)
    }

    pub fn is_cached(&self, sources: &SourceSet) -> bool {
        self.cache.contains_key(sources)
    }
}

/// Read every source and concatenate rate, amount, operations rows in order.
/// Any failure aborts the whole load.
pub fn load_table(sources: &SourceSet) -> Result<CanonicalTable, LoadError> {
    let started = Instant::now();

    let parts = sources
        .paths()
        .par_iter()
        .map(|path| read_source(path))
        .collect::<Result<Vec<Vec<Observation>>, LoadError>>()?;

    let rows: Vec<Observation> = parts.into_iter().flatten().collect();
    tracing::info!(
        rows = rows.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "canonical table loaded"
    );
    Ok(CanonicalTable::new(rows))
}

/// Read a single source into observations. Workbooks (`.xlsx`, `.xlsm`,
/// `.xls`, `.ods`) go through calamine's first sheet; anything else is read
/// as CSV.
pub fn read_source(path: &Path) -> Result<Vec<Observation>, LoadError> {
    let rows = if is_workbook(path) {
        read_workbook(path)?
    } else {
        read_csv(path)?
    };
    tracing::info!(path = %path.display(), rows = rows.len(), "source read");
    Ok(rows)
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| WORKBOOK_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn read_csv(path: &Path) -> Result<Vec<Observation>, LoadError> {
    let unreadable = |error: PolarsError| LoadError::Unreadable {
        path: path.to_path_buf(),
        error,
    };

    // Every column is read as text so parsing stays strict and under our control.
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()
        .and_then(|lazy| lazy.collect())
        .map_err(unreadable)?;

    let names = df.get_column_names();
    let headers: Vec<&str> = names.iter().map(|name| name.as_str()).collect();
    let indices = required_indices(path, &headers)?;

    let mut columns: Vec<&StringChunked> = Vec::with_capacity(REQUIRED_COLUMNS.len());
    for (idx, required) in indices.into_iter().zip(REQUIRED_COLUMNS) {
        let column = df.select_at_idx(idx).ok_or_else(|| LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: required,
        })?;
        columns.push(column.as_materialized_series().str().map_err(unreadable)?);
    }

    // +2: 1-based lines plus the header line
    let records = (0..df.height()).map(|i| {
        let record: Record<'_> = std::array::from_fn(|c| columns[c].get(i).map(Cow::Borrowed));
        (i + 2, record)
    });
    to_observations(path, records)
}

fn read_workbook(path: &Path) -> Result<Vec<Observation>, LoadError> {
    let unreadable = |error: calamine::Error| LoadError::UnreadableWorkbook {
        path: path.to_path_buf(),
        error,
    };

    let mut workbook = open_workbook_auto(path).map_err(unreadable)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::EmptyWorkbook {
            path: path.to_path_buf(),
        })?
        .map_err(unreadable)?;

    // Sheet rows are 1-based and the range may not start at the first row.
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0) + 1;
    let mut sheet_rows = range.rows();
    let headers: Vec<String> = sheet_rows
        .next()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .unwrap_or_default();
    let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
    let indices = required_indices(path, &header_refs)?;

    let records = sheet_rows.enumerate().map(|(i, row)| {
        let record: Record<'_> =
            std::array::from_fn(|c| row.get(indices[c]).and_then(cell_text));
        (first_row + i + 1, record)
    });
    to_observations(path, records)
}

/// Workbook cell as loader text. Date cells become `YYYY-MM-DD HH:MM:SS`.
fn cell_text(cell: &Data) -> Option<Cow<'_, str>> {
    match cell {
        Data::Empty => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            Some(Cow::Borrowed(s.as_str()))
        }
        Data::DateTime(dt) => Some(Cow::Owned(match dt.as_datetime() {
            Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        })),
        other => Some(Cow::Owned(other.to_string())),
    }
}

/// Text cells of the required columns, in `REQUIRED_COLUMNS` order.
type Record<'a> = [Option<Cow<'a, str>>; 5];

fn to_observations<'a>(
    path: &Path,
    records: impl Iterator<Item = (usize, Record<'a>)>,
) -> Result<Vec<Observation>, LoadError> {
    let mut rows = Vec::new();
    for (line, [entity, product, p_type, raw_date, raw_value]) in records {
        let entity_name = required_field(entity.as_deref(), path, line, "entity_name")?;
        let product_name = required_field(product.as_deref(), path, line, "product_name")?;
        let p_type = required_field(p_type.as_deref(), path, line, "p_type")?;

        let raw_date = raw_date.as_deref().unwrap_or_default();
        let date_field = parse_date(raw_date).ok_or_else(|| LoadError::InvalidDate {
            path: path.to_path_buf(),
            line,
            value: raw_date.to_string(),
        })?;

        let value = parse_value(raw_value.as_deref()).map_err(|raw| LoadError::InvalidValue {
            path: path.to_path_buf(),
            line,
            value: raw,
        })?;

        rows.push(Observation::new(
            entity_name,
            product_name,
            ValueType::parse(p_type),
            date_field,
            value,
        ));
    }
    Ok(rows)
}

/// Text cells are kept verbatim; only an all-blank cell counts as missing.
fn required_field<'a>(
    cell: Option<&'a str>,
    path: &Path,
    line: usize,
    column: &'static str,
) -> Result<&'a str, LoadError> {
    cell.filter(|s| !s.trim().is_empty())
        .ok_or_else(|| LoadError::MissingField {
            path: path.to_path_buf(),
            line,
            column,
        })
}

/// Position of each required column in `headers`.
fn required_indices(path: &Path, headers: &[&str]) -> Result<[usize; 5], LoadError> {
    let mut indices = [0; 5];
    for (slot, required) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = find_column(headers, required).ok_or_else(|| LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: required,
        })?;
    }
    Ok(indices)
}

/// Header lookup tolerant of surrounding whitespace and a UTF-8 BOM.
fn find_column(headers: &[&str], required: &str) -> Option<usize> {
    headers
        .iter()
        .position(|name| name.trim().trim_start_matches('\u{feff}').trim() == required)
}

/// Parse a date cell; timestamps keep only their date part.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Blank cells and NaN are missing values; other non-numeric text is an error.
fn parse_value(raw: Option<&str>) -> Result<Option<f64>, String> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(raw.to_string()),
    }
}
