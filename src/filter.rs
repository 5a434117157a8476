// src/filter.rs
use crate::data_types::{cell_kind, CellKind, ColumnKind, Table};

/// Dropdown sentinel meaning "no categorical constraint".
pub const ALL_CATEGORIES: &str = "All";

/// How many numeric columns get a range control.
pub const MAX_RANGE_CONTROLS: usize = 2;

/// The filter widgets derivable from a loaded table: the first categorical
/// column offered for equality filtering and the first two numeric columns
/// offered for range filtering, all in original column order.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterControls {
    pub categorical: Option<CategoricalControl>,
    pub numeric: Vec<NumericControl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalControl {
    pub column: String,
    /// "All" followed by the distinct non-empty values in first-appearance
    /// order.
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericControl {
    pub column: String,
    /// Observed bounds over the parseable cells. A single repeated value
    /// gives min == max and the control still renders.
    pub min: f64,
    pub max: f64,
}

/// The user's current choices, reconstructed from widget state on each
/// interaction. `category` is None when the sentinel is selected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    pub category: Option<(String, String)>,
    pub ranges: Vec<RangeFilter>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilter {
    pub column: String,
    pub min: f64,
    pub max: f64,
}

impl FilterControls {
    pub fn from_table(table: &Table) -> Self {
        let mut categorical = None;
        let mut numeric = Vec::new();

        for (index, header) in table.headers.iter().enumerate() {
            match table.column_kind(index) {
                ColumnKind::Categorical => {
                    if categorical.is_none() && table.row_count() > 0 {
                        categorical = Some(CategoricalControl {
                            column: header.clone(),
                            options: category_options(table, index),
                        });
                    }
                }
                ColumnKind::Numeric => {
                    if numeric.len() < MAX_RANGE_CONTROLS {
                        if let Some((min, max)) = observed_bounds(table, index) {
                            numeric.push(NumericControl {
                                column: header.clone(),
                                min,
                                max,
                            });
                        }
                    }
                }
            }
        }

        FilterControls { categorical, numeric }
    }
}

fn category_options(table: &Table, index: usize) -> Vec<String> {
    let mut options = vec![ALL_CATEGORIES.to_string()];
    for value in table.column_values(index) {
        if value.trim().is_empty() {
            continue;
        }
        if !options.iter().any(|seen| seen == value) {
            options.push(value.to_string());
        }
    }
    options
}

/// Bounds over parseable cells only; None when nothing in the column
/// parses (an all-empty column never gets this far, it classifies as
/// categorical).
fn observed_bounds(table: &Table, index: usize) -> Option<(f64, f64)> {
    let mut bounds: Option<(f64, f64)> = None;
    for value in table.column_values(index) {
        if let CellKind::Numeric(v) = cell_kind(value) {
            bounds = Some(match bounds {
                Some((min, max)) => (min.min(v), max.max(v)),
                None => (v, v),
            });
        }
    }
    bounds
}

/// Applies all active constraints with AND composition: the categorical
/// equality first, then each range in order, each narrowing the previous
/// result. The input table is never mutated; constraints naming unknown
/// columns are skipped. Rows whose cell does not parse as a finite number
/// are dropped by an active range constraint on that column.
pub fn apply(table: &Table, selection: &FilterSelection) -> Table {
    let mut rows: Vec<&Vec<String>> = table.rows.iter().collect();

    if let Some((column, wanted)) = &selection.category {
        if let Some(index) = table.column_index(column) {
            rows.retain(|row| row.get(index).map(String::as_str) == Some(wanted.as_str()));
        }
    }

    for range in &selection.ranges {
        if let Some(index) = table.column_index(&range.column) {
            rows.retain(|row| match row.get(index).map(|cell| cell_kind(cell)) {
                Some(CellKind::Numeric(v)) => v >= range.min && v <= range.max,
                _ => false,
            });
        }
    }

    Table {
        headers: table.headers.clone(),
        rows: rows.into_iter().cloned().collect(),
    }
}
