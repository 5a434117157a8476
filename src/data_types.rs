// src/data_types.rs

/// One worksheet load: a header row plus data rows, all normalized to the
/// same width. Filtering derives a new Table and never mutates the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellKind {
    Empty,
    Numeric(f64),
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl Table {
    pub fn empty() -> Self {
        Table {
            headers: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Builds a table from a header row and raw data rows. Short rows are
    /// padded with empty strings and long rows truncated, so every row
    /// matches the header width.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.truncate(width);
                row.resize(width, String::new());
                row
            })
            .collect();
        Table { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of the first header with this name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().filter_map(move |row| {
            row.get(index).map(String::as_str)
        })
    }

    /// Classifies one column: Numeric when it holds at least one parseable
    /// value and nothing that fails to parse; empty cells don't disqualify.
    pub fn column_kind(&self, index: usize) -> ColumnKind {
        let mut saw_numeric = false;
        for value in self.column_values(index) {
            match cell_kind(value) {
                CellKind::Numeric(_) => saw_numeric = true,
                CellKind::Text => return ColumnKind::Categorical,
                CellKind::Empty => {}
            }
        }
        if saw_numeric {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        }
    }
}

/// Explicit cell classification. Only finite numbers count as numeric, so
/// spellings like "inf" or "NaN" stay text and never reach a range compare.
pub fn cell_kind(value: &str) -> CellKind {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return CellKind::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => CellKind::Numeric(v),
        _ => CellKind::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::from_rows(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn cell_kind_classification() {
        assert_eq!(cell_kind("10"), CellKind::Numeric(10.0));
        assert_eq!(cell_kind("3.5"), CellKind::Numeric(3.5));
        assert_eq!(cell_kind("-2e3"), CellKind::Numeric(-2000.0));
        assert_eq!(cell_kind(" 42 "), CellKind::Numeric(42.0));
        assert_eq!(cell_kind(""), CellKind::Empty);
        assert_eq!(cell_kind("   "), CellKind::Empty);
        assert_eq!(cell_kind("Search"), CellKind::Text);
        assert_eq!(cell_kind("10 clicks"), CellKind::Text);
        assert_eq!(cell_kind("inf"), CellKind::Text);
        assert_eq!(cell_kind("NaN"), CellKind::Text);
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_truncated() {
        let t = table(&["a", "b", "c"], &[&["1"], &["1", "2", "3", "4"]]);
        assert_eq!(t.rows[0], vec!["1", "", ""]);
        assert_eq!(t.rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn column_kind_mixed_and_clean() {
        let t = table(
            &["campaign", "clicks", "cost", "note"],
            &[
                &["Brand", "10", "1.5", "ok"],
                &["Generic", "5", "", "10"],
            ],
        );
        assert_eq!(t.column_kind(0), ColumnKind::Categorical);
        assert_eq!(t.column_kind(1), ColumnKind::Numeric);
        // empty cell does not disqualify a numeric column
        assert_eq!(t.column_kind(2), ColumnKind::Numeric);
        // one text value makes the whole column categorical
        assert_eq!(t.column_kind(3), ColumnKind::Categorical);
    }

    #[test]
    fn all_empty_column_is_categorical() {
        let t = table(&["a"], &[&[""], &[""]]);
        assert_eq!(t.column_kind(0), ColumnKind::Categorical);
    }

    #[test]
    fn column_index_prefers_first_duplicate() {
        let t = table(&["clicks", "clicks"], &[&["1", "2"]]);
        assert_eq!(t.column_index("clicks"), Some(0));
        assert_eq!(t.column_index("missing"), None);
    }
}
