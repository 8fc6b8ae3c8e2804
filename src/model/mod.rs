use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;

use crate::error::{Result, ToolError};

/// A single typed spreadsheet cell.
///
/// Values keep the type the reader saw; no guessing happens at this layer.
/// Coercions (numeric-looking text, date text) are performed on demand by the
/// comparison policies.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Plain text cell.
    Text(String),
    /// Numeric cell. Excel stores every number as a float.
    Number(f64),
    /// Calendar date cell.
    Date(NaiveDate),
    /// Boolean cell.
    Boolean(bool),
    /// Cell with no value. Sparse sheets produce these explicitly so every
    /// row always carries the table's full column set.
    Empty,
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Attempts to view the cell as a number, coercing numeric-looking text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) => Some(*value),
            CellValue::Text(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Attempts to view the cell as a date, parsing text cells with the
    /// provided formats in order.
    pub fn as_date(&self, formats: &[String]) -> Option<NaiveDate> {
        match self {
            CellValue::Date(date) => Some(*date),
            CellValue::Text(text) => {
                let trimmed = text.trim();
                formats
                    .iter()
                    .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
            }
            _ => None,
        }
    }

    /// Canonical string used for row keys: stable across the float/int and
    /// text renderings of the same value.
    pub fn key_form(&self) -> String {
        match self {
            CellValue::Text(text) => text.trim().to_string(),
            CellValue::Number(value) => format_number(*value),
            CellValue::Date(date) => date.format("%Y-%m-%d").to_string(),
            CellValue::Boolean(value) => value.to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(text) => write!(f, "{text}"),
            CellValue::Number(value) => write!(f, "{}", format_number(*value)),
            CellValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            CellValue::Boolean(value) => write!(f, "{value}"),
            CellValue::Empty => Ok(()),
        }
    }
}

/// Renders a float the way a spreadsheet user wrote it: integral values
/// without the trailing `.0`.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Normalizes a header or text value for matching: trim, casefold, collapse
/// internal whitespace runs to single spaces.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// In-memory representation of one spreadsheet's tabular content.
///
/// Construction validates the header and row shape; afterwards the table is
/// immutable and every row is guaranteed to carry exactly the table's column
/// set (missing cells are explicit [`CellValue::Empty`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    label: String,
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    column_index: HashMap<String, usize>,
}

const EMPTY_CELL: CellValue = CellValue::Empty;

impl Table {
    /// Builds a table from a header row and data rows.
    ///
    /// Fails with [`ToolError::MalformedTable`] when the header contains
    /// duplicate non-empty names or any row's width differs from the header's.
    pub fn new(
        label: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self> {
        let label = label.into();

        let mut column_index = HashMap::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            if name.trim().is_empty() {
                continue;
            }
            if column_index.insert(name.clone(), idx).is_some() {
                return Err(ToolError::MalformedTable {
                    label,
                    detail: format!("duplicate column header '{name}'"),
                });
            }
        }

        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(ToolError::MalformedTable {
                    label,
                    detail: format!(
                        "row {} has {} cells, expected {}",
                        row_idx + 1,
                        row.len(),
                        columns.len()
                    ),
                });
            }
        }

        Ok(Self {
            label,
            columns,
            rows,
            column_index,
        })
    }

    /// Source label shown in reports, usually the file name.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Ordered column names as they appeared in the header row.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of a column by its exact name.
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    /// Whether the table carries a column with the exact given name.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index.contains_key(name)
    }

    /// Cell lookup by row index and column name. Unknown columns and
    /// out-of-range rows yield the empty value; spreadsheets are sparse by
    /// nature and lookups never fail on missing data.
    pub fn cell(&self, row_idx: usize, column: &str) -> &CellValue {
        let Some(col_idx) = self.column_position(column) else {
            return &EMPTY_CELL;
        };
        self.rows
            .get(row_idx)
            .and_then(|row| row.get(col_idx))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Full row as a slice of cells, in column order.
    pub fn row(&self, row_idx: usize) -> &[CellValue] {
        self.rows
            .get(row_idx)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterates the cells of one column top to bottom.
    pub fn column_cells<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a CellValue> {
        let col_idx = self.column_position(name);
        self.rows
            .iter()
            .filter_map(move |row| col_idx.and_then(|idx| row.get(idx)))
    }
}
