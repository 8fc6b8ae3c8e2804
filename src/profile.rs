//! Field report generation: per-column profiling across one or more input
//! workbooks, summarising what each column actually contains so an analyst
//! can decide what to import.

use std::collections::HashMap;

use crate::io::excel_write::SheetTable;
use crate::model::{CellValue, Table, normalize_name};

/// Sheet name of the generated field report.
pub const FIELD_REPORT_SHEET: &str = "FieldReport";

/// Report column headers, in output order.
pub const FIELD_REPORT_COLUMNS: [&str; 10] = [
    "File",
    "FileColumn",
    "InferredType",
    "UniqueValuesCount",
    "ValueCount",
    "EmptyValues%",
    "Top5UniqueValues",
    "MaxCharacterLength",
    "Import",
    "Flag",
];

/// Broad value category inferred for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferredType {
    Boolean,
    Numeric,
    Date,
    Text,
}

impl InferredType {
    pub fn as_str(self) -> &'static str {
        match self {
            InferredType::Boolean => "Boolean",
            InferredType::Numeric => "Numeric",
            InferredType::Date => "Date",
            InferredType::Text => "Text",
        }
    }
}

/// Profile of one column of one input file.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub file: String,
    pub column: String,
    pub inferred_type: InferredType,
    pub distinct_count: usize,
    pub value_count: usize,
    /// Fraction of empty cells over the column's total row count.
    pub empty_fraction: f64,
    /// Up to five most frequent values, most frequent first.
    pub top_values: Vec<String>,
    pub max_char_length: usize,
}

/// Profiles every column of the given table.
pub fn profile_table(table: &Table) -> Vec<ColumnProfile> {
    table
        .columns()
        .iter()
        .map(|column| profile_column(table, column))
        .collect()
}

fn profile_column(table: &Table, column: &str) -> ColumnProfile {
    let total = table.row_count();
    let values: Vec<&CellValue> = table
        .column_cells(column)
        .filter(|cell| !cell.is_empty())
        .collect();

    let mut frequencies: HashMap<String, usize> = HashMap::new();
    let mut max_char_length = 0usize;
    for value in &values {
        let text = value.to_string();
        max_char_length = max_char_length.max(text.chars().count());
        *frequencies.entry(text).or_default() += 1;
    }

    let distinct_count = frequencies.len();
    let mut ranked: Vec<(String, usize)> = frequencies.into_iter().collect();
    ranked.sort_by(|lhs, rhs| rhs.1.cmp(&lhs.1).then_with(|| lhs.0.cmp(&rhs.0)));
    let top_values = ranked
        .into_iter()
        .take(5)
        .map(|(value, _)| value)
        .collect();

    let empty_fraction = if total > 0 {
        (total - values.len()) as f64 / total as f64
    } else {
        0.0
    };

    ColumnProfile {
        file: table.label().to_string(),
        column: column.to_string(),
        inferred_type: infer_type(&values),
        distinct_count,
        value_count: values.len(),
        empty_fraction,
        top_values,
        max_char_length,
    }
}

const BOOLEAN_SETS: [[&str; 2]; 3] = [["true", "false"], ["1", "0"], ["yes", "no"]];

/// Boolean value-sets win over the numeric check so 1/0 flag columns are
/// reported as Boolean, matching how analysts read them.
fn infer_type(values: &[&CellValue]) -> InferredType {
    if values.is_empty() {
        return InferredType::Text;
    }

    let normalized: Vec<String> = values
        .iter()
        .map(|value| normalize_name(&value.to_string()))
        .collect();
    for set in &BOOLEAN_SETS {
        if normalized.iter().all(|value| set.contains(&value.as_str())) {
            return InferredType::Boolean;
        }
    }

    if values.iter().all(|value| value.as_number().is_some()) {
        return InferredType::Numeric;
    }
    if values
        .iter()
        .all(|value| matches!(value, CellValue::Date(_)))
    {
        return InferredType::Date;
    }
    InferredType::Text
}

/// Builds the report sheet for a set of column profiles. `Import` and `Flag`
/// stay blank for the analyst to fill in.
pub fn report_sheet(profiles: &[ColumnProfile]) -> SheetTable {
    let rows = profiles
        .iter()
        .map(|profile| {
            vec![
                profile.file.clone(),
                profile.column.clone(),
                profile.inferred_type.as_str().to_string(),
                profile.distinct_count.to_string(),
                profile.value_count.to_string(),
                format!("{:.2}", profile.empty_fraction),
                profile.top_values.join("; "),
                profile.max_char_length.to_string(),
                String::new(),
                String::new(),
            ]
        })
        .collect();

    SheetTable {
        sheet_name: FIELD_REPORT_SHEET.to_string(),
        columns: FIELD_REPORT_COLUMNS
            .iter()
            .map(|name| name.to_string())
            .collect(),
        rows,
    }
}
