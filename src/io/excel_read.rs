use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use chrono::{Duration, NaiveDate};

use crate::error::{Result, ToolError};
use crate::model::{CellValue, Table};

/// Reads the first worksheet of an Excel workbook into a [`Table`].
///
/// The first row is taken as the header; column order and raw cell types are
/// preserved, and short rows are padded with explicit empty cells so the
/// table invariant holds. No type guessing happens beyond what the cell
/// itself declares.
pub fn read_table(path: &Path) -> Result<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ToolError::MalformedTable {
            label: table_label(path),
            detail: "workbook contains no sheets".to_string(),
        })?;

    let range = read_required_sheet(&mut workbook, path, &sheet_name)?;
    range_to_table(table_label(path), &range)
}

/// Reads one named worksheet into a [`Table`].
pub fn read_named_table(path: &Path, sheet_name: &str) -> Result<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = read_required_sheet(&mut workbook, path, sheet_name)?;
    range_to_table(table_label(path), &range)
}

/// Names of every worksheet in the workbook, in file order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    let workbook: Xlsx<_> = open_workbook(path)?;
    Ok(workbook.sheet_names().to_vec())
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    path: &Path,
    name: &str,
) -> Result<calamine::Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::MalformedTable {
            label: table_label(path),
            detail: format!("missing sheet '{name}'"),
        })?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

fn range_to_table(label: String, range: &calamine::Range<DataType>) -> Result<Table> {
    let mut rows_iter = range.rows();
    let columns: Vec<String> = match rows_iter.next() {
        Some(header) => header.iter().map(header_to_string).collect(),
        None => Vec::new(),
    };

    // Interior blank rows are kept so row numbers in reports line up with
    // the worksheet; only trailing blanks are dropped.
    let width = columns.len();
    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for row in rows_iter {
        let mut cells: Vec<CellValue> = row.iter().map(cell_to_value).collect();
        cells.resize(width, CellValue::Empty);
        cells.truncate(width);
        rows.push(cells);
    }
    while rows
        .last()
        .is_some_and(|row| row.iter().all(CellValue::is_empty))
    {
        rows.pop();
    }

    Table::new(label, columns, rows)
}

fn header_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(value) => value.trim().to_string(),
        DataType::Empty => String::new(),
        other => cell_to_value(other).to_string(),
    }
}

fn cell_to_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::String(value) => {
            if value.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(value.clone())
            }
        }
        DataType::Float(value) => CellValue::Number(*value),
        DataType::Int(value) => CellValue::Number(*value as f64),
        DataType::Bool(value) => CellValue::Boolean(*value),
        DataType::DateTime(serial) => match serial_to_date(*serial) {
            Some(date) => CellValue::Date(date),
            None => CellValue::Number(*serial),
        },
        DataType::Empty => CellValue::Empty,
        other => CellValue::Text(other.to_string()),
    }
}

/// Excel stores datetimes as serial days since 1899-12-30.
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 || serial > 3_000_000.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

fn table_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
