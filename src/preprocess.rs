//! Cleanup pass applied to raw exports before they are compared or profiled:
//! drops columns with no data at all and trims stray whitespace from text
//! cells.

use crate::error::Result;
use crate::model::{CellValue, Table};

/// Returns a cleaned copy of the table: all-empty columns removed and text
/// cells trimmed. Column order is otherwise preserved.
pub fn clean_table(table: &Table) -> Result<Table> {
    let kept: Vec<&String> = table
        .columns()
        .iter()
        .filter(|column| table.column_cells(column).any(|cell| !cell.is_empty()))
        .collect();

    let columns: Vec<String> = kept.iter().map(|name| (*name).clone()).collect();
    let rows: Vec<Vec<CellValue>> = (0..table.row_count())
        .map(|row_idx| {
            kept.iter()
                .map(|column| trim_cell(table.cell(row_idx, column)))
                .collect()
        })
        .collect();

    Table::new(table.label(), columns, rows)
}

fn trim_cell(cell: &CellValue) -> CellValue {
    match cell {
        CellValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                CellValue::Empty
            } else if trimmed.len() == text.len() {
                cell.clone()
            } else {
                CellValue::Text(trimmed.to_string())
            }
        }
        other => other.clone(),
    }
}
