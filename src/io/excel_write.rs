use std::path::Path;

use rust_xlsxwriter::Workbook;

use crate::error::Result;
use crate::model::Table;

/// A table ready to be materialised as one Excel sheet. Cells are already
/// rendered to display strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// Renders a data [`Table`] into a sheet, using the table's label as the
    /// sheet name.
    pub fn from_table(table: &Table) -> Self {
        let rows = (0..table.row_count())
            .map(|row_idx| {
                table
                    .row(row_idx)
                    .iter()
                    .map(|cell| cell.to_string())
                    .collect()
            })
            .collect();
        Self {
            sheet_name: sanitize_sheet_name(table.label()),
            columns: table.columns().to_vec(),
            rows,
        }
    }
}

/// Writes the provided sheets into one workbook at the given path.
pub fn write_tables(path: &Path, sheets: &[SheetTable]) -> Result<()> {
    let mut workbook_writer = Workbook::new();

    for table in sheets {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;

        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet.write_string(0, col_idx as u16, header)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                worksheet.write_string((row_idx + 1) as u32, col_idx as u16, cell)?;
            }
        }

        let mut excel_table = rust_xlsxwriter::Table::new();
        excel_table.set_autofilter(true);

        let col_end = (table.columns.len() as u16).saturating_sub(1);
        let row_end = if table.rows.is_empty() {
            0
        } else {
            table.rows.len() as u32
        };
        worksheet.add_table(0, 0, row_end, col_end, &excel_table)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}

/// Excel limits sheet names to 31 characters and a restricted alphabet.
pub fn sanitize_sheet_name(raw: &str) -> String {
    let invalid = [':', '\\', '/', '?', '*', '[', ']', '\'', '"'];
    let mut sanitized: String = raw
        .chars()
        .map(|ch| {
            if invalid.contains(&ch) || ch.is_control() {
                '_'
            } else {
                ch
            }
        })
        .collect();

    sanitized = sanitized.trim().to_string();
    if sanitized.is_empty() {
        sanitized = "Sheet".to_string();
    }

    if sanitized.chars().count() > 31 {
        sanitized = sanitized.chars().take(31).collect();
    }

    sanitized
}
