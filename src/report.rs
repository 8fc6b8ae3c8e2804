//! Renders a [`ComparisonResult`] for people: a multi-sheet Excel report and
//! a plain-text summary for the terminal.

use std::fmt::Write as _;

use crate::compare::{ColumnMatch, ComparisonResult, RowMatchKind};
use crate::io::excel_write::SheetTable;

/// Sheet name for the summary counts.
pub const SUMMARY_SHEET: &str = "Summary";
/// Sheet name for the column mapping.
pub const COLUMNS_SHEET: &str = "Columns";
/// Sheet name for the row mapping.
pub const ROWS_SHEET: &str = "Rows";
/// Sheet name for the unequal cell pairs.
pub const CELLS_SHEET: &str = "Cells";

/// Builds the report sheets for one comparison. The `Cells` sheet lists only
/// unequal pairs; the summary counts cover every compared cell.
pub fn comparison_sheets(result: &ComparisonResult) -> Vec<SheetTable> {
    vec![
        summary_sheet(result),
        columns_sheet(result),
        rows_sheet(result),
        cells_sheet(result),
    ]
}

fn summary_sheet(result: &ComparisonResult) -> SheetTable {
    let summary = &result.summary;
    let rows = vec![
        vec!["File A".to_string(), result.label_a.clone()],
        vec!["File B".to_string(), result.label_b.clone()],
        count_row("Columns matched", summary.columns_matched),
        count_row("Columns added in B", summary.columns_added),
        count_row("Columns removed from A", summary.columns_removed),
        count_row("Rows matched", summary.rows_matched),
        count_row("Rows added in B", summary.rows_added),
        count_row("Rows removed from A", summary.rows_removed),
        count_row("Rows with duplicate keys", summary.rows_duplicate),
        count_row("Unkeyable rows", summary.rows_unkeyable),
        count_row("Cells equal", summary.cells_equal),
        count_row("Cells different", summary.cells_unequal),
        count_row("Cells with type mismatches", summary.cells_type_mismatch),
    ];
    SheetTable {
        sheet_name: SUMMARY_SHEET.to_string(),
        columns: vec!["Metric".to_string(), "Value".to_string()],
        rows,
    }
}

fn count_row(metric: &str, count: usize) -> Vec<String> {
    vec![metric.to_string(), count.to_string()]
}

fn columns_sheet(result: &ComparisonResult) -> SheetTable {
    let rows = result
        .columns
        .iter()
        .map(|entry| match entry {
            ColumnMatch::Matched {
                name_a,
                name_b,
                method,
            } => vec![
                name_a.clone(),
                name_b.clone(),
                "matched".to_string(),
                method.as_str().to_string(),
            ],
            ColumnMatch::AddedInB { name } => vec![
                String::new(),
                name.clone(),
                "added in B".to_string(),
                String::new(),
            ],
            ColumnMatch::RemovedFromA { name } => vec![
                name.clone(),
                String::new(),
                "removed from A".to_string(),
                String::new(),
            ],
        })
        .collect();
    SheetTable {
        sheet_name: COLUMNS_SHEET.to_string(),
        columns: vec![
            "Column A".to_string(),
            "Column B".to_string(),
            "Status".to_string(),
            "Match method".to_string(),
        ],
        rows,
    }
}

fn rows_sheet(result: &ComparisonResult) -> SheetTable {
    let rows = result
        .rows
        .iter()
        .map(|entry| {
            let key = entry.key.to_string();
            match &entry.kind {
                RowMatchKind::Matched { row_a, row_b } => vec![
                    key,
                    "matched".to_string(),
                    display_row(*row_a),
                    display_row(*row_b),
                    String::new(),
                ],
                RowMatchKind::AddedInB { row_b } => vec![
                    key,
                    "added in B".to_string(),
                    String::new(),
                    display_row(*row_b),
                    String::new(),
                ],
                RowMatchKind::RemovedFromA { row_a } => vec![
                    key,
                    "removed from A".to_string(),
                    display_row(*row_a),
                    String::new(),
                    String::new(),
                ],
                RowMatchKind::DuplicateKey { rows_a, rows_b } => vec![
                    key,
                    "duplicate key".to_string(),
                    display_rows(rows_a),
                    display_rows(rows_b),
                    "excluded from value comparison".to_string(),
                ],
                RowMatchKind::Unkeyable {
                    side,
                    row,
                    missing_column,
                } => vec![
                    key,
                    "unkeyable".to_string(),
                    if *side == crate::compare::Side::A {
                        display_row(*row)
                    } else {
                        String::new()
                    },
                    if *side == crate::compare::Side::B {
                        display_row(*row)
                    } else {
                        String::new()
                    },
                    format!("key column '{missing_column}' missing from table {}", side.as_str()),
                ],
            }
        })
        .collect();
    SheetTable {
        sheet_name: ROWS_SHEET.to_string(),
        columns: vec![
            "Key".to_string(),
            "Status".to_string(),
            "Row A".to_string(),
            "Row B".to_string(),
            "Detail".to_string(),
        ],
        rows,
    }
}

fn cells_sheet(result: &ComparisonResult) -> SheetTable {
    let rows = result
        .cells
        .iter()
        .filter(|cell| !cell.equal)
        .map(|cell| {
            vec![
                cell.key.to_string(),
                cell.column_a.clone(),
                cell.value_a.to_string(),
                cell.value_b.to_string(),
                cell.magnitude
                    .map(|delta| delta.to_string())
                    .unwrap_or_default(),
                cell.note.clone().unwrap_or_default(),
            ]
        })
        .collect();
    SheetTable {
        sheet_name: CELLS_SHEET.to_string(),
        columns: vec![
            "Key".to_string(),
            "Column".to_string(),
            "Value A".to_string(),
            "Value B".to_string(),
            "Delta".to_string(),
            "Note".to_string(),
        ],
        rows,
    }
}

/// Spreadsheet-style row number: data starts on row 2, under the header.
fn display_row(row_idx: usize) -> String {
    (row_idx + 2).to_string()
}

fn display_rows(rows: &[usize]) -> String {
    rows.iter()
        .map(|row| display_row(*row))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders a terminal-friendly summary of the comparison.
pub fn render_text(result: &ComparisonResult) -> String {
    let summary = &result.summary;
    let mut out = String::new();
    let _ = writeln!(out, "{} vs {}", result.label_a, result.label_b);
    let _ = writeln!(
        out,
        "columns: {} matched, {} added in B, {} removed from A",
        summary.columns_matched, summary.columns_added, summary.columns_removed
    );
    let _ = writeln!(
        out,
        "rows: {} matched, {} added in B, {} removed from A, {} duplicate, {} unkeyable",
        summary.rows_matched,
        summary.rows_added,
        summary.rows_removed,
        summary.rows_duplicate,
        summary.rows_unkeyable
    );
    let _ = writeln!(
        out,
        "cells: {} equal, {} different ({} type mismatches)",
        summary.cells_equal, summary.cells_unequal, summary.cells_type_mismatch
    );

    for cell in result.cells.iter().filter(|cell| !cell.equal) {
        let delta = cell
            .magnitude
            .map(|delta| format!(" (delta {delta})"))
            .unwrap_or_default();
        let note = cell
            .note
            .as_deref()
            .map(|note| format!(" [{note}]"))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  [{}] {}: '{}' -> '{}'{delta}{note}",
            cell.key, cell.column_a, cell.value_a, cell.value_b
        );
    }

    if summary.is_clean() {
        let _ = writeln!(out, "no differences found");
    }

    out
}
