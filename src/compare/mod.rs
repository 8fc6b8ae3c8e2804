//! The template comparison engine: schema matching, keyed row alignment, and
//! policy-driven value comparison, folded into one [`ComparisonResult`].
//!
//! [`compare_tables`] is the sole entry point. It is a pure function of the
//! two tables and the configuration: no I/O, no hidden state, safe to run for
//! many table pairs in parallel as long as the config is shared read-only.

pub mod rows;
pub mod schema;
pub mod values;

pub use rows::{RowEntry, RowKey, RowMatchKind, Side, align_rows};
pub use schema::{ColumnMatch, MatchMethod, match_columns};
pub use values::{CellDiff, CellOutcome, ComparePolicy, compare_cells};

use crate::config::CompareConfig;
use crate::error::Result;
use crate::model::Table;

/// Aggregate counts over one comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComparisonSummary {
    pub columns_matched: usize,
    pub columns_added: usize,
    pub columns_removed: usize,
    pub rows_matched: usize,
    pub rows_added: usize,
    pub rows_removed: usize,
    pub rows_duplicate: usize,
    pub rows_unkeyable: usize,
    pub cells_equal: usize,
    pub cells_unequal: usize,
    pub cells_type_mismatch: usize,
}

impl ComparisonSummary {
    /// True when the two tables agree completely.
    pub fn is_clean(&self) -> bool {
        self.columns_added == 0
            && self.columns_removed == 0
            && self.rows_added == 0
            && self.rows_removed == 0
            && self.rows_duplicate == 0
            && self.rows_unkeyable == 0
            && self.cells_unequal == 0
    }
}

/// The complete, ordered report of differences between two tables. Immutable
/// once assembled; the caller owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub label_a: String,
    pub label_b: String,
    pub columns: Vec<ColumnMatch>,
    pub rows: Vec<RowEntry>,
    pub cells: Vec<CellDiff>,
    pub summary: ComparisonSummary,
}

/// Compares two tables under the given configuration.
///
/// The fixed pipeline is: config validation, schema match, row alignment,
/// then one cell comparison per matched-row × matched-column pair. Structural
/// and configuration problems abort with an error before any result is
/// produced; per-row and per-cell anomalies (duplicate keys, type mismatches)
/// degrade into diagnostics inside the result so the user gets one
/// comprehensive report.
pub fn compare_tables(
    table_a: &Table,
    table_b: &Table,
    config: &CompareConfig,
) -> Result<ComparisonResult> {
    config.validate()?;
    config.validate_against(table_a, table_b)?;

    let columns = match_columns(table_a, table_b, &config.aliases)?;
    let rows = align_rows(
        table_a,
        table_b,
        &columns,
        &config.key_columns,
        &config.aliases,
    );

    let matched_columns: Vec<(&str, &str, ComparePolicy)> = columns
        .iter()
        .filter_map(|entry| match entry {
            ColumnMatch::Matched { name_a, name_b, .. } => Some((
                name_a.as_str(),
                name_b.as_str(),
                resolve_policy(config, name_a, name_b),
            )),
            _ => None,
        })
        .collect();

    let mut cells = Vec::new();
    for entry in &rows {
        let RowMatchKind::Matched { row_a, row_b } = entry.kind else {
            continue;
        };
        for (name_a, name_b, policy) in &matched_columns {
            let value_a = table_a.cell(row_a, name_a);
            let value_b = table_b.cell(row_b, name_b);
            let outcome = compare_cells(value_a, value_b, policy, &config.date_formats);
            let (equal, magnitude, note) = match outcome {
                CellOutcome::Equal => (true, None, None),
                CellOutcome::Unequal { magnitude } => (false, magnitude, None),
                CellOutcome::TypeMismatch { detail } => {
                    (false, None, Some(format!("type mismatch: {detail}")))
                }
            };
            cells.push(CellDiff {
                key: entry.key.clone(),
                row_a,
                row_b,
                column_a: (*name_a).to_string(),
                column_b: (*name_b).to_string(),
                value_a: value_a.clone(),
                value_b: value_b.clone(),
                equal,
                magnitude,
                note,
            });
        }
    }

    let summary = summarize(&columns, &rows, &cells);

    Ok(ComparisonResult {
        label_a: table_a.label().to_string(),
        label_b: table_b.label().to_string(),
        columns,
        rows,
        cells,
        summary,
    })
}

/// Policies are addressed by the table A name; the B name works as a fallback
/// so a renamed column keeps its rule when matched through an alias.
fn resolve_policy(config: &CompareConfig, name_a: &str, name_b: &str) -> ComparePolicy {
    config
        .policies
        .get(name_a)
        .or_else(|| config.policies.get(name_b))
        .map(|spec| ComparePolicy::from_spec(spec, config))
        .unwrap_or(ComparePolicy::ExactText)
}

fn summarize(
    columns: &[ColumnMatch],
    rows: &[RowEntry],
    cells: &[CellDiff],
) -> ComparisonSummary {
    let mut summary = ComparisonSummary::default();

    for entry in columns {
        match entry {
            ColumnMatch::Matched { .. } => summary.columns_matched += 1,
            ColumnMatch::AddedInB { .. } => summary.columns_added += 1,
            ColumnMatch::RemovedFromA { .. } => summary.columns_removed += 1,
        }
    }

    for entry in rows {
        match &entry.kind {
            RowMatchKind::Matched { .. } => summary.rows_matched += 1,
            RowMatchKind::AddedInB { .. } => summary.rows_added += 1,
            RowMatchKind::RemovedFromA { .. } => summary.rows_removed += 1,
            RowMatchKind::DuplicateKey { rows_a, rows_b } => {
                summary.rows_duplicate += rows_a.len() + rows_b.len();
            }
            RowMatchKind::Unkeyable { .. } => summary.rows_unkeyable += 1,
        }
    }

    for cell in cells {
        if cell.equal {
            summary.cells_equal += 1;
        } else {
            summary.cells_unequal += 1;
            if cell.note.is_some() {
                summary.cells_type_mismatch += 1;
            }
        }
    }

    summary
}
