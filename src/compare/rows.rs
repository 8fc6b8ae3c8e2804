use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use crate::compare::schema::ColumnMatch;
use crate::model::Table;

/// Ordered tuple of canonical cell values identifying one row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowKey(pub Vec<String>);

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" | "))
    }
}

/// Which input table a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::A => "A",
            Side::B => "B",
        }
    }
}

/// Alignment outcome for one row key (or one unkeyable row).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowMatchKind {
    /// Key present in exactly one row of each table.
    Matched { row_a: usize, row_b: usize },
    /// Key present only in table B.
    AddedInB { row_b: usize },
    /// Key present only in table A.
    RemovedFromA { row_a: usize },
    /// Key shared by several rows of one table. Identity is ambiguous, so no
    /// value comparison is performed for any of the listed rows.
    DuplicateKey {
        rows_a: Vec<usize>,
        rows_b: Vec<usize>,
    },
    /// Row on a side that cannot form keys because a key column is missing
    /// from its table. Distinct from a normal addition or removal.
    Unkeyable {
        side: Side,
        row: usize,
        missing_column: String,
    },
}

/// One entry of the row mapping: a key and its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowEntry {
    pub key: RowKey,
    pub kind: RowMatchKind,
}

/// Aligns the rows of two tables by the configured key columns.
///
/// Key column names are table A names; an empty list means all matched
/// columns jointly (full-row identity — a fallback, not a recommended mode).
/// A key column absent from one table makes that table's rows unkeyable; the
/// other table still keys its rows, which then surface as one-sided since no
/// partner can exist. Output follows table A's row order, then B-only keys in
/// table B's order, then unkeyable-row diagnostics.
pub fn align_rows(
    table_a: &Table,
    table_b: &Table,
    columns: &[ColumnMatch],
    key_columns: &[String],
    aliases: &BTreeMap<String, String>,
) -> Vec<RowEntry> {
    let matched: Vec<(&str, &str)> = columns
        .iter()
        .filter_map(|entry| match entry {
            ColumnMatch::Matched { name_a, name_b, .. } => {
                Some((name_a.as_str(), name_b.as_str()))
            }
            _ => None,
        })
        .collect();

    // Resolve the per-side key column names. Matched pairs carry both names;
    // for an unmatched key column each side uses its own name (the alias
    // target on the B side) and the side lacking it entirely is flagged.
    let mut names_a: Vec<&str> = Vec::new();
    let mut names_b: Vec<&str> = Vec::new();
    let mut missing_a: Option<&str> = None;
    let mut missing_b: Option<&str> = None;
    if key_columns.is_empty() {
        for (name_a, name_b) in matched.iter().copied() {
            names_a.push(name_a);
            names_b.push(name_b);
        }
    } else {
        for key in key_columns {
            if let Some((name_a, name_b)) = matched
                .iter()
                .copied()
                .find(|(name_a, _)| *name_a == key.as_str())
            {
                names_a.push(name_a);
                names_b.push(name_b);
                continue;
            }
            if table_a.has_column(key) {
                names_a.push(key.as_str());
            } else {
                missing_a.get_or_insert(key.as_str());
            }
            let b_name = aliases.get(key).map(String::as_str).unwrap_or(key);
            if table_b.has_column(b_name) {
                names_b.push(b_name);
            } else {
                missing_b.get_or_insert(key.as_str());
            }
        }
    }

    let keys_a = if missing_a.is_none() {
        build_keys(table_a, &names_a)
    } else {
        Vec::new()
    };
    let keys_b = if missing_b.is_none() {
        build_keys(table_b, &names_b)
    } else {
        Vec::new()
    };

    let index_a = build_index(&keys_a);
    let index_b = build_index(&keys_b);

    let mut entries = Vec::new();
    let mut emitted: HashSet<&RowKey> = HashSet::new();

    for key in &keys_a {
        if !emitted.insert(key) {
            continue;
        }
        let rows_a = &index_a[key];
        let rows_b = index_b.get(key);
        let kind = if rows_a.len() > 1 || rows_b.is_some_and(|rows| rows.len() > 1) {
            RowMatchKind::DuplicateKey {
                rows_a: rows_a.clone(),
                rows_b: rows_b.cloned().unwrap_or_default(),
            }
        } else if let Some(rows) = rows_b {
            RowMatchKind::Matched {
                row_a: rows_a[0],
                row_b: rows[0],
            }
        } else {
            RowMatchKind::RemovedFromA { row_a: rows_a[0] }
        };
        entries.push(RowEntry {
            key: key.clone(),
            kind,
        });
    }

    for key in &keys_b {
        if !emitted.insert(key) {
            continue;
        }
        let rows_b = &index_b[key];
        let kind = if rows_b.len() > 1 {
            RowMatchKind::DuplicateKey {
                rows_a: Vec::new(),
                rows_b: rows_b.clone(),
            }
        } else {
            RowMatchKind::AddedInB { row_b: rows_b[0] }
        };
        entries.push(RowEntry {
            key: key.clone(),
            kind,
        });
    }

    if let Some(column) = missing_a {
        entries.extend((0..table_a.row_count()).map(|row| RowEntry {
            key: RowKey(Vec::new()),
            kind: RowMatchKind::Unkeyable {
                side: Side::A,
                row,
                missing_column: column.to_string(),
            },
        }));
    }
    if let Some(column) = missing_b {
        entries.extend((0..table_b.row_count()).map(|row| RowEntry {
            key: RowKey(Vec::new()),
            kind: RowMatchKind::Unkeyable {
                side: Side::B,
                row,
                missing_column: column.to_string(),
            },
        }));
    }

    entries
}

fn build_keys(table: &Table, key_names: &[&str]) -> Vec<RowKey> {
    (0..table.row_count())
        .map(|row_idx| {
            RowKey(
                key_names
                    .iter()
                    .map(|name| table.cell(row_idx, name).key_form())
                    .collect(),
            )
        })
        .collect()
}

fn build_index(keys: &[RowKey]) -> HashMap<&RowKey, Vec<usize>> {
    let mut index: HashMap<&RowKey, Vec<usize>> = HashMap::new();
    for (row_idx, key) in keys.iter().enumerate() {
        index.entry(key).or_default().push(row_idx);
    }
    index
}
