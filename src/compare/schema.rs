use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{Result, ToolError};
use crate::model::{Table, normalize_name};

/// How a column pair was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMethod {
    /// Explicit alias from the configuration.
    Alias,
    /// Exact header name equality.
    Exact,
    /// Equality after trim/casefold/whitespace-collapse normalization.
    Normalized,
}

impl MatchMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchMethod::Alias => "alias",
            MatchMethod::Exact => "exact",
            MatchMethod::Normalized => "normalized",
        }
    }
}

/// Alignment outcome for one column known to either table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnMatch {
    /// Column present in both tables.
    Matched {
        name_a: String,
        name_b: String,
        method: MatchMethod,
    },
    /// Column present only in table B.
    AddedInB { name: String },
    /// Column present only in table A.
    RemovedFromA { name: String },
}

impl ColumnMatch {
    pub fn is_matched(&self) -> bool {
        matches!(self, ColumnMatch::Matched { .. })
    }
}

/// Aligns the column sets of two tables into a bijective partial mapping.
///
/// Explicit aliases are claimed first and bypass the heuristics; remaining
/// columns match by exact name, then by normalized name. No fuzzy matching is
/// attempted: anything left over is reported as added or removed so ambiguity
/// reaches the user instead of being guessed away.
///
/// Output order is table A's column order, with B-only additions appended in
/// table B's order.
pub fn match_columns(
    table_a: &Table,
    table_b: &Table,
    aliases: &BTreeMap<String, String>,
) -> Result<Vec<ColumnMatch>> {
    let mut matched_a: HashMap<String, (String, MatchMethod)> = HashMap::new();
    let mut claimed_b: HashSet<String> = HashSet::new();

    // Aliases are authoritative when both ends exist. Two aliases claiming
    // the same target would break the one-to-one mapping.
    for (old_name, new_name) in aliases {
        if table_a.has_column(old_name) && table_b.has_column(new_name) {
            if !claimed_b.insert(new_name.clone()) {
                return Err(ToolError::InvalidConfig {
                    option: format!("aliases.{old_name}"),
                    reason: format!("target column '{new_name}' is claimed by another alias"),
                });
            }
            matched_a.insert(old_name.clone(), (new_name.clone(), MatchMethod::Alias));
        }
    }

    // Exact name equality.
    for name in table_a.columns() {
        if matched_a.contains_key(name) {
            continue;
        }
        if table_b.has_column(name) && !claimed_b.contains(name) {
            matched_a.insert(name.clone(), (name.clone(), MatchMethod::Exact));
            claimed_b.insert(name.clone());
        }
    }

    // Normalized name equality over whatever is still unclaimed. A collision
    // on either side is fatal: two distinct columns folding onto one key
    // cannot be resolved without an explicit alias.
    let remaining_b = normalized_lookup(
        table_b
            .columns()
            .iter()
            .filter(|name| !claimed_b.contains(*name)),
    )?;
    let mut seen_a: HashMap<String, String> = HashMap::new();
    for name in table_a.columns() {
        if matched_a.contains_key(name) {
            continue;
        }
        let key = normalize_name(name);
        if key.is_empty() {
            continue;
        }
        if let Some(previous) = seen_a.insert(key.clone(), name.clone()) {
            return Err(ToolError::AmbiguousColumnMatch {
                first: previous,
                second: name.clone(),
            });
        }
        if let Some(name_b) = remaining_b.get(&key) {
            matched_a.insert(name.clone(), (name_b.clone(), MatchMethod::Normalized));
            claimed_b.insert(name_b.clone());
        }
    }

    let mut mapping = Vec::with_capacity(table_a.columns().len() + table_b.columns().len());
    for name in table_a.columns() {
        match matched_a.get(name) {
            Some((name_b, method)) => mapping.push(ColumnMatch::Matched {
                name_a: name.clone(),
                name_b: name_b.clone(),
                method: *method,
            }),
            None => mapping.push(ColumnMatch::RemovedFromA { name: name.clone() }),
        }
    }
    for name in table_b.columns() {
        if !claimed_b.contains(name) {
            mapping.push(ColumnMatch::AddedInB { name: name.clone() });
        }
    }

    Ok(mapping)
}

fn normalized_lookup<'a>(
    names: impl Iterator<Item = &'a String>,
) -> Result<HashMap<String, String>> {
    let mut lookup = HashMap::new();
    for name in names {
        let key = normalize_name(name);
        if key.is_empty() {
            continue;
        }
        if let Some(previous) = lookup.insert(key, name.clone()) {
            return Err(ToolError::AmbiguousColumnMatch {
                first: previous,
                second: name.clone(),
            });
        }
    }
    Ok(lookup)
}
