use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};
use crate::model::Table;

/// Default tolerance applied when a numeric policy omits its epsilon.
pub const DEFAULT_EPSILON: f64 = 0.0;
/// Default day tolerance applied when a date policy omits its bound.
pub const DEFAULT_DATE_TOLERANCE_DAYS: i64 = 0;

fn default_date_formats() -> Vec<String> {
    vec![
        "%Y-%m-%d".to_string(),
        "%d/%m/%Y".to_string(),
        "%m/%d/%Y".to_string(),
        "%d-%m-%Y".to_string(),
    ]
}

/// Declarative comparison settings supplied by the user.
///
/// Loaded from a JSON document; every field has a default so a missing or
/// empty file means "compare with exact matching on all columns, keyed by the
/// full row".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Explicit column renames, old (file A) name → new (file B) name. These
    /// are authoritative and bypass heuristic matching.
    pub aliases: BTreeMap<String, String>,
    /// Ordered key column names (file A side) used to align rows. Empty means
    /// all matched columns jointly, i.e. full-row identity.
    pub key_columns: Vec<String>,
    /// Per-column comparison policies, addressed by file A column name.
    pub policies: BTreeMap<String, PolicySpec>,
    /// Epsilon used by numeric policies that do not specify their own.
    pub default_epsilon: f64,
    /// Accepted date formats, tried in order, for text cells under a date
    /// policy (chrono strftime syntax).
    pub date_formats: Vec<String>,
    /// Day tolerance used by date policies that do not specify their own.
    pub default_date_tolerance_days: i64,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            aliases: BTreeMap::new(),
            key_columns: Vec::new(),
            policies: BTreeMap::new(),
            default_epsilon: DEFAULT_EPSILON,
            date_formats: default_date_formats(),
            default_date_tolerance_days: DEFAULT_DATE_TOLERANCE_DAYS,
        }
    }
}

/// Per-column policy as written in the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PolicySpec {
    /// Normalized string equality (trim, casefold, collapse whitespace).
    ExactText,
    /// Casefolded comparison, whitespace kept significant.
    IgnoreCase,
    /// Whitespace-stripped comparison, case kept significant.
    IgnoreWhitespace,
    /// Numeric comparison within an inclusive epsilon.
    NumericTolerance { epsilon: Option<f64> },
    /// Calendar-date comparison within an inclusive day bound.
    DateTolerance { max_delta_days: Option<i64> },
}

impl CompareConfig {
    /// Loads a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: CompareConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates option values that serde cannot check: tolerances must be
    /// finite and non-negative, date formats must exist when a date policy is
    /// configured. Fails before any comparison work begins.
    pub fn validate(&self) -> Result<()> {
        if !self.default_epsilon.is_finite() || self.default_epsilon < 0.0 {
            return Err(ToolError::InvalidConfig {
                option: "default_epsilon".to_string(),
                reason: format!("must be a finite non-negative number, got {}", self.default_epsilon),
            });
        }
        if self.default_date_tolerance_days < 0 {
            return Err(ToolError::InvalidConfig {
                option: "default_date_tolerance_days".to_string(),
                reason: format!("must be non-negative, got {}", self.default_date_tolerance_days),
            });
        }

        let mut uses_dates = false;
        for (column, spec) in &self.policies {
            match spec {
                PolicySpec::NumericTolerance {
                    epsilon: Some(epsilon),
                } => {
                    if !epsilon.is_finite() || *epsilon < 0.0 {
                        return Err(ToolError::InvalidConfig {
                            option: format!("policies.{column}.epsilon"),
                            reason: format!("must be a finite non-negative number, got {epsilon}"),
                        });
                    }
                }
                PolicySpec::DateTolerance { max_delta_days } => {
                    uses_dates = true;
                    if let Some(days) = max_delta_days {
                        if *days < 0 {
                            return Err(ToolError::InvalidConfig {
                                option: format!("policies.{column}.max_delta_days"),
                                reason: format!("must be non-negative, got {days}"),
                            });
                        }
                    }
                }
                _ => {}
            }
        }

        if uses_dates && self.date_formats.is_empty() {
            return Err(ToolError::InvalidConfig {
                option: "date_formats".to_string(),
                reason: "a date tolerance policy is configured but no date formats are given"
                    .to_string(),
            });
        }

        Ok(())
    }

    /// Checks the config against the two concrete tables it is about to
    /// drive: aliases and key columns must name columns that actually exist.
    /// A key column present in one table but not the other is legal (the
    /// aligner reports the affected rows as unkeyable); one present in
    /// neither table is a typo and rejected here.
    pub fn validate_against(&self, table_a: &Table, table_b: &Table) -> Result<()> {
        for (old_name, new_name) in &self.aliases {
            if !table_a.has_column(old_name) && !table_b.has_column(old_name) {
                return Err(ToolError::InvalidConfig {
                    option: format!("aliases.{old_name}"),
                    reason: "column not present in either table".to_string(),
                });
            }
            if !table_a.has_column(new_name) && !table_b.has_column(new_name) {
                return Err(ToolError::InvalidConfig {
                    option: format!("aliases.{old_name}"),
                    reason: format!("target column '{new_name}' not present in either table"),
                });
            }
        }

        for key in &self.key_columns {
            let in_a = table_a.has_column(key);
            let resolved_b = self.aliases.get(key).map(String::as_str).unwrap_or(key);
            let in_b = table_b.has_column(resolved_b);
            if !in_a && !in_b {
                return Err(ToolError::InvalidConfig {
                    option: format!("key_columns.{key}"),
                    reason: "column not present in either table".to_string(),
                });
            }
        }

        Ok(())
    }
}
