use crate::compare::rows::RowKey;
use crate::config::{CompareConfig, PolicySpec};
use crate::model::{CellValue, normalize_name};

/// Resolved per-column comparison rule. Unlike [`PolicySpec`] every tolerance
/// is concrete; defaults from the config have already been applied.
#[derive(Debug, Clone, PartialEq)]
pub enum ComparePolicy {
    ExactText,
    IgnoreCase,
    IgnoreWhitespace,
    NumericTolerance { epsilon: f64 },
    DateTolerance { max_delta_days: i64 },
}

impl ComparePolicy {
    /// Resolves a configured policy spec, filling optional tolerances from
    /// the config-wide defaults.
    pub fn from_spec(spec: &PolicySpec, config: &CompareConfig) -> Self {
        match spec {
            PolicySpec::ExactText => ComparePolicy::ExactText,
            PolicySpec::IgnoreCase => ComparePolicy::IgnoreCase,
            PolicySpec::IgnoreWhitespace => ComparePolicy::IgnoreWhitespace,
            PolicySpec::NumericTolerance { epsilon } => ComparePolicy::NumericTolerance {
                epsilon: epsilon.unwrap_or(config.default_epsilon),
            },
            PolicySpec::DateTolerance { max_delta_days } => ComparePolicy::DateTolerance {
                max_delta_days: max_delta_days.unwrap_or(config.default_date_tolerance_days),
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparePolicy::ExactText => "exact_text",
            ComparePolicy::IgnoreCase => "ignore_case",
            ComparePolicy::IgnoreWhitespace => "ignore_whitespace",
            ComparePolicy::NumericTolerance { .. } => "numeric_tolerance",
            ComparePolicy::DateTolerance { .. } => "date_tolerance",
        }
    }
}

/// Outcome of comparing two cells under a policy.
#[derive(Debug, Clone, PartialEq)]
pub enum CellOutcome {
    Equal,
    /// Unequal; the magnitude is the signed delta `b - a` for numeric and
    /// date policies and absent for text policies and presence changes.
    Unequal { magnitude: Option<f64> },
    /// A tolerance policy met a non-empty value it cannot coerce. Recorded as
    /// a diagnostic, never an error.
    TypeMismatch { detail: String },
}

/// One compared (matched row × matched column) cell pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CellDiff {
    pub key: RowKey,
    pub row_a: usize,
    pub row_b: usize,
    pub column_a: String,
    pub column_b: String,
    pub value_a: CellValue,
    pub value_b: CellValue,
    pub equal: bool,
    /// Signed delta `b - a` for unequal numeric/date cells.
    pub magnitude: Option<f64>,
    /// Diagnostic note, set for type mismatches.
    pub note: Option<String>,
}

/// Compares two cell values under a policy.
///
/// Two rules hold for every policy: empty-vs-empty is equal, and
/// empty-vs-nonempty is unequal with no magnitude. Appearance or
/// disappearance of data is a presence change, not a value change, and stays
/// distinguishable downstream.
pub fn compare_cells(
    value_a: &CellValue,
    value_b: &CellValue,
    policy: &ComparePolicy,
    date_formats: &[String],
) -> CellOutcome {
    match (value_a.is_empty(), value_b.is_empty()) {
        (true, true) => return CellOutcome::Equal,
        (true, false) | (false, true) => return CellOutcome::Unequal { magnitude: None },
        (false, false) => {}
    }

    match policy {
        ComparePolicy::ExactText => {
            text_outcome(normalize_name(&value_a.to_string()) == normalize_name(&value_b.to_string()))
        }
        ComparePolicy::IgnoreCase => text_outcome(
            value_a.to_string().to_lowercase() == value_b.to_string().to_lowercase(),
        ),
        ComparePolicy::IgnoreWhitespace => {
            text_outcome(strip_whitespace(&value_a.to_string()) == strip_whitespace(&value_b.to_string()))
        }
        ComparePolicy::NumericTolerance { epsilon } => {
            let (Some(a), Some(b)) = (value_a.as_number(), value_b.as_number()) else {
                return CellOutcome::TypeMismatch {
                    detail: mismatch_detail("numeric", value_a, value_b),
                };
            };
            let delta = b - a;
            if delta.abs() <= *epsilon {
                CellOutcome::Equal
            } else {
                CellOutcome::Unequal {
                    magnitude: Some(delta),
                }
            }
        }
        ComparePolicy::DateTolerance { max_delta_days } => {
            let (Some(a), Some(b)) = (
                value_a.as_date(date_formats),
                value_b.as_date(date_formats),
            ) else {
                return CellOutcome::TypeMismatch {
                    detail: mismatch_detail("date", value_a, value_b),
                };
            };
            let delta_days = (b - a).num_days();
            if delta_days.abs() <= *max_delta_days {
                CellOutcome::Equal
            } else {
                CellOutcome::Unequal {
                    magnitude: Some(delta_days as f64),
                }
            }
        }
    }
}

fn text_outcome(equal: bool) -> CellOutcome {
    if equal {
        CellOutcome::Equal
    } else {
        CellOutcome::Unequal { magnitude: None }
    }
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|ch| !ch.is_whitespace()).collect()
}

fn mismatch_detail(expected: &str, value_a: &CellValue, value_b: &CellValue) -> String {
    format!("expected {expected} values, got '{value_a}' and '{value_b}'")
}
