use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool ingests tables, compares them, or emits reports.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when an input table is structurally invalid (duplicate header
    /// names, ragged rows). Fatal to the comparison it feeds.
    #[error("malformed table '{label}': {detail}")]
    MalformedTable { label: String, detail: String },

    /// Raised when the comparison configuration fails validation, before any
    /// comparison work begins.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidConfig { option: String, reason: String },

    /// Raised when header normalization collapses two distinct columns of the
    /// same table onto one key. Both candidates are named so the user can
    /// supply an explicit alias instead.
    #[error("ambiguous column match: '{first}' and '{second}' normalize to the same name")]
    AmbiguousColumnMatch { first: String, second: String },

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
