//! Core library for the template-tools command line application.
//!
//! The library reconciles structured Excel templates: spreadsheets with a
//! fixed, organization-defined schema. Its centre is the comparison engine in
//! [`compare`], a pure function from two [`model::Table`]s and a
//! [`config::CompareConfig`] to a structured diff of schema and value
//! changes. The modules are structured to keep responsibilities narrow and
//! composable: IO adapters live under [`io`], data representations inside
//! [`model`], report rendering in [`report`], and file-level orchestration
//! for the CLI under [`workflows`].

pub mod compare;
pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod preprocess;
pub mod profile;
pub mod report;
pub mod workflows;

pub use compare::{ComparisonResult, ComparisonSummary, compare_tables};
pub use config::CompareConfig;
pub use error::{Result, ToolError};
pub use model::{CellValue, Table};
