use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::compare::{ComparisonResult, compare_tables};
use crate::config::CompareConfig;
use crate::error::Result;
use crate::io::excel_read;
use crate::io::excel_write::{self, SheetTable};
use crate::preprocess::clean_table;
use crate::profile::{self, ColumnProfile};
use crate::report;

/// Compares two template files and, when an output path is given, writes the
/// full workbook report next to returning the in-memory result.
#[instrument(
    level = "info",
    skip_all,
    fields(input_a = %input_a.display(), input_b = %input_b.display())
)]
pub fn compare_files(
    input_a: &Path,
    input_b: &Path,
    config_path: Option<&Path>,
    output: Option<&Path>,
) -> Result<ComparisonResult> {
    let config = match config_path {
        Some(path) => CompareConfig::load(path)?,
        None => CompareConfig::default(),
    };

    let table_a = excel_read::read_table(input_a)?;
    let table_b = excel_read::read_table(input_b)?;
    info!(
        rows_a = table_a.row_count(),
        rows_b = table_b.row_count(),
        "tables loaded"
    );

    let result = compare_tables(&table_a, &table_b, &config)?;
    debug!(
        cells_unequal = result.summary.cells_unequal,
        rows_matched = result.summary.rows_matched,
        "comparison finished"
    );

    if let Some(output) = output {
        excel_write::write_tables(output, &report::comparison_sheets(&result))?;
        info!(output = %output.display(), "comparison report written");
    }

    Ok(result)
}

/// Profiles every column of every input file into one field report workbook.
/// Returns the path actually written, which may carry a `_2`, `_3`, … suffix
/// when the requested one already exists.
#[instrument(level = "info", skip_all, fields(inputs = inputs.len(), output = %output.display()))]
pub fn field_report_files(inputs: &[PathBuf], output: &Path) -> Result<PathBuf> {
    let mut profiles: Vec<ColumnProfile> = Vec::new();
    for input in inputs {
        let table = excel_read::read_table(input)?;
        debug!(file = table.label(), columns = table.columns().len(), "profiling file");
        profiles.extend(profile::profile_table(&table));
    }
    info!(profile_count = profiles.len(), "field profiles collected");

    let output = next_available_path(output);
    excel_write::write_tables(&output, &[profile::report_sheet(&profiles)])?;
    Ok(output)
}

/// Cleans every input file and writes the results as one workbook, one sheet
/// per input.
#[instrument(level = "info", skip_all, fields(inputs = inputs.len(), output = %output.display()))]
pub fn preprocess_files(inputs: &[PathBuf], output: &Path) -> Result<()> {
    let mut sheets: Vec<SheetTable> = Vec::new();
    for input in inputs {
        let table = excel_read::read_table(input)?;
        let cleaned = clean_table(&table)?;
        debug!(
            file = table.label(),
            dropped_columns = table.columns().len() - cleaned.columns().len(),
            "file cleaned"
        );
        sheets.push(SheetTable::from_table(&cleaned));
    }

    dedupe_sheet_names(&mut sheets);
    excel_write::write_tables(output, &sheets)?;
    info!(sheet_count = sheets.len(), "cleaned workbook written");
    Ok(())
}

/// Appends `_2`, `_3`, … to the file stem until the path is unused.
pub fn next_available_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let extension = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let directory = path.parent().unwrap_or_else(|| Path::new("."));

    let mut counter = 2;
    loop {
        let candidate = directory.join(format!("{stem}_{counter}{extension}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

fn dedupe_sheet_names(sheets: &mut [SheetTable]) {
    let mut used = std::collections::HashSet::new();
    for sheet in sheets.iter_mut() {
        if used.insert(sheet.sheet_name.clone()) {
            continue;
        }
        let base = sheet.sheet_name.clone();
        let mut counter = 2;
        loop {
            let suffix = format!("_{counter}");
            let max_len = 31usize.saturating_sub(suffix.len());
            let prefix: String = base.chars().take(max_len).collect();
            let candidate = format!("{prefix}{suffix}");
            if used.insert(candidate.clone()) {
                sheet.sheet_name = candidate;
                break;
            }
            counter += 1;
        }
    }
}
