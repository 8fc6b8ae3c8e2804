use std::path::PathBuf;

use clap::{Parser, Subcommand};
use template_tools::{Result, ToolError, report, workflows};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_tracing()?;
    match cli.command {
        Command::Compare(args) => execute_compare(args),
        Command::FieldReport(args) => execute_field_report(args),
        Command::Preprocess(args) => execute_preprocess(args),
    }
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn execute_compare(args: CompareArgs) -> Result<()> {
    for input in [&args.file_a, &args.file_b] {
        if !input.exists() {
            return Err(ToolError::MissingInput(input.clone()));
        }
    }
    if let Some(config) = &args.config {
        if !config.exists() {
            return Err(ToolError::MissingInput(config.clone()));
        }
    }

    let result = workflows::compare_files(
        &args.file_a,
        &args.file_b,
        args.config.as_deref(),
        args.output.as_deref(),
    )?;
    print!("{}", report::render_text(&result));
    Ok(())
}

fn execute_field_report(args: FieldReportArgs) -> Result<()> {
    check_inputs(&args.inputs)?;
    let written = workflows::field_report_files(&args.inputs, &args.output)?;
    println!("field report written to {}", written.display());
    Ok(())
}

fn execute_preprocess(args: PreprocessArgs) -> Result<()> {
    check_inputs(&args.inputs)?;
    workflows::preprocess_files(&args.inputs, &args.output)?;
    println!("cleaned workbook written to {}", args.output.display());
    Ok(())
}

fn check_inputs(inputs: &[PathBuf]) -> Result<()> {
    for input in inputs {
        if !input.exists() {
            return Err(ToolError::MissingInput(input.clone()));
        }
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Reconcile, profile, and clean structured Excel templates."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare two template files and report schema and value differences.
    Compare(CompareArgs),
    /// Profile the columns of one or more files into a field report.
    FieldReport(FieldReportArgs),
    /// Clean raw exports: drop empty columns, trim text cells.
    Preprocess(PreprocessArgs),
}

#[derive(clap::Args)]
struct CompareArgs {
    /// Reference template file.
    file_a: PathBuf,

    /// Template file to compare against the reference.
    file_b: PathBuf,

    /// Comparison configuration (JSON): aliases, key columns, policies.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a full workbook report to this path.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct FieldReportArgs {
    /// Input files to profile.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output report path. An existing file is kept and a numbered
    /// alternative is chosen instead.
    #[arg(long, default_value = "_FieldReport.xlsx")]
    output: PathBuf,
}

#[derive(clap::Args)]
struct PreprocessArgs {
    /// Input files to clean.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output workbook path, one sheet per input.
    #[arg(long)]
    output: PathBuf,
}
