use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use report_sheets::config::DEFAULT_ASSAY_TYPE;
use report_sheets::config::DEFAULT_SOURCE;
use report_sheets::extractor;
use report_sheets::logging;
use std::path::PathBuf;

/// Extract the tables of an HTML report into an `.xlsx` workbook, one sheet per table.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// HTML report to read.
    html_path: PathBuf,

    /// Value of the `assayType` column.
    #[arg(default_value = DEFAULT_ASSAY_TYPE)]
    assay_type: String,

    /// Value of the `source` column.
    #[arg(default_value = DEFAULT_SOURCE)]
    source: String,

    /// Workbook to write (default: `<html-basename>.xlsx` in the working directory).
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Log progress to stderr (repeat for more detail).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);
    let output = args.output.as_deref();
    let output = extractor::extract_file(&args.html_path, &args.assay_type, &args.source, output)
        .with_context(|| format!("Failed to extract tables from '{}'", args.html_path.display()))?;
    println!("Tables extracted to: {}", output.display());
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
