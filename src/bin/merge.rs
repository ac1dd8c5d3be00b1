use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use report_sheets::config::MergeOptions;
use report_sheets::config::BATCH_MINIMUM;
use report_sheets::logging;
use report_sheets::merger;
use report_sheets::ReportError;
use std::path::PathBuf;
use std::process::ExitCode;

/// Merge `.xlsx` workbooks sheet by sheet.
///
/// Without paths, every `*.xlsx` of the working directory is merged into
/// `merged_results.xlsx`, the first file by name being the master.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Master workbook followed by the workbooks merged into it.
    workbooks: Vec<PathBuf>,

    /// Drop sheets that only exist in secondary workbooks.
    #[arg(long)]
    no_copy_new_sheets: bool,

    /// Remove duplicate rows from merged sheets, keeping the first occurrence.
    #[arg(long)]
    dedupe: bool,

    /// Column compared when deduplicating (repeatable; default: all columns).
    #[arg(long = "dedupe-subset", value_name = "COL", requires = "dedupe")]
    dedupe_subset: Vec<String>,

    /// Workbook to write (default: the master's name prefixed with `merged_`).
    #[arg(short, long, value_name = "PATH", requires = "workbooks")]
    output: Option<PathBuf>,

    /// Log progress to stderr (repeat for more detail).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn options(&self) -> MergeOptions {
        MergeOptions {
            copy_new_sheets: !self.no_copy_new_sheets,
            dedupe: self.dedupe,
            dedupe_subset: Some(self.dedupe_subset.clone()).filter(|subset| !subset.is_empty()),
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let output = match args.workbooks.split_first() {
        Some((master, others)) => {
            merger::merge_workbooks(master, others, &args.options(), args.output.as_deref())
                .with_context(|| format!("Failed to merge into '{}'", master.display()))?
        }
        None => {
            let directory = std::env::current_dir().context("Failed to read working directory")?;
            match merger::run_batch(&directory) {
                Err(ReportError::NotEnoughWorkbooks { .. }) => {
                    println!("Need at least {BATCH_MINIMUM} Excel files to merge");
                    return Ok(ExitCode::FAILURE);
                }
                result => result.context("Failed to merge workbooks")?,
            }
        }
    };
    println!("Merged workbook saved to: {}", output.display());
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose);
    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
