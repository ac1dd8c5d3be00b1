//! # Workbook Merger
//!
//! Folds secondary workbooks into a master workbook. Sheets with the same name are
//! concatenated after aligning their columns, sheets missing from the master are copied
//! on request, and the result is written as a new workbook.

use crate::config::MergeOptions;
use crate::config::BATCH_MINIMUM;
use crate::config::BATCH_OUTPUT;
use crate::config::BATCH_PATTERN;
use crate::config::MERGED_PREFIX;
use crate::error::ReportError;
use crate::error::ResultMessage;
use crate::spreadsheet::Workbook;
use glob::Pattern;
use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;
use tracing::info;

/// File names Office leaves next to a workbook while it is open
const LOCK_FILE_PATTERN: &str = "~$*";

/// Merges one secondary workbook into the master, sheet by sheet.
///
/// Sheet names match case-insensitively. New sheets without columns, such as the
/// blank placeholder of a workbook written without tables, are never copied.
///
/// # Arguments
/// * `master` - Workbook receiving the rows
/// * `other` - Secondary workbook
/// * `options` - Copy and dedupe switches
pub fn merge_into(
    master: &mut Workbook,
    other: Workbook,
    options: &MergeOptions,
) -> Result<(), ReportError> {
    for (name, table) in other {
        match master.get_mut(&name) {
            Some(existing) => {
                let appended = table.height();
                existing.append(table);
                debug!(sheet = %name, rows = appended, "appended rows");
                if options.dedupe {
                    let removed = existing
                        .dedupe(options.dedupe_subset.as_deref())
                        .map_err(ReportError::from)
                        .with_prefix(&format!("Deduplicate sheet '{}'", name))?;
                    debug!(sheet = %name, removed, "removed duplicate rows");
                }
            }
            None if table.width() == 0 => debug!(sheet = %name, "skipped sheet without columns"),
            None if options.copy_new_sheets => {
                debug!(sheet = %name, "copied new sheet");
                master.insert(name, table);
            }
            None => debug!(sheet = %name, "skipped sheet missing from master"),
        }
    }
    Ok(())
}

/// Merges workbooks from disk and writes the result.
///
/// # Arguments
/// * `master` - Path of the master workbook
/// * `others` - Secondary workbooks, merged in order
/// * `options` - Copy and dedupe switches
/// * `output` - Destination; defaults to [`default_output`] of the master
///
/// # Returns
/// Path of the written workbook
pub fn merge_workbooks<P: AsRef<Path>>(
    master: &Path,
    others: &[P],
    options: &MergeOptions,
    output: Option<&Path>,
) -> Result<PathBuf, ReportError> {
    let mut merged = Workbook::read(master)?;
    for other in others {
        let other = other.as_ref();
        let workbook = Workbook::read(other)?;
        merge_into(&mut merged, workbook, options)
            .with_prefix(&format!("Merge '{}'", other.display()))?;
        info!(workbook = %other.display(), "merged workbook");
    }

    let output = output.map(Path::to_path_buf).unwrap_or_else(|| default_output(master));
    merged.write(&output)?;
    info!(output = %output.display(), sheets = merged.len(), "wrote merged workbook");
    Ok(output)
}

/// The master's file name prefixed with `merged_`, next to the master.
pub fn default_output(master: &Path) -> PathBuf {
    let mut name = OsString::from(MERGED_PREFIX);
    name.push(master.file_name().unwrap_or_default());
    master.with_file_name(name)
}

/// Lists the workbooks of a directory for the batch merge, sorted by name.
///
/// The batch output itself and Office lock files are left out.
pub fn discover_workbooks(directory: &Path) -> Result<Vec<PathBuf>, ReportError> {
    let workbook_pattern = Pattern::new(BATCH_PATTERN)?;
    let lock_pattern = Pattern::new(LOCK_FILE_PATTERN)?;
    let mut workbooks = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let excluded = lock_pattern.matches(name) || name == BATCH_OUTPUT;
        if path.is_file() && workbook_pattern.matches(name) && !excluded {
            workbooks.push(path);
        }
    }
    workbooks.sort();
    Ok(workbooks)
}

/// Merges every workbook of a directory into `merged_results.xlsx`.
///
/// The first workbook by name is the master; sheets only found in later workbooks
/// are copied and no rows are deduplicated.
///
/// # Returns
/// Path of the written workbook, or [`ReportError::NotEnoughWorkbooks`] when fewer
/// than two workbooks are present
pub fn run_batch(directory: &Path) -> Result<PathBuf, ReportError> {
    let workbooks = discover_workbooks(directory)?;
    let enough = workbooks.len() >= BATCH_MINIMUM;
    let Some((master, others)) = workbooks.split_first().filter(|_| enough) else {
        return Err(ReportError::NotEnoughWorkbooks {
            required: BATCH_MINIMUM,
            found: workbooks.len(),
        });
    };
    let output = directory.join(BATCH_OUTPUT);
    merge_workbooks(master, others, &MergeOptions::default(), Some(&output))
}
