//! # Table Extractor
//!
//! Turns the tables of an HTML report into a workbook. Every `<table>` becomes one
//! sheet named after the heading or caption that introduces it, and every row is
//! tagged with the report source, the assay type, the run name and the pipeline
//! version.

mod html_table;
pub mod metadata;

use crate::config::DEFAULT_PIPELINE_VERSION;
use crate::config::DEFAULT_RUN_NAME;
use crate::config::TAG_COLUMNS;
use crate::config::WORKBOOK_EXTENSION;
use crate::error::ReportError;
use crate::error::ResultMessage;
use crate::extractor::html_table::find_tables;
use crate::spreadsheet::sheet_name;
use crate::spreadsheet::Workbook;
use crate::table::Table;
use crate::table::Value;
use scraper::Html;
use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Values written into the metadata columns of every extracted row.
#[derive(Clone, Debug, PartialEq)]
pub struct Tags {
    pub source: String,
    pub assay_type: String,
    pub run_name: String,
    pub pipeline_version: String,
}

impl Tags {
    /// Tag values in the order of [`TAG_COLUMNS`].
    fn values(&self) -> [&str; 4] {
        [
            self.source.as_str(),
            self.assay_type.as_str(),
            self.run_name.as_str(),
            self.pipeline_version.as_str(),
        ]
    }
}

/// Extracts every table of an HTML document into a workbook.
///
/// # Arguments
/// * `html` - Document text
/// * `assay_type` - Value of the `assayType` column
/// * `source` - Value of the `source` column
///
/// # Returns
/// Workbook with one sheet per parseable table, in document order
pub fn extract_document(html: &str, assay_type: &str, source: &str) -> Workbook {
    let document = Html::parse_document(html);
    let tags = Tags {
        source: source.to_owned(),
        assay_type: assay_type.to_owned(),
        run_name: metadata::find_run_name(&document).unwrap_or_else(|| DEFAULT_RUN_NAME.to_owned()),
        pipeline_version: metadata::find_pipeline_version(&document)
            .unwrap_or_else(|| DEFAULT_PIPELINE_VERSION.to_owned()),
    };
    debug!(run_name = %tags.run_name, pipeline_version = %tags.pipeline_version, "report metadata");

    let mut workbook = Workbook::new();
    for html_table in find_tables(&document) {
        let title = html_table.title();
        let Some(mut table) = html_table.parse() else {
            warn!(table = html_table.index + 1, %title, "skipping table without cells");
            continue;
        };
        tag_table(&mut table, &tags);

        let mut name = sheet_name(&title);
        if name.is_empty() {
            name = html_table.fallback_title();
        }
        if workbook.contains(&name) {
            warn!(sheet = %name, "replacing earlier table with the same sheet name");
        }
        workbook.insert(name, table);
    }
    workbook
}

/// Prepends the metadata columns and drops rows without any data.
///
/// A row is kept when at least one cell after the metadata columns is neither
/// missing nor blank, so a table without data columns loses all of its rows.
pub fn tag_table(table: &mut Table, tags: &Tags) {
    for (index, (name, value)) in TAG_COLUMNS.iter().zip(tags.values()).enumerate() {
        table.insert_column(index, name, Value::from(value));
    }
    let data_start = TAG_COLUMNS.len();
    table.retain_rows(|row| row[data_start..].iter().any(|value| !value.is_blank()));
}

/// Reads an HTML report and writes its tables to a workbook.
///
/// # Arguments
/// * `input` - Path of the HTML report
/// * `assay_type` - Value of the `assayType` column
/// * `source` - Value of the `source` column
/// * `output` - Destination workbook; defaults to [`default_output`]
///
/// # Returns
/// Path of the written workbook
pub fn extract_file(
    input: &Path,
    assay_type: &str,
    source: &str,
    output: Option<&Path>,
) -> Result<PathBuf, ReportError> {
    let html = std::fs::read_to_string(input)
        .map_err(ReportError::from)
        .with_prefix(&format!("Read report '{}'", input.display()))?;
    let workbook = extract_document(&html, assay_type, source);
    let output = output.map(Path::to_path_buf).unwrap_or_else(|| default_output(input));
    workbook.write(&output)?;
    for (name, table) in workbook.iter() {
        info!(sheet = name, rows = table.height(), "wrote sheet");
    }
    info!(output = %output.display(), sheets = workbook.len(), "extracted report");
    Ok(output)
}

/// `<input-basename>.xlsx` in the working directory.
pub fn default_output(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.file_stem().unwrap_or_default());
    name.push(".");
    name.push(WORKBOOK_EXTENSION);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> Tags {
        Tags {
            source: "LabX".to_owned(),
            assay_type: "RNAseq".to_owned(),
            run_name: "RUN1".to_owned(),
            pipeline_version: "v1.0".to_owned(),
        }
    }

    #[test]
    fn tagging_prepends_columns_and_drops_blank_rows() {
        let mut table = Table::new(
            vec!["sample".to_owned(), "reads".to_owned()],
            vec![
                vec![Value::from("S1"), Value::Number(10.0)],
                vec![Value::from("  "), Value::Empty],
            ],
        );
        tag_table(&mut table, &tags());

        assert_eq!(table.columns()[..4], TAG_COLUMNS.map(str::to_owned));
        assert_eq!(table.height(), 1);
        assert_eq!(
            table.rows()[0][..4],
            [Value::from("LabX"), Value::from("RNAseq"), Value::from("RUN1"), Value::from("v1.0")]
        );
    }

    #[test]
    fn tagging_renames_clashing_data_column() {
        let mut table = Table::new(vec!["source".to_owned()], vec![vec![Value::from("lane 1")]]);
        tag_table(&mut table, &tags());
        let expected = ["source", "assayType", "runName", "pipelineVersion", "source.1"];
        assert_eq!(table.columns(), expected.map(str::to_owned).as_slice());
        assert_eq!(table.rows()[0][4], Value::from("lane 1"));
    }

    #[test]
    fn table_without_data_columns_is_emptied() {
        let mut table = Table::new(Vec::new(), vec![Vec::new(), Vec::new()]);
        tag_table(&mut table, &tags());
        assert_eq!(table.width(), 4);
        assert_eq!(table.height(), 0);
    }

    #[test]
    fn document_without_tables() {
        let workbook = extract_document("<html><body><p>nothing</p></body></html>", "a", "b");
        assert!(workbook.is_empty());
    }

    #[test]
    fn empty_heading_falls_back_to_position() {
        let workbook = extract_document("<h3> </h3><table><tr><td>1</td></tr></table>", "a", "b");
        assert_eq!(workbook.names(), vec!["Table_1"]);
    }

    #[test]
    fn duplicate_titles_keep_last_table() {
        let workbook = extract_document(
            "<h3>Stats</h3><table><tr><th>v</th></tr><tr><td>1</td></tr></table>\
             <table><tr><th>v</th></tr><tr><td>2</td></tr></table>",
            "a",
            "b",
        );
        assert_eq!(workbook.names(), vec!["Stats"]);
        assert_eq!(workbook.get("Stats").unwrap().rows()[0][4], Value::Number(2.0));
    }

    #[test]
    fn titles_differing_in_case_keep_last_table() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("report.html");
        std::fs::write(
            &input,
            "<h3>Summary</h3><table><tr><th>v</th></tr><tr><td>1</td></tr></table>\
             <h3>SUMMARY</h3><table><tr><th>v</th></tr><tr><td>2</td></tr></table>",
        )
        .unwrap();
        let output = dir.path().join("report.xlsx");

        extract_file(&input, "a", "b", Some(&output)).unwrap();

        let workbook = Workbook::read(&output).unwrap();
        assert_eq!(workbook.names(), vec!["SUMMARY"]);
        assert_eq!(workbook.get("Summary").unwrap().rows()[0][4], Value::Number(2.0));
    }

    #[test]
    fn default_output_uses_file_stem() {
        assert_eq!(default_output(Path::new("/reports/run.v2.html")), PathBuf::from("run.v2.xlsx"));
        assert_eq!(default_output(Path::new("summary")), PathBuf::from("summary.xlsx"));
    }
}
