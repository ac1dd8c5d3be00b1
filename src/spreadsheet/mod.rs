//! # Spreadsheet Module
//!
//! Workbook model plus the `.xlsx` reader and writer. A workbook is an ordered
//! mapping from sheet name to [`Table`]; reading keeps the sheet order of the file
//! and writing emits sheets in mapping order with the header in row 1.

pub(crate) mod cell;
pub(crate) mod excel;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod writer;
pub(crate) mod xlsx;

use crate::config::SHEET_NAME_LIMIT;
use crate::config::WORKBOOK_EXTENSION;
use crate::error::ReportError;
use crate::error::ResultMessage;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use crate::table::Table;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading or writing workbooks.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// A required part is missing from the workbook package
    #[error("Missing workbook part '{0}'")]
    FileError(String),

    /// The stored cell content does not match its declared type
    #[error("Invalid cell value at '{0}': {1}")]
    CellValueError(String, String),

    /// Only Office Open XML workbooks are read
    #[error("Cannot detect file format for '{0}'")]
    UnsupportedFormat(String),

    /// The table does not fit into a worksheet
    #[error("Sheet '{0}' exceeds the worksheet size limits")]
    SheetTooLarge(String),
}

/// Type alias for buffered file reader
pub(crate) type FileReader = BufReader<File>;

/// Common interface of workbook readers.
pub(crate) trait Spreadsheet {
    /// Returns the file name the spreadsheet was opened from.
    fn name(&self) -> String;

    /// Returns the sheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Reads every sheet into a table, in workbook order.
    fn read_sheets(&mut self) -> Result<Vec<(String, Table)>, ReportError>;
}

/// Opens a spreadsheet reader chosen by file extension.
///
/// # Arguments
/// * `path` - Path to the workbook file
///
/// # Returns
/// Boxed reader for the detected format
pub(crate) fn open_spreadsheet(path: &Path) -> Result<Box<dyn Spreadsheet>, ReportError> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_ascii_lowercase());
    match extension.as_deref() {
        Some(WORKBOOK_EXTENSION) | Some("xlsm") => Ok(Box::new(XlsxSpreadsheet::open(path)?)),
        _ => Err(SpreadsheetError::UnsupportedFormat(path.to_string_lossy().to_string()))?,
    }
}

/// Derives a worksheet name from a table title.
///
/// The title is cut to the first 31 characters, then every `/` and `\` is
/// replaced by `_`. Nothing else is changed.
pub fn sheet_name(title: &str) -> String {
    title
        .chars()
        .take(SHEET_NAME_LIMIT)
        .map(|char| if char == '/' || char == '\\' { '_' } else { char })
        .collect()
}

/// An ordered collection of named sheets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<(String, Table)>,
}

impl Workbook {
    /// Creates an empty workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every sheet of an `.xlsx` workbook.
    ///
    /// # Arguments
    /// * `path` - Path to the workbook file
    ///
    /// # Returns
    /// The workbook with sheets in file order, first row of each sheet as header
    pub fn read(path: &Path) -> Result<Self, ReportError> {
        let prefix = format!("Read workbook '{}'", path.display());
        let mut spreadsheet = open_spreadsheet(path).with_prefix(&prefix)?;
        tracing::debug!(
            file = %spreadsheet.name(),
            sheets = ?spreadsheet.sheet_names(),
            "reading workbook"
        );
        let sheets = spreadsheet.read_sheets().with_prefix(&prefix)?;
        Ok(Self { sheets })
    }

    /// Writes the workbook to an `.xlsx` file.
    pub fn write(&self, path: &Path) -> Result<(), ReportError> {
        let prefix = format!("Write workbook '{}'", path.display());
        writer::write_workbook(self, path).with_prefix(&prefix)
    }

    /// Stores a table under a name.
    ///
    /// Sheet names match case-insensitively, as in Excel. An existing sheet with
    /// the same name keeps its position and takes the new name and table;
    /// otherwise the sheet is appended.
    pub fn insert(&mut self, name: impl Into<String>, table: Table) {
        let name = name.into();
        match self.sheets.iter_mut().find(|(existing, _)| same_sheet(existing, &name)) {
            Some(sheet) => *sheet = (name, table),
            None => self.sheets.push((name, table)),
        }
    }

    /// Returns the table stored under a name, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.sheets
            .iter()
            .find(|(existing, _)| same_sheet(existing, name))
            .map(|(_, table)| table)
    }

    /// Returns the table stored under a name for modification.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.sheets
            .iter_mut()
            .find(|(existing, _)| same_sheet(existing, name))
            .map(|(_, table)| table)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Sheet names in workbook order.
    pub fn names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Iterates over `(name, table)` pairs in workbook order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.sheets.iter().map(|(name, table)| (name.as_str(), table))
    }
}

/// Excel rejects two sheet names differing only in case.
fn same_sheet(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}

impl IntoIterator for Workbook {
    type Item = (String, Table);
    type IntoIter = std::vec::IntoIter<(String, Table)>;

    fn into_iter(self) -> Self::IntoIter {
        self.sheets.into_iter()
    }
}
