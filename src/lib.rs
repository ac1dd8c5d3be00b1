//! # Report Sheets
//!
//! Moves the tables of HTML analysis reports into spreadsheet workbooks and merges
//! such workbooks into one.
//!
//! ## Features
//!
//! - **Table extraction**: every `<table>` of a report becomes a sheet named after the
//!   `<h3>` heading or caption that introduces it
//! - **Run tagging**: rows carry the report source, assay type, run name and pipeline
//!   version scraped from the report
//! - **Workbook merging**: same-named sheets are concatenated on the union of their
//!   columns, with optional de-duplication
//! - **Pure Rust `.xlsx` reading**: streaming XML over the zip package, with shared
//!   strings, inline strings and date formats resolved
//!
//! ## Command-line tools
//!
//! - `extract <html> [assayType] [source]`: write `<html-basename>.xlsx`
//! - `merge [master secondary...]`: merge workbooks, or every `*.xlsx` of the working
//!   directory into `merged_results.xlsx` when no path is given

pub mod config;
pub mod error;
pub mod extractor;
mod helpers;
pub mod logging;
pub mod merger;
pub mod spreadsheet;
pub mod table;

pub use config::MergeOptions;
pub use error::ReportError;
pub use spreadsheet::Workbook;
pub use table::Table;
pub use table::Value;
