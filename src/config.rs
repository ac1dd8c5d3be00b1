//! Default literals and options shared by the extractor and the merger.

/// Assay type tag used when the caller does not supply one.
pub const DEFAULT_ASSAY_TYPE: &str = "UnknownAssay";

/// Source tag used when the caller does not supply one.
pub const DEFAULT_SOURCE: &str = "UnknownSource";

/// Run name used when no `<script>` in the report assigns `run_name`.
pub const DEFAULT_RUN_NAME: &str = "UnknownRunName";

/// Pipeline version used when no text node mentions a pipeline version.
pub const DEFAULT_PIPELINE_VERSION: &str = "UnknownVersion";

/// Maximum length of a worksheet name accepted by Excel.
pub const SHEET_NAME_LIMIT: usize = 31;

/// Prefix of the default merge output file name.
pub const MERGED_PREFIX: &str = "merged_";

/// Output file written by the batch merge.
pub const BATCH_OUTPUT: &str = "merged_results.xlsx";

/// Glob pattern used to discover workbooks for the batch merge.
pub const BATCH_PATTERN: &str = "*.xlsx";

/// Minimum number of workbooks the batch merge needs.
pub const BATCH_MINIMUM: usize = 2;

/// Extension of the workbooks written by the extractor.
pub const WORKBOOK_EXTENSION: &str = "xlsx";

/// Names of the metadata columns prepended to every extracted table, in order.
pub const TAG_COLUMNS: [&str; 4] = ["source", "assayType", "runName", "pipelineVersion"];

/// Options controlling how secondary workbooks are folded into the master.
#[derive(Clone, Debug)]
pub struct MergeOptions {
    /// Copy sheets that only exist in a secondary workbook.
    pub copy_new_sheets: bool,
    /// Drop duplicate rows of merged sheets, keeping the first occurrence.
    pub dedupe: bool,
    /// Columns compared when deduplicating; all columns when `None`.
    pub dedupe_subset: Option<Vec<String>>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        MergeOptions {
            copy_new_sheets: true,
            dedupe: false,
            dedupe_subset: None,
        }
    }
}
