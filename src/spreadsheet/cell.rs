use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::SpreadsheetError;
use crate::table::Value;

/// Days between the 1900 and 1904 date system epochs.
const DATE_1904_OFFSET: f64 = 1462.0;

/// Error literal read as a missing value.
const NOT_AVAILABLE: &str = "#N/A";

/// Types of cell data in `.xlsx` worksheets.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values (true/false)
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from the 1900 epoch
    NumberDateTime1900,
    /// Date/time values stored as numbers from the 1904 epoch
    NumberDateTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values
    Error,
}

impl CellType {
    /// Parses built-in Excel number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "14" | "15" | "16" | "17" | "18" | "19" | "20" | "21" | "22" | "45" | "46" | "47" => {
                Some(Self::date_time(is_1904))
            }
            _ => None,
        }
    }

    /// Parses custom number format strings to determine cell type.
    /// Analyzes format codes for date/time patterns outside literals and brackets.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_color = false;
        let mut is_date_time = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_color => is_literal = true,

                ']' if is_color => is_color = false,
                '[' if !is_literal => is_color = true,
                _ if is_literal || is_color => (),

                'Y' | 'y' | 'D' | 'd' | 'H' | 'h' | 'S' | 's' => is_date_time = true,
                _ => (),
            }
        }

        if is_date_time {
            Self::date_time(is_1904)
        } else {
            Self::Number
        }
    }

    fn date_time(is_1904: bool) -> Self {
        if is_1904 {
            Self::NumberDateTime1904
        } else {
            Self::NumberDateTime1900
        }
    }
}

/// A single non-empty cell read from a worksheet.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Raw cell value as stored in the worksheet
    pub(crate) value: String,
}

impl Cell {
    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Converts the raw cell content to a table value, resolving shared strings.
    pub(crate) fn to_value(&self, shared_strings: &[String]) -> Result<Value, SpreadsheetError> {
        let value = match self.kind {
            CellType::Empty => Value::Empty,
            CellType::Boolean => {
                Value::Bool(self.value == "1" || self.value.eq_ignore_ascii_case("true"))
            }
            CellType::Number => Value::Number(self.to_double()?),
            CellType::NumberDateTime1900 => Value::DateTime(self.to_double()?),
            CellType::NumberDateTime1904 => Value::DateTime(self.to_double()? + DATE_1904_OFFSET),
            CellType::IsoDateTime | CellType::InlineString => Value::Text(self.value.to_owned()),
            CellType::SharedString => {
                let text = self
                    .value
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| shared_strings.get(index))
                    .ok_or_else(|| self.invalid("unknown shared string"))?;
                Value::Text(text.to_owned())
            }
            CellType::Error if self.value == NOT_AVAILABLE => Value::Empty,
            CellType::Error => Value::Text(self.value.to_owned()),
        };
        Ok(match value {
            Value::Text(text) if text.is_empty() => Value::Empty,
            value => value,
        })
    }

    fn to_double(&self) -> Result<f64, SpreadsheetError> {
        self.value
            .trim()
            .parse::<f64>()
            .map_err(|error| self.invalid(&error.to_string()))
    }

    fn invalid(&self, message: &str) -> SpreadsheetError {
        SpreadsheetError::CellValueError(self.reference(), format!("'{}': {}", self.value, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell {
            row: 1,
            col: 2,
            kind,
            value: value.to_owned(),
        }
    }

    #[test]
    fn builtin_formats() {
        let builtin = CellType::parse_builtin_number_format_id;
        assert_eq!(builtin("14", false), Some(CellType::NumberDateTime1900));
        assert_eq!(builtin("22", true), Some(CellType::NumberDateTime1904));
        assert_eq!(builtin("2", false), None);
    }

    #[test]
    fn custom_formats() {
        let custom = CellType::parse_custom_number_format;
        assert_eq!(custom("yyyy-mm-dd hh:mm:ss", false), CellType::NumberDateTime1900);
        assert_eq!(custom("0.00\"days\"", false), CellType::Number);
        assert_eq!(custom("[Red]0.00", false), CellType::Number);
        assert_eq!(custom("#,##0_);(#,##0)", false), CellType::Number);
    }

    #[test]
    fn cell_values() {
        let strings = vec!["alpha".to_owned()];
        let value = |kind, text| cell(kind, text).to_value(&strings).unwrap();
        assert_eq!(value(CellType::SharedString, "0"), Value::from("alpha"));
        assert_eq!(value(CellType::Number, "1.5"), Value::Number(1.5));
        assert_eq!(value(CellType::Boolean, "1"), Value::Bool(true));
        assert_eq!(value(CellType::Error, "#N/A"), Value::Empty);
        assert_eq!(value(CellType::NumberDateTime1904, "0"), Value::DateTime(1462.0));
        assert_eq!(value(CellType::InlineString, ""), Value::Empty);
    }

    #[test]
    fn invalid_values_report_reference() {
        let error = cell(CellType::SharedString, "9").to_value(&[]).unwrap_err();
        assert!(error.to_string().contains("C2"));
        assert!(cell(CellType::Number, "abc").to_value(&[]).is_err());
    }
}
