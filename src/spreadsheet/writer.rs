//! `.xlsx` output through `rust_xlsxwriter`.

use crate::error::ReportError;
use crate::error::ResultMessage;
use crate::spreadsheet::SpreadsheetError;
use crate::spreadsheet::Workbook;
use crate::table::Table;
use crate::table::Value;
use rust_xlsxwriter::ColNum;
use rust_xlsxwriter::Format;
use rust_xlsxwriter::FormatAlign;
use rust_xlsxwriter::FormatBorder;
use rust_xlsxwriter::RowNum;
use rust_xlsxwriter::Worksheet;
use std::path::Path;

/// Number format applied to date/time cells
const DATE_TIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Writes every sheet of the workbook in order, header in row 1 and no index column.
///
/// A workbook without sheets still produces a valid file: the package format needs
/// one worksheet, so a blank default sheet is emitted.
pub(super) fn write_workbook(workbook: &Workbook, path: &Path) -> Result<(), ReportError> {
    let header_format = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center);
    let date_time_format = Format::new().set_num_format(DATE_TIME_FORMAT);

    let mut output = rust_xlsxwriter::Workbook::new();
    for (name, table) in workbook.iter() {
        let worksheet = output.add_worksheet();
        worksheet
            .set_name(name)
            .map_err(ReportError::from)
            .and_then(|sheet| write_table(sheet, name, table, &header_format, &date_time_format))
            .with_prefix(&format!("Sheet '{}'", name))?;
    }
    output.save(path)?;
    Ok(())
}

fn write_table(
    worksheet: &mut Worksheet,
    name: &str,
    table: &Table,
    header_format: &Format,
    date_time_format: &Format,
) -> Result<(), ReportError> {
    let too_large = || SpreadsheetError::SheetTooLarge(name.to_owned());
    for (col, column) in table.columns().iter().enumerate() {
        let col = ColNum::try_from(col).map_err(|_| too_large())?;
        worksheet.write_string_with_format(0, col, column, header_format)?;
    }

    for (index, values) in table.rows().iter().enumerate() {
        let row = index
            .checked_add(1)
            .and_then(|row| RowNum::try_from(row).ok())
            .ok_or_else(too_large)?;
        for (col, value) in values.iter().enumerate() {
            let col = ColNum::try_from(col).map_err(|_| too_large())?;
            match value {
                Value::Empty => {}
                Value::Text(text) => {
                    worksheet.write_string(row, col, text)?;
                }
                Value::Number(number) if number.is_finite() => {
                    worksheet.write_number(row, col, *number)?;
                }
                Value::Number(_) => {}
                Value::Bool(flag) => {
                    worksheet.write_boolean(row, col, *flag)?;
                }
                Value::DateTime(serial) => {
                    worksheet.write_number_with_format(row, col, *serial, date_time_format)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_sheet_name_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut workbook = Workbook::new();
        let lanes = Table::new(vec!["lane".to_owned()], vec![vec![Value::Number(1.0)]]);
        workbook.insert("Lanes", lanes);
        workbook.insert("QC: Summary", Table::new(vec!["v".to_owned()], Vec::new()));

        let error = write_workbook(&workbook, &dir.path().join("out.xlsx")).unwrap_err();
        assert!(error.to_string().starts_with("Sheet 'QC: Summary': "));
    }
}
