use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::SpreadsheetError;
use crate::table::Table;
use crate::table::Value;
use std::collections::BTreeMap;

/// Cells collected from one worksheet, before header detection.
pub(crate) struct Sheet {
    /// Sheet name
    pub(crate) name: String,
    /// All non-empty cells in the sheet
    pub(crate) cells: Vec<Cell>,
}

impl Sheet {
    /// Creates an empty sheet.
    pub(super) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            cells: Vec::new(),
        }
    }

    /// Adds a cell to the sheet.
    pub(super) fn push(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    /// Converts the sheet into a table.
    ///
    /// The first non-empty row gives the column names; every later row that holds at least
    /// one value becomes a data row. Columns always start at column `A` and extend to the
    /// rightmost used column, so leading blank columns show up as `Unnamed: N`.
    pub(crate) fn into_table(self, shared_strings: &[String]) -> Result<Table, SpreadsheetError> {
        let mut grid: BTreeMap<usize, Vec<(usize, Value)>> = BTreeMap::new();
        let mut col_upper_bound = None::<usize>;
        for cell in &self.cells {
            let value = cell.to_value(shared_strings)?;
            if matches!(value, Value::Empty) {
                continue;
            }
            col_upper_bound = Some(col_upper_bound.map_or(cell.col, |upper| upper.max(cell.col)));
            grid.entry(cell.row).or_default().push((cell.col, value));
        }

        let Some(col_upper_bound) = col_upper_bound else {
            return Ok(Table::default());
        };
        let width = col_upper_bound + 1;
        let mut rows = grid.into_values().map(|cells| {
            let mut row = vec![Value::Empty; width];
            for (col, value) in cells {
                row[col] = value;
            }
            row
        });

        let header = rows
            .next()
            .map(|row| row.iter().map(Value::to_string).collect())
            .unwrap_or_default();
        Ok(Table::new(header, rows.collect()))
    }
}
