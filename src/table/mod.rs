//! # Table Module
//!
//! A strongly typed, row-oriented table: an ordered list of unique column names and rows of
//! [`Value`] cells, every row exactly as wide as the column list. Column alignment between
//! tables is explicit: [`Table::reindex`] projects a table onto a column list, and
//! [`Table::append`] unions the columns of two tables before concatenating their rows.
mod value;

pub use value::Value;

use std::collections::HashMap;
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised by column lookups on a table.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Column '{0}' not found")]
    ColumnNotFound(String),
}

/// Row-structured table with named columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// Makes column names unique the way dataframe readers do.
///
/// An empty name at position `i` becomes `Unnamed: i`; a repeated name `x` becomes `x.1`,
/// `x.2`, ... skipping any suffix that is already taken.
pub(crate) fn unique_columns<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let names: Vec<String> = names
        .into_iter()
        .enumerate()
        .map(|(index, name)| if name.is_empty() { format!("Unnamed: {index}") } else { name })
        .collect();
    let mut taken: HashSet<String> = HashSet::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let mut candidate = name.clone();
        while taken.contains(&candidate) {
            let count = counts.entry(name.clone()).or_insert(0);
            *count += 1;
            candidate = format!("{}.{}", name, count);
        }
        taken.insert(candidate.clone());
        columns.push(candidate);
    }
    columns
}

impl Table {
    /// Creates a table, making column names unique and fitting every row to the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let columns = unique_columns(columns);
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Empty);
                row
            })
            .collect();
        Table { columns, rows }
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows in order.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of data rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Result<Vec<&Value>, TableError> {
        let index = self
            .column_index(name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_owned()))?;
        Ok(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// Inserts a column holding `value` on every row at position `index`.
    ///
    /// If a column with the same name already exists, the existing one is renamed with the
    /// next free `.N` suffix so the inserted column keeps the requested name.
    pub fn insert_column(&mut self, index: usize, name: &str, value: Value) {
        if let Some(existing) = self.column_index(name) {
            let mut suffix = 1usize;
            let mut renamed = format!("{}.{}", name, suffix);
            while self.column_index(&renamed).is_some() {
                suffix += 1;
                renamed = format!("{}.{}", name, suffix);
            }
            self.columns[existing] = renamed;
        }
        let index = index.min(self.columns.len());
        self.columns.insert(index, name.to_owned());
        for row in &mut self.rows {
            row.insert(index, value.clone());
        }
    }

    /// Keeps only the rows for which the predicate returns true.
    pub fn retain_rows<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&[Value]) -> bool,
    {
        self.rows.retain(|row| predicate(row));
    }

    /// Projects the table onto `columns`: known columns keep their values, unknown ones are
    /// filled with `Empty`, and columns not listed are dropped.
    pub fn reindex(&mut self, columns: &[String]) {
        let positions: Vec<Option<usize>> = columns
            .iter()
            .map(|column| self.column_index(column))
            .collect();
        self.rows = self
            .rows
            .drain(..)
            .map(|mut row| {
                positions
                    .iter()
                    .map(|position| match position {
                        Some(index) => std::mem::take(&mut row[*index]),
                        None => Value::Empty,
                    })
                    .collect()
            })
            .collect();
        self.columns = columns.to_vec();
    }

    /// Column list made of this table's columns followed by any of `other` not yet present.
    pub fn union_columns(&self, other: &[String]) -> Vec<String> {
        let mut columns = self.columns.clone();
        for column in other {
            if !columns.contains(column) {
                columns.push(column.to_owned());
            }
        }
        columns
    }

    /// Appends the rows of `other` after this table's rows, aligning both tables on the
    /// union of their columns first.
    pub fn append(&mut self, mut other: Table) {
        let columns = self.union_columns(&other.columns);
        self.reindex(&columns);
        other.reindex(&columns);
        self.rows.append(&mut other.rows);
    }

    /// Removes duplicate rows, keeping the first occurrence.
    ///
    /// Rows are compared on the `subset` columns when given, on every column otherwise.
    /// Returns the number of removed rows.
    pub fn dedupe(&mut self, subset: Option<&[String]>) -> Result<usize, TableError> {
        let indexes: Vec<usize> = match subset {
            Some(names) => names
                .iter()
                .map(|name| {
                    self.column_index(name)
                        .ok_or_else(|| TableError::ColumnNotFound(name.to_owned()))
                })
                .collect::<Result<_, _>>()?,
            None => (0..self.columns.len()).collect(),
        };
        let before = self.rows.len();
        let mut seen: HashSet<Vec<Value>> = HashSet::with_capacity(before);
        self.rows.retain(|row| {
            let key: Vec<Value> = indexes.iter().map(|index| row[*index].clone()).collect();
            seen.insert(key)
        });
        Ok(before - self.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|column| column.to_string()).collect()
    }

    fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        Table::new(names(columns), rows)
    }

    #[test]
    fn unique_column_names() {
        let columns = unique_columns(names(&["a", "", "a", "a.1", "a"]));
        assert_eq!(columns, names(&["a", "Unnamed: 1", "a.1", "a.1.1", "a.2"]));
    }

    #[test]
    fn rows_are_padded_to_width() {
        let table = table(&["a", "b"], vec![vec!["x".into()]]);
        assert_eq!(table.rows()[0], vec![Value::from("x"), Value::Empty]);
    }

    #[test]
    fn insert_column_renames_existing() {
        let mut table = table(&["source", "v"], vec![vec!["old".into(), 1.0.into()]]);
        table.insert_column(0, "source", "LabX".into());
        assert_eq!(table.columns(), names(&["source", "source.1", "v"]).as_slice());
        assert_eq!(table.rows()[0][0], Value::from("LabX"));
        assert_eq!(table.rows()[0][1], Value::from("old"));
    }

    #[test]
    fn append_unions_disjoint_columns() {
        let mut left = table(&["a", "b"], vec![vec![1.0.into(), 2.0.into()]]);
        let right = table(
            &["c", "d"],
            vec![vec![3.0.into(), 4.0.into()], vec![5.0.into(), 6.0.into()]],
        );
        left.append(right);
        assert_eq!(left.columns(), names(&["a", "b", "c", "d"]).as_slice());
        assert_eq!(left.height(), 3);
        assert_eq!(left.rows()[0][2], Value::Empty);
        assert_eq!(left.rows()[1][0], Value::Empty);
        assert_eq!(left.rows()[2][3], Value::Number(6.0));
    }

    #[test]
    fn append_keeps_existing_column_order() {
        let mut left = table(&["b", "a"], vec![vec!["b1".into(), "a1".into()]]);
        let right = table(&["a", "c", "b"], vec![vec!["a2".into(), "c2".into(), "b2".into()]]);
        left.append(right);
        assert_eq!(left.columns(), names(&["b", "a", "c"]).as_slice());
        assert_eq!(left.rows()[1], vec![Value::from("b2"), Value::from("a2"), Value::from("c2")]);
    }

    #[test]
    fn dedupe_on_subset_keeps_first() {
        let mut table = table(
            &["id", "name"],
            vec![
                vec![42.0.into(), "first".into()],
                vec![7.0.into(), "other".into()],
                vec![42.0.into(), "second".into()],
            ],
        );
        let removed = table.dedupe(Some(&names(&["id"]))).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(table.height(), 2);
        assert_eq!(table.rows()[0][1], Value::from("first"));
    }

    #[test]
    fn dedupe_on_all_columns_treats_empty_as_equal() {
        let mut table = table(
            &["a", "b"],
            vec![
                vec!["x".into(), Value::Empty],
                vec!["x".into(), Value::Empty],
                vec!["x".into(), "y".into()],
            ],
        );
        assert_eq!(table.dedupe(None).unwrap(), 1);
        assert_eq!(table.height(), 2);
    }

    #[test]
    fn dedupe_unknown_column_fails() {
        let mut table = table(&["a"], vec![]);
        assert!(matches!(
            table.dedupe(Some(&names(&["id"]))),
            Err(TableError::ColumnNotFound(name)) if name == "id"
        ));
    }
}
