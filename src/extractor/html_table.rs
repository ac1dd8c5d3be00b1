//! Conversion of HTML `<table>` elements into [`Table`]s.
//!
//! Rows follow dataframe `read_html` rules: spanned cells are repeated into every
//! covered position, `<thead>` rows (or leading all-`<th>` rows) form the header,
//! the usual NA literals become empty cells and columns whose cells all parse as
//! numbers or booleans are converted.

use crate::table::Table;
use crate::table::Value;
use scraper::ElementRef;
use scraper::Html;
use scraper::Selector;
use std::collections::VecDeque;

/// Largest `colspan` honoured by HTML parsers
const MAX_COLSPAN: usize = 1000;
/// Largest `rowspan` honoured by HTML parsers
const MAX_ROWSPAN: usize = 65534;

/// Cell texts read as missing values
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];
const TRUE_VALUES: &[&str] = &["True", "TRUE", "true"];
const FALSE_VALUES: &[&str] = &["False", "FALSE", "false"];

/// A `<table>` element together with the last `<h3>` that starts before it.
pub(crate) struct HtmlTable<'a> {
    /// Zero-based position among all tables of the document
    pub(crate) index: usize,
    element: ElementRef<'a>,
    heading: Option<ElementRef<'a>>,
}

/// Lists every `<table>` of the document in document order, nested ones included.
pub(crate) fn find_tables(document: &Html) -> Vec<HtmlTable<'_>> {
    let mut heading = None;
    let mut tables = Vec::new();
    for element in document.root_element().descendants().filter_map(ElementRef::wrap) {
        match element.value().name() {
            "h3" => heading = Some(element),
            "table" => {
                let index = tables.len();
                tables.push(HtmlTable { index, element, heading });
            }
            _ => (),
        }
    }
    tables
}

impl<'a> HtmlTable<'a> {
    /// Sheet title: the preceding `<h3>`, else the first `<caption>`, else `Table_{n}`.
    pub(crate) fn title(&self) -> String {
        if let Some(heading) = self.heading {
            return stripped_text(heading);
        }
        let caption = Selector::parse("caption").expect("Hardcode selector");
        match self.element.select(&caption).next() {
            Some(caption) => stripped_text(caption),
            None => self.fallback_title(),
        }
    }

    /// Title used when nothing in the document names the table.
    pub(crate) fn fallback_title(&self) -> String {
        format!("Table_{}", self.index + 1)
    }

    /// Parses the table rows; `None` when the table has no cells at all.
    pub(crate) fn parse(&self) -> Option<Table> {
        let mut header_rows = Vec::new();
        let mut body_rows = Vec::new();
        let mut footer_rows = Vec::new();
        for child in self.element.children().filter_map(ElementRef::wrap) {
            match child.value().name() {
                "thead" => header_rows.extend(section_rows(child)),
                "tbody" => body_rows.extend(section_rows(child)),
                "tfoot" => footer_rows.extend(section_rows(child)),
                "tr" => body_rows.push(child),
                _ => (),
            }
        }
        if header_rows.is_empty() {
            let count = body_rows.iter().take_while(|row| is_header_row(**row)).count();
            header_rows = body_rows.drain(..count).collect();
        }

        let header = expand_spans(&header_rows);
        let mut body = expand_spans(&body_rows);
        body.extend(expand_spans(&footer_rows));

        let width = header.iter().chain(body.iter()).map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return None;
        }
        let columns = if header.is_empty() {
            (0..width).map(|col| col.to_string()).collect()
        } else {
            (0..width).map(|col| header_name(&header, col)).collect()
        };
        Some(Table::new(columns, convert_rows(body, width)))
    }
}

/// Concatenates the trimmed text nodes of an element.
fn stripped_text(element: ElementRef) -> String {
    element.text().map(str::trim).collect()
}

fn section_rows<'a>(section: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    section
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "tr")
}

fn row_cells<'a>(row: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| matches!(child.value().name(), "td" | "th"))
}

fn is_header_row(row: ElementRef) -> bool {
    row_cells(row).all(|cell| cell.value().name() == "th")
}

fn span(cell: ElementRef, name: &str, limit: usize) -> usize {
    cell.value()
        .attr(name)
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(1)
        .min(limit)
}

/// A cell that still covers rows below the one it was declared in.
struct PendingCell {
    col: usize,
    text: String,
    rows_left: usize,
}

impl PendingCell {
    /// Emits the text into the current row and keeps the cell for the next row if needed.
    fn emit(self, texts: &mut Vec<String>, next: &mut VecDeque<PendingCell>) {
        if self.rows_left > 1 {
            next.push_back(PendingCell {
                col: self.col,
                text: self.text.clone(),
                rows_left: self.rows_left - 1,
            });
        }
        texts.push(self.text);
    }
}

/// Expands `colspan` and `rowspan` of a group of rows into a ragged text grid.
fn expand_spans(rows: &[ElementRef]) -> Vec<Vec<String>> {
    let mut grid = Vec::with_capacity(rows.len());
    let mut pending = VecDeque::<PendingCell>::new();
    for row in rows {
        let mut texts = Vec::new();
        let mut next = VecDeque::new();
        let mut col = 0usize;
        for cell in row_cells(*row) {
            while pending.front().is_some_and(|above| above.col <= col) {
                if let Some(above) = pending.pop_front() {
                    above.emit(&mut texts, &mut next);
                    col += 1;
                }
            }
            let text = collapse_whitespace(&cell.text().collect::<String>());
            let rows_left = span(cell, "rowspan", MAX_ROWSPAN);
            for _ in 0..span(cell, "colspan", MAX_COLSPAN) {
                PendingCell { col, text: text.clone(), rows_left }.emit(&mut texts, &mut next);
                col += 1;
            }
        }
        for above in pending.drain(..) {
            above.emit(&mut texts, &mut next);
        }
        grid.push(texts);
        pending = next;
    }

    // Rows that only exist because of a rowspan reaching past the last row
    while !pending.is_empty() {
        let mut texts = Vec::new();
        let mut next = VecDeque::new();
        for above in pending.drain(..) {
            above.emit(&mut texts, &mut next);
        }
        grid.push(texts);
        pending = next;
    }
    grid
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Joins the distinct non-empty header texts of a column with a space.
fn header_name(header: &[Vec<String>], col: usize) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for text in header.iter().filter_map(|row| row.get(col)) {
        if !text.is_empty() && !parts.contains(&text.as_str()) {
            parts.push(text);
        }
    }
    parts.join(" ")
}

/// Data type shared by every non-missing cell of a column.
#[derive(Copy, Clone, Debug, PartialEq)]
enum ColumnKind {
    Bool,
    Number,
    Text,
}

impl ColumnKind {
    fn infer<'t>(cells: impl Iterator<Item = &'t str>) -> Self {
        let mut is_bool = true;
        let mut is_number = true;
        let mut is_empty = true;
        for cell in cells {
            is_empty = false;
            is_bool &= parse_bool(cell).is_some();
            is_number &= parse_number(cell).is_some();
        }
        match (is_empty, is_bool, is_number) {
            (true, _, _) => Self::Text,
            (false, true, _) => Self::Bool,
            (false, false, true) => Self::Number,
            _ => Self::Text,
        }
    }

    fn convert(self, cell: Option<String>) -> Value {
        let Some(text) = cell else {
            return Value::Empty;
        };
        let value = match self {
            Self::Bool => parse_bool(&text).map(Value::Bool),
            Self::Number => parse_number(&text).map(Value::Number),
            Self::Text => None,
        };
        value.unwrap_or(Value::Text(text))
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    if TRUE_VALUES.contains(&text) {
        Some(true)
    } else if FALSE_VALUES.contains(&text) {
        Some(false)
    } else {
        None
    }
}

/// Parses a number, ignoring `,` thousands separators.
fn parse_number(text: &str) -> Option<f64> {
    text.replace(',', "").parse::<f64>().ok()
}

fn convert_rows(body: Vec<Vec<String>>, width: usize) -> Vec<Vec<Value>> {
    let grid: Vec<Vec<Option<String>>> = body
        .into_iter()
        .map(|row| {
            let mut cells: Vec<Option<String>> = row
                .into_iter()
                .map(|text| Some(text).filter(|text| !NA_VALUES.contains(&text.as_str())))
                .collect();
            cells.resize(width, None);
            cells
        })
        .collect();
    let kinds: Vec<ColumnKind> = (0..width)
        .map(|col| ColumnKind::infer(grid.iter().filter_map(|row| row[col].as_deref())))
        .collect();
    grid.into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&kinds)
                .map(|(cell, kind)| kind.convert(cell))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_first(html: &str) -> Option<Table> {
        let document = Html::parse_document(html);
        let tables = find_tables(&document);
        tables.first().and_then(HtmlTable::parse)
    }

    fn columns(table: &Table) -> Vec<&str> {
        table.columns().iter().map(String::as_str).collect()
    }

    #[test]
    fn header_from_th_row_and_numeric_columns() {
        let table = parse_first(
            "<table><tr><th>Sample</th><th>Reads</th></tr>\
             <tr><td> S1 </td><td>1,200</td></tr>\
             <tr><td>S2</td><td>NA</td></tr></table>",
        )
        .unwrap();
        assert_eq!(columns(&table), vec!["Sample", "Reads"]);
        assert_eq!(table.rows()[0], vec![Value::from("S1"), Value::Number(1200.0)]);
        assert_eq!(table.rows()[1], vec![Value::from("S2"), Value::Empty]);
    }

    #[test]
    fn headerless_table_uses_positions() {
        let html = "<table><tr><td>a</td><td>1</td></tr><tr><td>b</td></tr></table>";
        let table = parse_first(html).unwrap();
        assert_eq!(columns(&table), vec!["0", "1"]);
        assert_eq!(table.rows()[1], vec![Value::from("b"), Value::Empty]);
    }

    #[test]
    fn mixed_column_stays_text() {
        let table = parse_first(
            "<table><thead><tr><td>v</td></tr></thead><tbody><tr><td>1</td></tr><tr><td>x</td></tr></tbody></table>",
        )
        .unwrap();
        assert_eq!(table.rows()[0], vec![Value::from("1")]);
        assert_eq!(table.rows()[1], vec![Value::from("x")]);
    }

    #[test]
    fn spans_are_expanded() {
        let table = parse_first(
            "<table>\
             <tr><th colspan=\"2\">Group</th><th rowspan=\"2\">Total</th></tr>\
             <tr><th>a</th><th>b</th></tr>\
             <tr><td rowspan=\"2\">x</td><td>1</td><td>2</td></tr>\
             <tr><td>3</td><td>4</td></tr></table>",
        )
        .unwrap();
        assert_eq!(columns(&table), vec!["Group a", "Group b", "Total"]);
        assert_eq!(table.height(), 2);
        assert_eq!(table.rows()[1], vec![Value::from("x"), Value::Number(3.0), Value::Number(4.0)]);
    }

    #[test]
    fn boolean_columns() {
        let html = "<table><tr><th>ok</th></tr><tr><td>True</td></tr><tr><td>false</td></tr></table>";
        let table = parse_first(html).unwrap();
        assert_eq!(table.rows()[0], vec![Value::Bool(true)]);
        assert_eq!(table.rows()[1], vec![Value::Bool(false)]);
    }

    #[test]
    fn nested_table_rows_stay_with_their_table() {
        let document = Html::parse_document(
            "<table><tr><th>outer</th></tr><tr><td>\
             <table><tr><th>inner</th></tr><tr><td>1</td></tr></table>\
             </td></tr></table>",
        );
        let tables = find_tables(&document);
        assert_eq!(tables.len(), 2);
        let outer = tables[0].parse().unwrap();
        assert_eq!(outer.height(), 1);
        assert_eq!(outer.rows()[0], vec![Value::from("inner1")]);
        let inner = tables[1].parse().unwrap();
        assert_eq!(columns(&inner), vec!["inner"]);
    }

    #[test]
    fn empty_table_is_not_parsed() {
        assert!(parse_first("<table></table>").is_none());
    }

    #[test]
    fn titles() {
        let document = Html::parse_document(
            "<h3> Quality <b>Metrics</b></h3><table><tr><td>1</td></tr></table>\
             <table><caption>Ignored</caption><tr><td>2</td></tr></table>",
        );
        let tables = find_tables(&document);
        assert_eq!(tables[0].title(), "QualityMetrics");
        assert_eq!(tables[1].title(), "QualityMetrics");

        let document = Html::parse_document(
            "<table><caption> Lanes </caption><tr><td>1</td></tr></table><table><tr><td>2</td></tr></table>",
        );
        let tables = find_tables(&document);
        assert_eq!(tables[0].title(), "Lanes");
        assert_eq!(tables[1].title(), "Table_2");
    }
}
