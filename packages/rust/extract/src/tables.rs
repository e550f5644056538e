//! Table extraction and the two-column "quick facts" convention.

use scraper::{ElementRef, Html, Selector};

use crate::text::element_text;

/// One table cell's text plus whether the source emphasized it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    /// The cell contained `<strong>`/`<b>` markup.
    pub emphasized: bool,
}

/// A table as a list of rows of cells. Rows with no cells are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Vec<Cell>>,
}

/// A label/value pair from a two-column table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactRow {
    pub label: String,
    pub value: String,
    /// Render with the highlight style: the value was bold or mentions "free".
    pub highlight: bool,
}

/// A two-column table: header labels plus data rows in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValueTable {
    pub header: (String, String),
    pub rows: Vec<FactRow>,
}

impl Table {
    /// Interpret the table as header + label/value rows.
    ///
    /// Returns `None` unless every row has exactly two cells and there is at
    /// least one row besides the header.
    pub fn two_column(&self) -> Option<KeyValueTable> {
        if self.rows.len() < 2 || self.rows.iter().any(|r| r.len() != 2) {
            return None;
        }

        let header = (self.rows[0][0].text.clone(), self.rows[0][1].text.clone());
        let rows = self.rows[1..]
            .iter()
            .map(|r| FactRow {
                label: r[0].text.clone(),
                value: r[1].text.clone(),
                highlight: r[1].emphasized || r[1].text.to_lowercase().contains("free"),
            })
            .collect();

        Some(KeyValueTable { header, rows })
    }
}

/// Extract every table in document order. Nested tables become their own entries
/// and their rows are not repeated in the outer table.
pub fn extract_tables(doc: &Html) -> Vec<Table> {
    let table_sel = Selector::parse("table").expect("valid selector");

    doc.select(&table_sel)
        .map(|table| read_table(&table))
        .filter(|t| !t.rows.is_empty())
        .collect()
}

fn read_table(table: &ElementRef) -> Table {
    let tr_sel = Selector::parse("tr").expect("valid selector");
    let bold_sel = Selector::parse("strong, b").expect("valid selector");

    let rows = table
        .select(&tr_sel)
        .filter(|tr| nearest_table(tr).is_some_and(|t| t.id() == table.id()))
        .map(|tr| {
            tr.children()
                .filter_map(ElementRef::wrap)
                .filter(|c| matches!(c.value().name(), "td" | "th"))
                .map(|cell| Cell {
                    text: element_text(&cell),
                    emphasized: cell.select(&bold_sel).next().is_some(),
                })
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect();

    Table { rows }
}

fn nearest_table<'a>(tr: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    tr.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "table")
}
