//! Table location and row extraction over fetched pages.
//!
//! Tables are addressed by their 0-based position among all `<table>`
//! elements in document order, nested tables included. A row's cells are
//! its `<td>` descendants; rows with no `<td>` (headers, spacers) are not
//! data rows.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Page layout mismatch.
#[derive(Error, Debug)]
pub enum LocateError {
    #[error("no table at index {index} ({found} tables on page)")]
    TableNotFound { index: usize, found: usize },
    #[error("table {index} has no rows")]
    NoRows { index: usize },
    #[error("invalid selector {0:?}")]
    Selector(&'static str),
}

fn selector(css: &'static str) -> Result<Selector, LocateError> {
    Selector::parse(css).map_err(|_| LocateError::Selector(css))
}

/// A fetched page, parsed.
pub struct RawPage {
    url: String,
    document: Html,
}

impl RawPage {
    /// Parse a response body. Invalid UTF-8 is replaced rather than rejected.
    pub fn parse(url: &str, body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);
        Self {
            url: url.to_string(),
            document: Html::parse_document(&text),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Locate the table at `index` in document order.
    pub fn table(&self, index: usize) -> Result<TableRef<'_>, LocateError> {
        let tables = selector("table")?;
        let mut found = 0;

        for element in self.document.select(&tables) {
            if found == index {
                return Ok(TableRef { index, element });
            }
            found += 1;
        }

        Err(LocateError::TableNotFound { index, found })
    }
}

/// A located table.
#[derive(Clone, Copy)]
pub struct TableRef<'a> {
    index: usize,
    element: ElementRef<'a>,
}

/// One data row: its 1-based ordinal among data rows and its cell text.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub ordinal: usize,
    pub cells: Vec<String>,
}

impl<'a> TableRef<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    /// All `<tr>` elements of the table, data or not.
    pub fn rows(&self) -> Result<Vec<ElementRef<'a>>, LocateError> {
        let tr = selector("tr")?;
        let rows: Vec<_> = self.element.select(&tr).collect();

        if rows.is_empty() {
            return Err(LocateError::NoRows { index: self.index });
        }
        Ok(rows)
    }

    /// Data rows in document order, numbered from 1. Rows without cells are
    /// skipped and do not advance the ordinal.
    pub fn data_rows(&self) -> Result<Vec<Row>, LocateError> {
        let mut data = Vec::new();

        for row in self.rows()? {
            let cells = cells(row)?;
            if cells.is_empty() {
                continue;
            }
            data.push(Row {
                ordinal: data.len() + 1,
                cells,
            });
        }

        Ok(data)
    }
}

/// Text of each `<td>` in the row, with whitespace runs (line breaks
/// included) collapsed to single spaces and the ends trimmed.
pub fn cells(row: ElementRef<'_>) -> Result<Vec<String>, LocateError> {
    let td = selector("td")?;
    Ok(row
        .select(&td)
        .map(|cell| {
            let text: String = cell.text().collect();
            text.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .collect())
}
