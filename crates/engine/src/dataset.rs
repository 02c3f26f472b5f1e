//! Dataset: the snapshot of a table taken at build time
//!
//! Rows are stored arena-style and referenced by their original position
//! (`RowId`). The engine never adds or removes rows; it only reorders and
//! hides them through `RowView`.

use serde::{Deserialize, Serialize};

/// Stable row identifier: the row's position in the source table body
pub type RowId = usize;

/// One cell: displayed text plus an optional literal sort value
/// (the `sort` / `data-sort` attribute of the source markup)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), sort_key: None }
    }

    pub fn with_sort_key(text: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self { text: text.into(), sort_key: Some(sort_key.into()) }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::new(text)
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::new(text)
    }
}

/// Header cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub label: String,
    /// False when the header carries the "do not index" marker
    /// (`nosort` / `unsort` class in HTML sources)
    pub sortable: bool,
}

impl Column {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), sortable: true }
    }

    pub fn unsortable(label: impl Into<String>) -> Self {
        Self { label: label.into(), sortable: false }
    }
}

/// Table as handed over by the presentation layer.
///
/// `header` is optional: a source without one gets its first row promoted
/// to header at build time.
#[derive(Debug, Clone, Default)]
pub struct TableSource {
    pub header: Option<Vec<Column>>,
    pub rows: Vec<Vec<Cell>>,
}

impl TableSource {
    pub fn new(header: Vec<Column>, rows: Vec<Vec<Cell>>) -> Self {
        Self { header: Some(header), rows }
    }

    /// Source without a header section
    pub fn headless(rows: Vec<Vec<Cell>>) -> Self {
        Self { header: None, rows }
    }

    /// Row count of the whole table, header included
    pub fn table_rows(&self) -> usize {
        self.rows.len() + usize::from(self.header.is_some())
    }
}

/// Body row
#[derive(Debug, Clone)]
pub struct Row {
    pub id: RowId,
    pub cells: Vec<Cell>,
}

/// Indexed table contents: header columns plus body rows
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Take ownership of a source, promoting the first row to header when
    /// the source has none. Returns `None` for a source with no rows at all.
    pub fn from_source(source: TableSource) -> Option<Self> {
        let TableSource { header, mut rows } = source;
        let columns = match header {
            Some(columns) => columns,
            None => {
                if rows.is_empty() {
                    return None;
                }
                rows.remove(0).into_iter().map(|cell| Column::new(cell.text)).collect()
            }
        };

        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(id, cells)| Row { id, cells })
            .collect();

        Some(Self { columns, rows })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.get(id)
    }

    /// Cell at (row, col); `None` for short rows
    pub fn cell(&self, id: RowId, col: usize) -> Option<&Cell> {
        self.rows.get(id).and_then(|r| r.cells.get(col))
    }
}
