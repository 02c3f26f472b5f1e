//! KeyIndex: per-table key cache
//!
//! Built once per dataset by visiting every row and every eligible column
//! exactly once. Keys never change afterwards; a content change requires an
//! explicit rebuild through the controller.

use crate::dataset::{Dataset, RowId};
use crate::key::Key;
use crate::normalize::KeyNormalizer;

/// Keys stored column-major: sorting and filtering scan one column at a time
#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
    /// `None` for ineligible columns
    columns: Vec<Option<Vec<Key>>>,
    row_count: usize,
}

impl KeyIndex {
    /// Build keys for every eligible column.
    ///
    /// A column is ineligible when its header is marked unsortable or its
    /// label normalizes to the empty key. Missing cells in short rows get the
    /// empty key.
    pub fn build(dataset: &Dataset, normalizer: &KeyNormalizer) -> Self {
        let row_count = dataset.row_count();
        let columns = dataset
            .columns()
            .iter()
            .enumerate()
            .map(|(col, column)| {
                if !column.sortable || normalizer.normalize(&column.label).is_empty() {
                    return None;
                }
                let keys = dataset
                    .rows()
                    .iter()
                    .map(|row| match row.cells.get(col) {
                        Some(cell) => normalizer.normalize_cell(&cell.text, cell.sort_key.as_deref()),
                        None => Key::empty(),
                    })
                    .collect();
                Some(keys)
            })
            .collect();

        Self { columns, row_count }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_eligible(&self, col: usize) -> bool {
        matches!(self.columns.get(col), Some(Some(_)))
    }

    /// Eligible column indices, ascending
    pub fn eligible_columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(col, keys)| keys.as_ref().map(|_| col))
    }

    /// All keys of one column, indexed by row id
    pub fn column(&self, col: usize) -> Option<&[Key]> {
        self.columns.get(col).and_then(|keys| keys.as_deref())
    }

    pub fn key(&self, row: RowId, col: usize) -> Option<&Key> {
        self.column(col).and_then(|keys| keys.get(row))
    }
}
