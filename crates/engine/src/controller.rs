//! TableController: the presentation layer's only entry point
//!
//! States: `Unindexed` until `build` succeeds, then `Indexed` for the rest
//! of the controller's life (every sort/filter/paint is a self-loop).
//! Operations called before indexing are no-ops.

use crate::dataset::{Cell, Column, Dataset, RowId, TableSource};
use crate::filter::{BoundValue, FilterState, RangeFilter, SubstringFilter};
use crate::index::KeyIndex;
use crate::key::Key;
use crate::normalize::KeyNormalizer;
use crate::paint::{paint, RowBands};
use crate::sort::{sort_by_column, SortDirection, SortState};
use crate::view::RowView;

/// Presentation-side hook run once per build, for every indexed column
/// (e.g. to add the `sorting` class and a click handler to its header)
pub trait TableMarkup {
    fn mark_sortable(&mut self, col: usize);
}

impl<F: FnMut(usize)> TableMarkup for F {
    fn mark_sortable(&mut self, col: usize) {
        (self)(col)
    }
}

/// Markup adapter that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMarkup;

impl TableMarkup for NoMarkup {
    fn mark_sortable(&mut self, _col: usize) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    Unindexed,
    Indexed,
}

/// Snapshot of one row's derived state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowState {
    pub id: RowId,
    pub rank: usize,
    pub visible: bool,
    pub bands: Option<RowBands>,
}

#[derive(Debug)]
struct IndexedTable {
    dataset: Dataset,
    index: KeyIndex,
    view: RowView,
    filters: FilterState,
    sort: Option<SortState>,
    /// Last direction per column, for header toggling
    directions: Vec<Option<SortDirection>>,
    /// Bands from the last paint, indexed by row id
    bands: Vec<Option<RowBands>>,
}

/// Owns one table's dataset and derived state
#[derive(Debug, Default)]
pub struct TableController {
    normalizer: KeyNormalizer,
    table: Option<IndexedTable>,
}

impl TableController {
    pub fn new(normalizer: KeyNormalizer) -> Self {
        Self { normalizer, table: None }
    }

    pub fn normalizer(&self) -> &KeyNormalizer {
        &self.normalizer
    }

    pub fn state(&self) -> TableState {
        if self.table.is_some() {
            TableState::Indexed
        } else {
            TableState::Unindexed
        }
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Index a table. Returns whether indexing happened: false when already
    /// indexed or when the table has fewer than two rows (header included).
    ///
    /// `markup` is told about every indexed column, once.
    pub fn build<M: TableMarkup + ?Sized>(&mut self, source: TableSource, markup: &mut M) -> bool {
        if self.table.is_some() {
            log::debug!("build skipped: table already indexed");
            return false;
        }
        if source.table_rows() < 2 {
            log::debug!("build skipped: {} table row(s)", source.table_rows());
            return false;
        }
        let Some(dataset) = Dataset::from_source(source) else {
            return false;
        };

        let index = KeyIndex::build(&dataset, &self.normalizer);
        for col in index.eligible_columns() {
            markup.mark_sortable(col);
        }

        let view = RowView::new(dataset.row_count());
        let bands = paint(&view);
        log::debug!(
            "indexed {} rows x {} columns ({} sortable)",
            dataset.row_count(),
            dataset.column_count(),
            index.eligible_columns().count()
        );

        self.table = Some(IndexedTable {
            directions: vec![None; dataset.column_count()],
            dataset,
            index,
            view,
            filters: FilterState::default(),
            sort: None,
            bands,
        });
        true
    }

    /// Drop the current index and build from a fresh snapshot.
    /// Needed whenever cell content changes; keys are never refreshed otherwise.
    pub fn rebuild<M: TableMarkup + ?Sized>(&mut self, source: TableSource, markup: &mut M) -> bool {
        self.table = None;
        self.build(source, markup)
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Sort every row by `col` and repaint. No-op before build or on a
    /// column that is not indexed.
    pub fn sort(&mut self, col: usize, direction: SortDirection) {
        let Some(table) = self.table.as_mut() else {
            log::debug!("sort ignored: table not indexed");
            return;
        };
        let Some(order) = sort_by_column(&table.view, &table.index, col, direction) else {
            log::debug!("sort ignored: column {} is not sortable", col);
            return;
        };
        if !table.view.apply_order(order) {
            return;
        }
        table.sort = Some(SortState { column: col, direction });
        table.directions[col] = Some(direction);
        table.bands = paint(&table.view);
        log::debug!("sorted by column {} {:?}", col, direction);
    }

    /// Header click: ascending on first click of a column, then alternating.
    /// Returns the direction applied.
    pub fn toggle_sort(&mut self, col: usize) -> Option<SortDirection> {
        let table = self.table.as_ref()?;
        if !table.index.is_eligible(col) {
            return None;
        }
        let direction = table
            .directions
            .get(col)
            .copied()
            .flatten()
            .map_or(SortDirection::Ascending, SortDirection::flipped);
        self.sort(col, direction);
        Some(direction)
    }

    /// Back to source order
    pub fn clear_sort(&mut self) {
        let Some(table) = self.table.as_mut() else {
            return;
        };
        table.view.clear_order();
        table.sort = None;
        table.directions.iter_mut().for_each(|d| *d = None);
        table.bands = paint(&table.view);
    }

    // -------------------------------------------------------------------------
    // Filtering
    // -------------------------------------------------------------------------

    /// Show rows whose key in `col` contains the normalized needle.
    /// An empty or absent needle clears the substring filter.
    pub fn filter_substring(&mut self, col: usize, needle: Option<&str>) {
        let Some(table) = self.table.as_mut() else {
            log::debug!("filter ignored: table not indexed");
            return;
        };
        let filter = needle.and_then(|n| SubstringFilter::new(&self.normalizer, col, n));
        if filter.is_some() && !table.index.is_eligible(col) {
            log::debug!("filter ignored: column {} is not indexed", col);
            return;
        }
        table.filters.substring = filter;
        Self::refresh_visibility(table);
    }

    /// Show rows whose key in `col` lies in `[min, max]`. Absent or empty
    /// bounds are open; both open clears the range filter.
    pub fn filter_range(&mut self, col: usize, min: Option<BoundValue>, max: Option<BoundValue>) {
        let Some(table) = self.table.as_mut() else {
            log::debug!("range ignored: table not indexed");
            return;
        };
        let filter = RangeFilter::new(&self.normalizer, col, min.as_ref(), max.as_ref());
        if filter.is_some() && !table.index.is_eligible(col) {
            log::debug!("range ignored: column {} is not indexed", col);
            return;
        }
        table.filters.range = filter;
        Self::refresh_visibility(table);
    }

    /// Clear every filter
    pub fn show_all(&mut self) {
        let Some(table) = self.table.as_mut() else {
            return;
        };
        table.filters.clear();
        table.view.show_all();
    }

    fn refresh_visibility(table: &mut IndexedTable) {
        let mask = table.filters.visibility(&table.index);
        table.view.apply_visibility(mask);
        log::debug!(
            "{} of {} rows visible",
            table.view.visible_count(),
            table.view.row_count()
        );
    }

    // -------------------------------------------------------------------------
    // Painting
    // -------------------------------------------------------------------------

    /// Recompute bands over the visible rows. Sorting repaints by itself;
    /// call this after filtering.
    pub fn paint(&mut self) {
        if let Some(table) = self.table.as_mut() {
            table.bands = paint(&table.view);
        }
    }

    // -------------------------------------------------------------------------
    // Read side
    // -------------------------------------------------------------------------

    pub fn columns(&self) -> &[Column] {
        match &self.table {
            Some(t) => t.dataset.columns(),
            None => &[],
        }
    }

    pub fn row_count(&self) -> usize {
        self.table.as_ref().map_or(0, |t| t.dataset.row_count())
    }

    pub fn is_sortable(&self, col: usize) -> bool {
        self.table.as_ref().is_some_and(|t| t.index.is_eligible(col))
    }

    /// Visible row ids in rank order: exactly what should be rendered
    pub fn visible_rows(&self) -> &[RowId] {
        match &self.table {
            Some(t) => t.view.visible_ids(),
            None => &[],
        }
    }

    /// Every row id in rank order, hidden rows included
    pub fn ranked_rows(&self) -> &[RowId] {
        match &self.table {
            Some(t) => t.view.order(),
            None => &[],
        }
    }

    pub fn row(&self, id: RowId) -> Option<RowState> {
        let table = self.table.as_ref()?;
        let rank = table.view.rank_of(id)?;
        Some(RowState {
            id,
            rank,
            visible: table.view.is_visible(id),
            bands: table.bands.get(id).copied().flatten(),
        })
    }

    pub fn cells(&self, id: RowId) -> Option<&[Cell]> {
        self.table
            .as_ref()
            .and_then(|t| t.dataset.row(id))
            .map(|r| r.cells.as_slice())
    }

    pub fn key(&self, id: RowId, col: usize) -> Option<&Key> {
        self.table.as_ref().and_then(|t| t.index.key(id, col))
    }

    pub fn sort_state(&self) -> Option<SortState> {
        self.table.as_ref().and_then(|t| t.sort)
    }

    /// Direction the column was last sorted in, if any
    pub fn column_direction(&self, col: usize) -> Option<SortDirection> {
        self.table
            .as_ref()
            .and_then(|t| t.directions.get(col).copied().flatten())
    }

    pub fn filters(&self) -> Option<&FilterState> {
        self.table.as_ref().map(|t| &t.filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|&v| Cell::from(v)).collect()
    }

    fn books() -> TableSource {
        TableSource::new(
            vec![Column::new("Titre"), Column::new("Année"), Column::unsortable("Note")],
            vec![
                cells(&["Les Misérables", "1862", "a"]),
                cells(&["Germinal", "1885", "b"]),
                cells(&["L'Étranger", "1942", "c"]),
                cells(&["Le Rouge et le Noir", "1830", "d"]),
                cells(&["Madame Bovary", "1857", "e"]),
            ],
        )
    }

    fn indexed() -> TableController {
        let mut table = TableController::default();
        assert!(table.build(books(), &mut NoMarkup));
        table
    }

    fn visible(table: &TableController) -> Vec<usize> {
        table.visible_rows().to_vec()
    }

    #[test]
    fn test_build_state_machine() {
        let mut table = TableController::default();
        assert_eq!(table.state(), TableState::Unindexed);
        assert!(table.build(books(), &mut NoMarkup));
        assert_eq!(table.state(), TableState::Indexed);
        // Idempotent
        assert!(!table.build(books(), &mut NoMarkup));
        assert_eq!(table.row_count(), 5);
    }

    #[test]
    fn test_build_marks_sortable_columns_once() {
        let mut marked = Vec::new();
        let mut table = TableController::default();
        table.build(books(), &mut |col: usize| marked.push(col));
        table.build(books(), &mut |col: usize| marked.push(col));
        assert_eq!(marked, vec![0, 1]);
        assert!(table.is_sortable(1));
        assert!(!table.is_sortable(2));
    }

    #[test]
    fn test_build_too_small() {
        let mut table = TableController::default();
        let source = TableSource::headless(vec![cells(&["only a header"])]);
        assert!(!table.build(source, &mut NoMarkup));
        assert_eq!(table.state(), TableState::Unindexed);

        let source = TableSource::new(vec![Column::new("A")], vec![]);
        assert!(!table.build(source, &mut NoMarkup));
    }

    #[test]
    fn test_header_plus_one_row_is_indexed() {
        let mut table = TableController::default();
        let source = TableSource::headless(vec![cells(&["A"]), cells(&["1"])]);
        assert!(table.build(source, &mut NoMarkup));
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_operations_before_build_are_noops() {
        let mut table = TableController::default();
        table.sort(0, SortDirection::Ascending);
        table.filter_substring(0, Some("x"));
        table.filter_range(0, Some("1".into()), None);
        table.show_all();
        table.paint();
        assert_eq!(table.toggle_sort(0), None);
        assert!(table.visible_rows().is_empty());
        assert_eq!(table.state(), TableState::Unindexed);
    }

    #[test]
    fn test_sort_by_title() {
        let mut table = indexed();
        table.sort(0, SortDirection::Ascending);
        // etranger, germinal, madamebovary, miserables, rougeetlenoir
        assert_eq!(visible(&table), vec![2, 1, 4, 0, 3]);
        assert_eq!(table.row(0).unwrap().rank, 3);
        assert_eq!(
            table.sort_state(),
            Some(SortState { column: 0, direction: SortDirection::Ascending })
        );
    }

    #[test]
    fn test_sort_unsortable_column_is_noop() {
        let mut table = indexed();
        table.sort(2, SortDirection::Descending);
        table.sort(99, SortDirection::Descending);
        assert_eq!(visible(&table), vec![0, 1, 2, 3, 4]);
        assert_eq!(table.sort_state(), None);
    }

    #[test]
    fn test_toggle_sort() {
        let mut table = indexed();
        assert_eq!(table.toggle_sort(1), Some(SortDirection::Ascending));
        assert_eq!(visible(&table), vec![3, 4, 0, 1, 2]);
        assert_eq!(table.toggle_sort(1), Some(SortDirection::Descending));
        assert_eq!(visible(&table), vec![2, 1, 0, 4, 3]);
        assert_eq!(table.toggle_sort(1), Some(SortDirection::Ascending));

        // Another column starts ascending again
        assert_eq!(table.toggle_sort(0), Some(SortDirection::Ascending));
        assert_eq!(table.column_direction(1), Some(SortDirection::Ascending));
        assert_eq!(table.toggle_sort(2), None);
    }

    #[test]
    fn test_clear_sort() {
        let mut table = indexed();
        table.sort(1, SortDirection::Descending);
        table.clear_sort();
        assert_eq!(visible(&table), vec![0, 1, 2, 3, 4]);
        assert_eq!(table.sort_state(), None);
        assert_eq!(table.column_direction(1), None);
    }

    #[test]
    fn test_filter_substring() {
        let mut table = indexed();
        table.filter_substring(0, Some("ÉTRANG"));
        assert_eq!(visible(&table), vec![2]);

        table.filter_substring(0, None);
        assert_eq!(visible(&table), vec![0, 1, 2, 3, 4]);

        table.filter_substring(0, Some("mi"));
        table.filter_substring(0, Some(""));
        assert_eq!(visible(&table), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_filter_on_unindexed_column_is_ignored() {
        let mut table = indexed();
        table.filter_substring(0, Some("germinal"));
        table.filter_substring(2, Some("zzz"));
        assert_eq!(visible(&table), vec![1]);
    }

    #[test]
    fn test_filter_range_years() {
        let mut table = indexed();
        table.filter_range(1, Some("1850".into()), Some(1890.0.into()));
        assert_eq!(visible(&table), vec![0, 1, 4]);

        table.filter_range(1, None, Some("".into()));
        assert_eq!(visible(&table), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_filters_compose() {
        let mut table = indexed();
        table.filter_range(1, Some(1800.0.into()), Some(1870.0.into()));
        table.filter_substring(0, Some("r"));
        // miserables, rougeetlenoir, madamebovary
        assert_eq!(visible(&table), vec![0, 3, 4]);
        table.filter_substring(0, Some("bovary"));
        assert_eq!(visible(&table), vec![4]);
    }

    #[test]
    fn test_filter_keeps_rank() {
        let mut table = indexed();
        table.sort(1, SortDirection::Ascending);
        let ranks: Vec<_> = (0..5).map(|id| table.row(id).unwrap().rank).collect();
        table.filter_substring(0, Some("germinal"));
        let after: Vec<_> = (0..5).map(|id| table.row(id).unwrap().rank).collect();
        assert_eq!(ranks, after);
    }

    #[test]
    fn test_show_all_restores_rows_keeps_order() {
        let mut table = indexed();
        table.sort(1, SortDirection::Descending);
        let order = table.ranked_rows().to_vec();
        table.filter_substring(0, Some("e"));
        table.filter_range(1, Some(1900.0.into()), None);
        table.show_all();
        assert_eq!(visible(&table), order);
        assert!((0..5).all(|id| table.row(id).unwrap().visible));
        assert!(!table.filters().unwrap().is_active());
    }

    #[test]
    fn test_paint_after_filter() {
        let mut table = indexed();
        assert_eq!(table.row(3).unwrap().bands.unwrap().position, 4);

        table.filter_range(1, Some(1860.0.into()), None);
        table.paint();
        // visible: 0, 1, 2
        assert_eq!(table.row(2).unwrap().bands.unwrap().position, 3);
        assert_eq!(table.row(3).unwrap().bands, None);
    }

    #[test]
    fn test_sort_repaints() {
        let mut table = indexed();
        table.sort(1, SortDirection::Ascending);
        // 1830 (id 3) is first
        assert_eq!(table.row(3).unwrap().bands.unwrap().position, 1);
    }

    #[test]
    fn test_rebuild_refreshes_keys() {
        let mut table = indexed();
        table.sort(1, SortDirection::Ascending);

        let mut source = books();
        source.rows[0][1] = Cell::from("2001");
        assert!(table.rebuild(source, &mut NoMarkup));
        assert_eq!(table.key(0, 1), Some(&Key::number(2001.0)));
        assert_eq!(table.sort_state(), None);
    }

    #[test]
    fn test_cells_accessor() {
        let table = indexed();
        assert_eq!(table.cells(1).unwrap()[0].text, "Germinal");
        assert!(table.cells(42).is_none());
        assert_eq!(table.columns().len(), 3);
    }
}
