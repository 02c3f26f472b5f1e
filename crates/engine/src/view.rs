//! Row view: rank and visibility of every row
//!
//! Two spaces:
//! - id space: a row's original position, fixed for the dataset's lifetime
//! - rank space: the current display position, permuted by sorting
//!
//! Invariants:
//! - `order` is always a permutation of 0..N (no row duplicated or lost)
//! - `visible` is indexed by row id, so sorting never touches it
//! - filtering never touches `order`
//! - rank <-> id lookups are O(1)

/// Rank/visibility layer for one dataset
#[derive(Debug, Clone)]
pub struct RowView {
    /// rank -> row id
    order: Vec<usize>,

    /// row id -> rank, rebuilt whenever `order` changes
    ranks: Vec<usize>,

    /// Visibility indexed by row id
    visible: Vec<bool>,

    /// Visible row ids in rank order, rebuilt on sort or filter
    visible_ids: Vec<usize>,
}

impl Default for RowView {
    fn default() -> Self {
        Self::new(0)
    }
}

impl RowView {
    /// Identity order, everything visible
    pub fn new(row_count: usize) -> Self {
        Self {
            order: (0..row_count).collect(),
            ranks: (0..row_count).collect(),
            visible: vec![true; row_count],
            visible_ids: (0..row_count).collect(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.order.len()
    }

    pub fn visible_count(&self) -> usize {
        self.visible_ids.len()
    }

    /// Row id displayed at `rank`
    pub fn id_at(&self, rank: usize) -> Option<usize> {
        self.order.get(rank).copied()
    }

    /// Current rank of a row, hidden or not
    pub fn rank_of(&self, id: usize) -> Option<usize> {
        self.ranks.get(id).copied()
    }

    pub fn is_visible(&self, id: usize) -> bool {
        self.visible.get(id).copied().unwrap_or(false)
    }

    /// Row ids in rank order, hidden rows included
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Visible row ids in rank order
    pub fn visible_ids(&self) -> &[usize] {
        &self.visible_ids
    }

    /// Visibility indexed by row id
    pub fn visibility(&self) -> &[bool] {
        &self.visible
    }

    pub fn is_filtered(&self) -> bool {
        self.visible_count() < self.row_count()
    }

    /// True when the order differs from the original one
    pub fn is_sorted(&self) -> bool {
        self.order.iter().enumerate().any(|(rank, &id)| rank != id)
    }

    // -------------------------------------------------------------------------
    // Internal rebuilders
    // -------------------------------------------------------------------------

    fn rebuild_ranks(&mut self) {
        self.ranks.resize(self.order.len(), 0);
        for (rank, &id) in self.order.iter().enumerate() {
            self.ranks[id] = rank;
        }
    }

    fn rebuild_visible_ids(&mut self) {
        let visible = &self.visible;
        self.visible_ids = self
            .order
            .iter()
            .copied()
            .filter(|&id| visible.get(id).copied().unwrap_or(false))
            .collect();
    }

    // -------------------------------------------------------------------------
    // Mutators
    // -------------------------------------------------------------------------

    /// Install a new order (rank -> id). Rejected unless it is a permutation
    /// of the current rows; returns whether it was applied.
    pub fn apply_order(&mut self, order: Vec<usize>) -> bool {
        if !is_permutation(&order, self.row_count()) {
            log::warn!("rejected row order: not a permutation of {} rows", self.row_count());
            return false;
        }
        self.order = order;
        self.rebuild_ranks();
        self.rebuild_visible_ids();
        true
    }

    /// Back to original order (rank == id)
    pub fn clear_order(&mut self) {
        self.order = (0..self.order.len()).collect();
        self.rebuild_ranks();
        self.rebuild_visible_ids();
    }

    /// Replace visibility (mask indexed by row id)
    pub fn apply_visibility(&mut self, mask: Vec<bool>) {
        debug_assert_eq!(mask.len(), self.row_count());
        self.visible = mask;
        self.visible.resize(self.order.len(), true);
        self.rebuild_visible_ids();
    }

    /// Every row visible
    pub fn show_all(&mut self) {
        self.visible = vec![true; self.order.len()];
        self.rebuild_visible_ids();
    }
}

fn is_permutation(order: &[usize], n: usize) -> bool {
    if order.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &id in order {
        if id >= n || seen[id] {
            return false;
        }
        seen[id] = true;
    }
    true
}
