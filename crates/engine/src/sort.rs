//! Sorting
//!
//! The engine owns the permutation: callers ask for a column and a
//! direction and get back a new rank -> id order for `RowView::apply_order`.
//!
//! Invariants:
//! - every row is reordered, hidden ones included
//! - visibility is untouched
//! - stable: equal keys keep their current relative rank, in both directions

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::index::KeyIndex;
use crate::view::RowView;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn from_descending(descending: bool) -> Self {
        if descending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }

    pub fn is_descending(self) -> bool {
        self == SortDirection::Descending
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Class name a header gets once sorted in this direction
    pub fn class_name(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// Last sort applied to a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: usize,
    pub direction: SortDirection,
}

/// Compute the order for sorting `view` by column `col`.
///
/// Returns `None` when the column is not indexed, so callers can leave the
/// view alone.
///
/// The comparator is the key comparison, negated for descending. Ties fall
/// back to the current rank rather than relying on the stability of the
/// underlying sort, so equal keys never swap.
pub fn sort_by_column(
    view: &RowView,
    index: &KeyIndex,
    col: usize,
    direction: SortDirection,
) -> Option<Vec<usize>> {
    let keys = index.column(col)?;

    // (current rank, row id)
    let mut ranked: Vec<(usize, usize)> = view.order().iter().copied().enumerate().collect();

    ranked.sort_by(|&(rank_a, id_a), &(rank_b, id_b)| {
        let ord = keys[id_a].cmp(&keys[id_b]);
        let ord = match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        };
        match ord {
            Ordering::Equal => rank_a.cmp(&rank_b),
            other => other,
        }
    });

    Some(ranked.into_iter().map(|(_, id)| id).collect())
}
