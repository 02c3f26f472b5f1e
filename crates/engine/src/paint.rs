//! Row painting (zebra and periodic bands)
//!
//! Visible rows are numbered 1.. in rank order; hidden rows get nothing and
//! do not advance the counter, so banding never shows a seam where filtered
//! rows used to be.

use serde::{Deserialize, Serialize};

use crate::view::RowView;

/// Bands of one visible row, derived from its 1-based visible position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowBands {
    pub position: usize,
}

impl RowBands {
    pub fn new(position: usize) -> Self {
        Self { position }
    }

    pub fn is_odd(&self) -> bool {
        self.position % 2 == 1
    }

    pub fn is_even(&self) -> bool {
        !self.is_odd()
    }

    /// First row of each group of five
    pub fn is_mod1(&self) -> bool {
        self.position % 5 == 1
    }

    /// Middle row of each group of five
    pub fn is_mod3(&self) -> bool {
        self.position % 5 == 3
    }

    pub fn is_mod5(&self) -> bool {
        self.position % 5 == 0
    }

    pub fn is_mod10(&self) -> bool {
        self.position % 10 == 0
    }

    /// Class names for this row, parity first
    pub fn class_names(&self) -> Vec<&'static str> {
        let mut classes = Vec::with_capacity(4);
        classes.push(if self.is_odd() { "odd" } else { "even" });
        if self.is_mod1() {
            classes.push("mod1");
        }
        if self.is_mod3() {
            classes.push("mod3");
        }
        if self.is_mod5() {
            classes.push("mod5");
        }
        if self.is_mod10() {
            classes.push("mod10");
        }
        classes
    }
}

/// Bands indexed by row id; `None` for hidden rows
pub fn paint(view: &RowView) -> Vec<Option<RowBands>> {
    let mut bands = vec![None; view.row_count()];
    for (i, &id) in view.visible_ids().iter().enumerate() {
        bands[id] = Some(RowBands::new(i + 1));
    }
    bands
}
