pub mod controller;
pub mod dataset;
pub mod filter;
pub mod index;
pub mod key;
pub mod normalize;
pub mod paint;
pub mod sort;
pub mod view;

pub use controller::{NoMarkup, RowState, TableController, TableMarkup, TableState};
pub use dataset::{Cell, Column, Dataset, RowId, TableSource};
pub use filter::BoundValue;
pub use key::Key;
pub use normalize::{KeyNormalizer, LocaleRules};
pub use paint::RowBands;
pub use sort::{SortDirection, SortState};
