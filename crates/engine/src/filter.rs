//! Filtering
//!
//! One substring filter and one range filter may be active per table. A row
//! is visible iff it passes every active filter. Filters compare keys from
//! the `KeyIndex`, never raw text, and only ever produce a visibility mask;
//! ranks are left alone.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::index::KeyIndex;
use crate::key::Key;
use crate::normalize::KeyNormalizer;

/// Substring predicate: key text must contain the normalized needle
#[derive(Debug, Clone, PartialEq)]
pub struct SubstringFilter {
    pub column: usize,
    /// Needle after normalization, as text
    pub needle: String,
}

impl SubstringFilter {
    /// `None` for a needle that normalizes to nothing: such a filter would
    /// match every row, which is the same as no filter.
    pub fn new(normalizer: &KeyNormalizer, column: usize, needle: &str) -> Option<Self> {
        let key = normalizer.normalize(needle);
        if key.is_empty() {
            return None;
        }
        Some(Self { column, needle: key.as_text() })
    }

    pub fn passes(&self, key: &Key) -> bool {
        match key {
            Key::Text(s) => s.contains(&self.needle),
            Key::Number(_) => key.as_text().contains(&self.needle),
        }
    }
}

/// Range bound as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoundValue {
    Number(f64),
    Text(String),
}

impl From<f64> for BoundValue {
    fn from(n: f64) -> Self {
        BoundValue::Number(n)
    }
}

impl From<i64> for BoundValue {
    fn from(n: i64) -> Self {
        BoundValue::Number(n as f64)
    }
}

impl From<&str> for BoundValue {
    fn from(s: &str) -> Self {
        BoundValue::Text(s.to_string())
    }
}

impl From<String> for BoundValue {
    fn from(s: String) -> Self {
        BoundValue::Text(s)
    }
}

impl BoundValue {
    /// Key for this bound; `None` means unbounded (empty or blank text).
    pub fn to_key(&self, normalizer: &KeyNormalizer) -> Option<Key> {
        match self {
            BoundValue::Number(n) if n.is_nan() => None,
            BoundValue::Number(n) => Some(Key::number(*n)),
            BoundValue::Text(s) => {
                let key = normalizer.normalize(s);
                if key.is_empty() {
                    None
                } else {
                    Some(key)
                }
            }
        }
    }
}

/// Inclusive range predicate; a missing side is unbounded
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilter {
    pub column: usize,
    pub min: Option<Key>,
    pub max: Option<Key>,
}

impl RangeFilter {
    /// `None` when both sides are unbounded
    pub fn new(
        normalizer: &KeyNormalizer,
        column: usize,
        min: Option<&BoundValue>,
        max: Option<&BoundValue>,
    ) -> Option<Self> {
        let min = min.and_then(|b| b.to_key(normalizer));
        let max = max.and_then(|b| b.to_key(normalizer));
        if min.is_none() && max.is_none() {
            return None;
        }
        Some(Self { column, min, max })
    }

    /// Same ordering as sorting, so filtering agrees with sort order
    pub fn passes(&self, key: &Key) -> bool {
        let above_min = self.min.as_ref().map_or(true, |min| key.cmp(min) != Ordering::Less);
        let below_max = self.max.as_ref().map_or(true, |max| key.cmp(max) != Ordering::Greater);
        above_min && below_max
    }
}

/// Active filters of one table
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    pub substring: Option<SubstringFilter>,
    pub range: Option<RangeFilter>,
}

impl FilterState {
    pub fn is_active(&self) -> bool {
        self.substring.is_some() || self.range.is_some()
    }

    pub fn clear(&mut self) {
        self.substring = None;
        self.range = None;
    }

    /// Visibility of one row. A filter on a column the index does not cover
    /// hides nothing.
    pub fn passes(&self, index: &KeyIndex, row: usize) -> bool {
        if let Some(f) = &self.substring {
            if let Some(key) = index.key(row, f.column) {
                if !f.passes(key) {
                    return false;
                }
            }
        }
        if let Some(f) = &self.range {
            if let Some(key) = index.key(row, f.column) {
                if !f.passes(key) {
                    return false;
                }
            }
        }
        true
    }

    /// Visibility mask indexed by row id
    pub fn visibility(&self, index: &KeyIndex) -> Vec<bool> {
        (0..index.row_count()).map(|row| self.passes(index, row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Cell, Column, Dataset, TableSource};

    fn index(values: &[&str]) -> KeyIndex {
        let rows = values.iter().map(|v| vec![Cell::from(*v)]).collect();
        let source = TableSource::new(vec![Column::new("v")], rows);
        let ds = Dataset::from_source(source).unwrap();
        KeyIndex::build(&ds, &KeyNormalizer::default())
    }

    fn visible(state: &FilterState, index: &KeyIndex) -> Vec<usize> {
        state
            .visibility(index)
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| v.then_some(i))
            .collect()
    }

    #[test]
    fn test_substring_insensitive() {
        let n = KeyNormalizer::default();
        let idx = index(&["Émile Zola", "Stendhal", "Émilie du Châtelet", "Flaubert"]);
        let state = FilterState {
            substring: SubstringFilter::new(&n, 0, "EMIL"),
            range: None,
        };
        assert_eq!(visible(&state, &idx), vec![0, 2]);
    }

    #[test]
    fn test_substring_on_numbers() {
        let n = KeyNormalizer::default();
        let idx = index(&["1 999", "2005", "12", "3"]);
        let state = FilterState {
            substring: SubstringFilter::new(&n, 0, "99"),
            range: None,
        };
        assert_eq!(visible(&state, &idx), vec![0]);
    }

    #[test]
    fn test_empty_needle_is_no_filter() {
        let n = KeyNormalizer::default();
        assert!(SubstringFilter::new(&n, 0, "").is_none());
        assert!(SubstringFilter::new(&n, 0, "   ").is_none());
        assert!(SubstringFilter::new(&n, 0, "?!").is_none());
    }

    #[test]
    fn test_range_inclusive() {
        let n = KeyNormalizer::default();
        let idx = index(&["1999", "2000", "2005", "2010", "2011"]);
        let state = FilterState {
            substring: None,
            range: RangeFilter::new(&n, 0, Some(&"2000".into()), Some(&"2010".into())),
        };
        assert_eq!(visible(&state, &idx), vec![1, 2, 3]);
    }

    #[test]
    fn test_range_open_sides() {
        let n = KeyNormalizer::default();
        let idx = index(&["1", "5", "10"]);

        let min_only = FilterState {
            substring: None,
            range: RangeFilter::new(&n, 0, Some(&5.0.into()), None),
        };
        assert_eq!(visible(&min_only, &idx), vec![1, 2]);

        let max_only = FilterState {
            substring: None,
            range: RangeFilter::new(&n, 0, Some(&"".into()), Some(&5.0.into())),
        };
        assert_eq!(visible(&max_only, &idx), vec![0, 1]);
    }

    #[test]
    fn test_range_unbounded_both() {
        let n = KeyNormalizer::default();
        assert!(RangeFilter::new(&n, 0, None, None).is_none());
        assert!(RangeFilter::new(&n, 0, Some(&"".into()), Some(&" ".into())).is_none());
        assert!(RangeFilter::new(&n, 0, Some(&f64::NAN.into()), None).is_none());
    }

    #[test]
    fn test_range_lexical() {
        let n = KeyNormalizer::default();
        let idx = index(&["Balzac", "Céline", "Dumas", "Zola"]);
        let state = FilterState {
            substring: None,
            range: RangeFilter::new(&n, 0, Some(&"C".into()), Some(&"E".into())),
        };
        assert_eq!(visible(&state, &idx), vec![1, 2]);
    }

    #[test]
    fn test_both_filters_compose() {
        let n = KeyNormalizer::default();
        let idx = index(&["10", "110", "210", "310", "25"]);
        let state = FilterState {
            substring: SubstringFilter::new(&n, 0, "10"),
            range: RangeFilter::new(&n, 0, Some(&100.0.into()), Some(&300.0.into())),
        };
        assert_eq!(visible(&state, &idx), vec![1, 2]);
    }

    #[test]
    fn test_unindexed_column_hides_nothing() {
        let n = KeyNormalizer::default();
        let idx = index(&["a", "b"]);
        let state = FilterState {
            substring: SubstringFilter::new(&n, 4, "zzz"),
            range: None,
        };
        assert_eq!(visible(&state, &idx), vec![0, 1]);
    }

    #[test]
    fn test_clear() {
        let n = KeyNormalizer::default();
        let mut state = FilterState {
            substring: SubstringFilter::new(&n, 0, "a"),
            range: None,
        };
        assert!(state.is_active());
        state.clear();
        assert!(!state.is_active());
    }

    #[test]
    fn test_bound_value_serde_untagged() {
        let n: BoundValue = serde_json::from_str("12.5").unwrap();
        assert_eq!(n, BoundValue::Number(12.5));
        let t: BoundValue = serde_json::from_str(r#""1999""#).unwrap();
        assert_eq!(t, BoundValue::Text("1999".to_string()));
    }
}
