//! Sort keys
//!
//! A `Key` is the canonical, comparable value derived once from a cell's
//! content. Sorting and filtering both compare keys, never raw text, so a
//! value that sorts between two bounds also filters between them.

use std::fmt;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Canonical cell key.
///
/// Ordering: every number sorts before every text key. Numbers compare
/// numerically, text compares by code point. Mixed columns are not coerced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    Number(OrderedFloat<f64>),
    Text(String),
}

impl Key {
    /// Key of an empty cell
    pub fn empty() -> Self {
        Key::Text(String::new())
    }

    pub fn number(n: f64) -> Self {
        Key::Number(OrderedFloat(n))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Key::Number(_))
    }

    /// True for the empty text key (numbers are never empty)
    pub fn is_empty(&self) -> bool {
        matches!(self, Key::Text(s) if s.is_empty())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Key::Number(n) => Some(n.0),
            Key::Text(_) => None,
        }
    }

    /// Text form used for substring matching.
    ///
    /// Integral numbers print without a fractional part so that "2005"
    /// matches a cell holding 2005.
    pub fn as_text(&self) -> String {
        match self {
            Key::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", n.0 as i64)
                } else {
                    format!("{}", n.0)
                }
            }
            Key::Text(s) => s.clone(),
        }
    }
}

impl Default for Key {
    fn default() -> Self {
        Key::empty()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_before_text() {
        assert!(Key::number(1e9) < Key::Text("a".to_string()));
        assert!(Key::number(-1.0) < Key::empty());
    }

    #[test]
    fn test_number_ordering() {
        assert!(Key::number(2.0) < Key::number(10.0));
        assert!(Key::number(-3.5) < Key::number(0.0));
        assert_eq!(Key::number(0.0), Key::number(-0.0));
    }

    #[test]
    fn test_text_ordering() {
        assert!(Key::Text("abc".to_string()) < Key::Text("abd".to_string()));
        assert!(Key::empty() < Key::Text("a".to_string()));
    }

    #[test]
    fn test_as_text() {
        assert_eq!(Key::number(2005.0).as_text(), "2005");
        assert_eq!(Key::number(1234.5).as_text(), "1234.5");
        assert_eq!(Key::number(-7.0).as_text(), "-7");
        assert_eq!(Key::Text("rouge".to_string()).as_text(), "rouge");
    }

    #[test]
    fn test_empty() {
        assert!(Key::empty().is_empty());
        assert!(!Key::number(0.0).is_empty());
        assert!(!Key::Text("x".to_string()).is_empty());
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&Key::number(3.0)).unwrap();
        assert_eq!(json, r#"{"Number":3.0}"#);
        let back: Key = serde_json::from_str(r#"{"Text":"abc"}"#).unwrap();
        assert_eq!(back, Key::Text("abc".to_string()));
    }
}
