//! Key normalization
//!
//! Turns raw cell content into a `Key`:
//! 1. trim codepoints below 33 at both ends
//! 2. numeric attempt: `,` becomes `.`, spaces and `x × /` are dropped, then
//!    the longest leading float literal is parsed
//! 3. otherwise text: lower-case, one leading elision article removed,
//!    diacritics folded, ligatures expanded, non-word characters dropped
//!
//! Locale data (fold table, article list) is injected through `LocaleRules`.

use rustc_hash::FxHashMap;

use crate::key::Key;

/// Characters removed before the numeric attempt: spaces used as thousands
/// separators (plain, no-break, narrow no-break) and dimension glyphs.
const NUMERIC_NOISE: [char; 6] = [' ', '\u{a0}', '\u{202f}', 'x', '×', '/'];

/// Locale rules injected into the normalizer.
#[derive(Debug, Clone)]
pub struct LocaleRules {
    /// Accented character -> replacement (single char or expansion like "oe")
    folds: FxHashMap<char, String>,
    /// Leading articles, kept longest first so "les " wins over "le "
    articles: Vec<String>,
}

impl LocaleRules {
    pub fn new<I, A>(folds: I, articles: A) -> Self
    where
        I: IntoIterator<Item = (char, String)>,
        A: IntoIterator<Item = String>,
    {
        let folds = folds.into_iter().collect();
        let mut articles: Vec<String> = articles
            .into_iter()
            .map(|a| a.to_lowercase())
            .filter(|a| !a.is_empty())
            .collect();
        articles.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        articles.dedup();
        Self { folds, articles }
    }

    /// French defaults: common accented vowels and consonants, the `œ`/`æ`
    /// ligatures, and the elision articles ignored when alphabetizing titles.
    pub fn french() -> Self {
        let mut folds: Vec<(char, String)> = Vec::new();
        let groups = [
            ("éèêë", "e"),
            ("áàâä", "a"),
            ("íìîï", "i"),
            ("úùûü", "u"),
            ("óòôö", "o"),
            ("ÿ", "y"),
            ("ç", "c"),
            ("ñ", "n"),
        ];
        for (accented, base) in groups {
            for c in accented.chars() {
                folds.push((c, base.to_string()));
            }
        }
        folds.push(('œ', "oe".to_string()));
        folds.push(('æ', "ae".to_string()));

        let articles = ["d'", "de ", "le ", "les ", "la ", "l'"]
            .into_iter()
            .map(String::from);

        Self::new(folds, articles)
    }

    /// No folding, no articles: lower-casing and word filtering only
    pub fn plain() -> Self {
        Self::new(std::iter::empty(), std::iter::empty())
    }

    /// Add or replace fold entries
    pub fn with_folds<I>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (char, String)>,
    {
        self.folds.extend(extra);
        self
    }

    /// Replace the article list
    pub fn with_articles<A>(self, articles: A) -> Self
    where
        A: IntoIterator<Item = String>,
    {
        Self::new(self.folds, articles)
    }

    pub fn articles(&self) -> &[String] {
        &self.articles
    }

    pub fn fold(&self, c: char) -> Option<&str> {
        self.folds.get(&c).map(String::as_str)
    }
}

impl Default for LocaleRules {
    fn default() -> Self {
        Self::french()
    }
}

/// Stateless apart from its rules; `normalize` is pure and idempotent.
#[derive(Debug, Clone, Default)]
pub struct KeyNormalizer {
    rules: LocaleRules,
}

impl KeyNormalizer {
    pub fn new(rules: LocaleRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &LocaleRules {
        &self.rules
    }

    /// Derive the key for raw text
    pub fn normalize(&self, raw: &str) -> Key {
        let text = trim_control(raw);
        if text.is_empty() {
            return Key::empty();
        }

        if let Some(n) = parse_numeric(text) {
            return Key::number(n);
        }

        let folded = self.fold_text(text);
        // Stripping punctuation can expose a number ("(2005)"); keying it as
        // text would make a second pass disagree with the first.
        match parse_numeric(&folded) {
            Some(n) => Key::number(n),
            None => Key::Text(folded),
        }
    }

    /// Derive the key for a cell: the literal sort override wins over text
    pub fn normalize_cell(&self, text: &str, sort_override: Option<&str>) -> Key {
        self.normalize(sort_override.unwrap_or(text))
    }

    /// Text path: lower-case, article, folding, word filter
    fn fold_text(&self, text: &str) -> String {
        let lowered = text.to_lowercase().replace('’', "'");
        let rest = self
            .rules
            .articles
            .iter()
            .find_map(|article| lowered.strip_prefix(article.as_str()))
            .unwrap_or(lowered.as_str());

        let mut out = String::with_capacity(rest.len());
        for c in rest.chars() {
            match self.rules.fold(c) {
                Some(base) => out.extend(base.chars().filter(|b| is_word_char(*b))),
                None if is_word_char(c) => out.push(c),
                None => {}
            }
        }
        out
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Two-pointer trim of codepoints below 33 (ASCII controls and space)
pub fn trim_control(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut start = 0;
    let mut end = bytes.len();
    while start < end && bytes[start] < 33 {
        start += 1;
    }
    while end > start && bytes[end - 1] < 33 {
        end -= 1;
    }
    // Only ASCII bytes were skipped, so both ends sit on char boundaries
    &s[start..end]
}

/// Numeric attempt on trimmed text; `None` when no finite number leads it.
pub fn parse_numeric(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !NUMERIC_NOISE.contains(c))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    let literal = leading_float(&cleaned)?;
    literal.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Longest prefix shaped like a float literal: `[+-]digits[.digits][e[+-]digits]`
fn leading_float(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        if digits > 0 {
            i = j;
        }
    }
    if digits == 0 {
        return None;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    Some(&s[..i])
}
