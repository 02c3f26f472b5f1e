use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// File could not be read.
    Io { path: String, message: String },
    /// TOML parse / deserialization error.
    Parse(String),
    /// Fold key that is not exactly one character.
    InvalidFold(String),
    /// Article that would not be followed by a word boundary.
    InvalidArticle(String),
    /// Delimiter that is not a single ASCII character.
    InvalidDelimiter(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "cannot read {path}: {message}"),
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
            Self::InvalidFold(key) => {
                write!(f, "locale.folds: key '{key}' must be a single character")
            }
            Self::InvalidArticle(article) => {
                write!(f, "locale.articles: '{article}' must end with a space or an apostrophe")
            }
            Self::InvalidDelimiter(d) => {
                write!(f, "input.delimiter: '{d}' must be a single ASCII character")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
