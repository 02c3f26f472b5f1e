// Tool settings
// Loaded from ~/.config/tablesort/settings.toml

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Built-in locale rule set the overrides are applied on top of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalePreset {
    /// Accent folding, ligatures and elision articles (default)
    #[default]
    French,
    /// Lower-casing and word filtering only
    Plain,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleSettings {
    pub preset: LocalePreset,

    /// Replaces the preset's article list when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub articles: Option<Vec<String>>,

    /// Extra fold entries, e.g. `"ø" = "o"`
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub folds: BTreeMap<String, String>,
}

impl LocaleSettings {
    /// Fold entries keyed by lower-case character, since keys are folded
    /// after lower-casing. Call after `validate`; invalid keys are skipped.
    pub fn fold_pairs(&self) -> Vec<(char, String)> {
        self.folds
            .iter()
            .filter_map(|(k, v)| single_char(&k.to_lowercase()).map(|c| (c, v.to_lowercase())))
            .collect()
    }

    /// Article overrides with typographic apostrophes made plain
    pub fn article_list(&self) -> Option<Vec<String>> {
        self.articles
            .as_ref()
            .map(|list| list.iter().map(|a| a.replace('’', "'")).collect())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for key in self.folds.keys() {
            if single_char(key).is_none() {
                return Err(ConfigError::InvalidFold(key.clone()));
            }
        }
        // Articles end at a word boundary, so stripping one never exposes another
        for article in self.articles.iter().flatten() {
            if !(article.ends_with(' ') || article.ends_with('\'') || article.ends_with('’')) {
                return Err(ConfigError::InvalidArticle(article.clone()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Field delimiter; inferred from the file extension when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
}

impl InputSettings {
    pub fn delimiter_byte(&self) -> Option<u8> {
        self.delimiter.as_deref().and_then(delimiter_byte)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self.delimiter.as_deref() {
            Some(d) if delimiter_byte(d).is_none() => Err(ConfigError::InvalidDelimiter(d.to_string())),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Tsv,
    Json,
    Html,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tsv" => Ok(Self::Tsv),
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            other => Err(format!("unknown format '{other}' (expected tsv, json or html)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tsv => write!(f, "tsv"),
            Self::Json => write!(f, "json"),
            Self::Html => write!(f, "html"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub locale: LocaleSettings,
    pub input: InputSettings,
    pub output: OutputSettings,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tablesort")
            .join("settings.toml")
    }

    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.locale.validate()?;
        self.input.validate()
    }

    /// Load settings from `path`. A missing file yields defaults; an
    /// unreadable or invalid one is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let settings = Self::from_toml(&contents)?;
        log::info!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from the default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn delimiter_byte(s: &str) -> Option<u8> {
    match single_char(s) {
        Some(c) if c.is_ascii() => Some(c as u8),
        _ => None,
    }
}
