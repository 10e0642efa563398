//! Static search options (`[theme.static_search]`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vellum_config::{ConfigError, ThemeOptions};

/// Theme table holding these options.
pub const SECTION: &str = "static_search";

/// Record fields the client-side fuzzy matcher searches.
pub const SEARCH_KEYS: [&str; 2] = ["title", "text"];

/// Node kinds whose text goes into a record.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeFilter {
    /// Paragraphs and literal blocks.
    #[default]
    All,
    /// Section titles only; records carry no body text.
    Titles,
    Paragraphs,
    Literal,
}

/// Search options, also passed to the page template for the fuzzy matcher.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SearchOptions {
    /// Match threshold (0 exact, 1 anything).
    pub threshold: f64,
    /// Maximum number of results shown.
    pub limit: usize,
    /// Searched record fields; always `["title", "text"]`.
    pub keys: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "minMatchCharLength")]
    pub min_char_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "ignoreLocation")]
    pub ignore_location: Option<bool>,
    /// Document names or folder prefixes left out of the index.
    #[serde(skip_serializing)]
    pub exclude: Vec<String>,
    /// Glob over document names -> node kinds to index.
    #[serde(skip_serializing)]
    pub index_patterns: BTreeMap<String, NodeFilter>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.2,
            limit: 10,
            keys: SEARCH_KEYS.iter().map(|&k| k.to_owned()).collect(),
            min_char_length: None,
            ignore_location: None,
            exclude: Vec::new(),
            index_patterns: BTreeMap::new(),
        }
    }
}

impl SearchOptions {
    /// Read options from the theme, falling back to defaults.
    ///
    /// `keys` is always reset to the searchable record fields.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Section` for a malformed table.
    pub fn from_theme(theme: &ThemeOptions) -> Result<Self, ConfigError> {
        let mut options: Self = theme.parse_section(SECTION)?.unwrap_or_default();
        options.keys = SEARCH_KEYS.iter().map(|&k| k.to_owned()).collect();
        Ok(options)
    }

    /// Write the effective matcher settings back into the theme table.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the table is not a table.
    pub fn apply_to_theme(&self, theme: &mut ThemeOptions) -> Result<(), ConfigError> {
        theme.set_section_value(SECTION, "keys", self.keys.clone())?;
        theme.set_section_value(SECTION, "threshold", self.threshold)?;
        theme.set_section_value(SECTION, "limit", i64::try_from(self.limit).unwrap_or(i64::MAX))?;
        Ok(())
    }

    /// Whether a document is excluded from the index.
    ///
    /// Entries match the document itself (with or without a `.md` suffix)
    /// and everything below it when it names a folder.
    pub fn is_excluded(&self, docname: &str) -> bool {
        self.exclude.iter().any(|entry| {
            let entry = entry.trim_end_matches('/');
            let entry = entry.strip_suffix(".md").unwrap_or(entry);
            docname == entry
                || docname
                    .strip_prefix(entry)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}
