//! Theme options: the `[theme]` table of `vellum.toml`.
//!
//! Well-known keys are typed fields. Feature tables (`static_search`,
//! `whatsnew`, `cheatsheet`, `navigation_dropdown`, ...) are kept as raw TOML
//! tables and parsed by the crate that owns the feature through
//! [`ThemeOptions::parse_section`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Components placed at the end of the navigation bar when a version
/// switcher is configured.
pub const SWITCHER_NAVBAR_END: [&str; 3] =
    ["version-switcher", "theme-switcher", "navbar-icon-links"];

/// Version switcher settings.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SwitcherOptions {
    /// URL of the `versions.json` file.
    pub json_url: String,
    /// Version entry matching this build.
    #[serde(default)]
    pub version_match: Option<String>,
}

/// Theme options.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ThemeOptions {
    /// Repository URL shown in the navbar icon links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    /// Contact address for the 404 page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_mail: Option<String>,
    /// Logo path relative to the static directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switcher: Option<SwitcherOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navbar_end: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapse_navigation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation_with_keys: Option<bool>,
    /// Show the "edit this page" button.
    pub use_edit_page_button: bool,
    /// Extra `(title, url)` breadcrumbs prepended to every page.
    pub additional_breadcrumbs: Vec<(String, String)>,
    /// Removed hosted-search option; rejected by [`validate`](Self::validate).
    #[serde(skip_serializing)]
    pub use_meilisearch: Option<toml::Value>,
    /// Feature tables and unknown keys.
    #[serde(flatten)]
    pub extra: toml::Table,
}

impl ThemeOptions {
    /// Back-fill navigation defaults.
    ///
    /// `navbar_end` is only filled when a version switcher is configured.
    /// Values set by the user are never overwritten.
    pub fn apply_defaults(&mut self) {
        if self.switcher.is_some() && self.navbar_end.is_none() {
            self.navbar_end = Some(SWITCHER_NAVBAR_END.iter().map(|&s| s.to_owned()).collect());
        }
        self.collapse_navigation.get_or_insert(true);
        self.navigation_with_keys.get_or_insert(true);
    }

    /// Validate well-known options.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Deprecated` for removed options and
    /// `ConfigError::Validation` for malformed values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.use_meilisearch.is_some() {
            return Err(ConfigError::Deprecated {
                option: "theme.use_meilisearch".to_owned(),
                replacement: "theme.static_search".to_owned(),
            });
        }
        if let Some(url) = &self.github_url {
            crate::require_http_url(url, "theme.github_url")?;
        }
        if let Some(switcher) = &self.switcher {
            crate::require_non_empty(&switcher.json_url, "theme.switcher.json_url")?;
        }
        for name in [
            "static_search",
            "whatsnew",
            "cheatsheet",
            "navigation_dropdown",
            "autoapi",
            "minigallery",
        ] {
            if let Some(value) = self.extra.get(name)
                && !value.is_table()
            {
                return Err(ConfigError::Validation(format!("theme.{name} must be a table")));
            }
        }
        Ok(())
    }

    /// Raw feature table.
    pub fn section(&self, name: &str) -> Option<&toml::Table> {
        self.extra.get(name).and_then(toml::Value::as_table)
    }

    /// Parse a feature table into its typed options.
    ///
    /// Returns `Ok(None)` when the table is absent.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Section` if the table does not match `T`.
    pub fn parse_section<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ConfigError> {
        let Some(table) = self.section(name) else {
            return Ok(None);
        };
        toml::Value::Table(table.clone())
            .try_into()
            .map(Some)
            .map_err(|source| ConfigError::Section {
                section: format!("theme.{name}"),
                source,
            })
    }

    /// Write back a value into a feature table, creating the table if needed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if `name` holds a non-table value.
    pub fn set_section_value(
        &mut self,
        name: &str,
        key: &str,
        value: impl Into<toml::Value>,
    ) -> Result<(), ConfigError> {
        let entry = self
            .extra
            .entry(name.to_owned())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        let table = entry
            .as_table_mut()
            .ok_or_else(|| ConfigError::Validation(format!("theme.{name} must be a table")))?;
        table.insert(key.to_owned(), value.into());
        Ok(())
    }
}

/// Version entry matching a release for the version switcher.
///
/// Development versions map to `dev`; releases map to `major.minor`.
///
/// # Examples
///
/// ```
/// use vellum_config::version_match;
///
/// assert_eq!(version_match("1.2.3"), "1.2");
/// assert_eq!(version_match("1.3.dev0"), "dev");
/// ```
pub fn version_match(version: &str) -> String {
    if version.contains("dev") {
        return "dev".to_owned();
    }
    version.split('.').take(2).collect::<Vec<_>>().join(".")
}

/// Version tag used in search index names (`1.2.3` -> `1-2`).
pub fn search_index_version(version: &str) -> String {
    version_match(version).replace('.', "-")
}
