//! API reference pages (`[theme.autoapi]`).
//!
//! The reference pages themselves are generated by an external autoapi run
//! into the source tree. This module fills the defaults that run reads back
//! from the theme table and repairs the generated HTML after the build.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use vellum_config::{ConfigError, ThemeOptions};

use crate::BuildError;

/// Theme table holding these options.
pub const SECTION: &str = "autoapi";

/// Member options used when the table sets none.
pub const DEFAULT_OPTIONS: [&str; 5] = [
    "members",
    "undoc-members",
    "show-inheritance",
    "show-module-summary",
    "special-members",
];

/// Icon font used by the API templates.
pub const ICON_FONT_CSS: &str = "https://www.nerdfonts.com/assets/css/webfont.css";

const PAGE_LEVELS: [&str; 6] = ["module", "class", "exception", "function", "method", "attribute"];

/// API reference options with their defaults filled in.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct AutoapiOptions {
    /// Source language of the documented package.
    #[serde(rename = "type")]
    pub kind: String,
    /// Output folder of the API pages, relative to the source directory.
    pub output: String,
    /// Smallest object that gets a page of its own.
    pub own_page_level: String,
    pub use_implicit_namespaces: bool,
    pub keep_files: bool,
    pub class_content: String,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates: Option<String>,
    /// Project name exposed to the API templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Package directory to document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

impl Default for AutoapiOptions {
    fn default() -> Self {
        Self {
            kind: "python".to_owned(),
            output: "api".to_owned(),
            own_page_level: "class".to_owned(),
            use_implicit_namespaces: true,
            keep_files: true,
            class_content: "class".to_owned(),
            options: DEFAULT_OPTIONS.iter().map(|&o| o.to_owned()).collect(),
            templates: None,
            project: None,
            directory: None,
        }
    }
}

impl AutoapiOptions {
    /// Read the options; an absent or empty table disables API pages.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Section` for a malformed table and
    /// `ConfigError::Validation` for an unknown `own_page_level`.
    pub fn from_theme(theme: &ThemeOptions) -> Result<Option<Self>, ConfigError> {
        if theme.section(SECTION).is_none_or(toml::Table::is_empty) {
            return Ok(None);
        }
        let Some(options) = theme.parse_section::<Self>(SECTION)? else {
            return Ok(None);
        };
        if !PAGE_LEVELS.contains(&options.own_page_level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "theme.autoapi.own_page_level must be one of {}, got `{}`",
                PAGE_LEVELS.join(", "),
                options.own_page_level
            )));
        }
        Ok(Some(options))
    }

    /// Write the effective options back into the theme table.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the table is not a table.
    pub fn apply_to_theme(&self, theme: &mut ThemeOptions) -> Result<(), ConfigError> {
        theme.set_section_value(SECTION, "type", self.kind.clone())?;
        theme.set_section_value(SECTION, "output", self.output.clone())?;
        theme.set_section_value(SECTION, "own_page_level", self.own_page_level.clone())?;
        theme.set_section_value(SECTION, "use_implicit_namespaces", self.use_implicit_namespaces)?;
        theme.set_section_value(SECTION, "keep_files", self.keep_files)?;
        theme.set_section_value(SECTION, "class_content", self.class_content.clone())?;
        theme.set_section_value(SECTION, "options", self.options.clone())?;
        Ok(())
    }
}

/// Turn `&lt;` and `&gt;` back into `<` and `>` in every page under
/// `<outdir>/<api_root>`.
///
/// API signatures carry markup that the page writer escapes. Returns the
/// number of rewritten files; a missing folder rewrites nothing.
///
/// # Errors
///
/// Returns `BuildError::Pattern` if the folder name breaks the glob and
/// `BuildError::Io` if a page cannot be read or written.
pub fn unescape_api_pages(outdir: &Path, api_root: &str) -> Result<usize, BuildError> {
    let api_dir = outdir.join(api_root);
    if !api_dir.is_dir() {
        return Ok(0);
    }
    let pattern = format!("{}/**/*.html", glob::Pattern::escape(&api_dir.to_string_lossy()));
    let pages = glob::glob(&pattern).map_err(|source| BuildError::Pattern {
        pattern: pattern.clone(),
        source,
    })?;

    let mut rewritten = 0;
    for page in pages {
        let page = page.map_err(|e| BuildError::Io {
            path: e.path().to_path_buf(),
            source: e.into_error(),
        })?;
        let html = fs::read_to_string(&page).map_err(|source| BuildError::Io {
            path: page.clone(),
            source,
        })?;
        if !html.contains("&lt;") && !html.contains("&gt;") {
            continue;
        }
        let html = html.replace("&lt;", "<").replace("&gt;", ">");
        fs::write(&page, html).map_err(|source| BuildError::Io {
            path: page.clone(),
            source,
        })?;
        rewritten += 1;
    }
    Ok(rewritten)
}
