//! Quarto cheat sheet builds.
//!
//! When `[theme.cheatsheet]` names a `.qmd` file, it is rendered to a PDF in
//! the output's `_static` directory and its first page is rasterized into a
//! thumbnail shown in the sidebar of the configured pages.

mod build;
mod runner;

use std::path::PathBuf;

use serde::Deserialize;
use vellum_config::{ConfigError, ThemeOptions};

pub use build::{
    CheatsheetOutput, QUARTO_EXTENSION, QUARTO_EXTENSION_VERSION, build_cheatsheet, build_cheatsheet_with,
};
pub use runner::{ProcessRunner, QuartoRunner, ToolRunner};

/// Theme table holding these options.
pub const SECTION: &str = "cheatsheet";

/// `[theme.cheatsheet]` options.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CheatsheetOptions {
    /// Quarto source, relative to the source directory.
    pub file: Option<String>,
    /// Version printed on the cheat sheet.
    pub version: String,
    /// Pages showing the cheat sheet in their sidebar.
    #[serde(deserialize_with = "one_or_many")]
    pub pages: Vec<String>,
    pub title: Option<String>,
    /// Built PDF, relative to the output directory.
    pub output_dir: Option<String>,
    /// Built thumbnail, relative to the output directory.
    pub thumbnail: Option<String>,
}

impl Default for CheatsheetOptions {
    fn default() -> Self {
        Self {
            file: None,
            version: "main".to_owned(),
            pages: vec!["index".to_owned()],
            title: None,
            output_dir: None,
            thumbnail: None,
        }
    }
}

impl CheatsheetOptions {
    /// Read the options from the theme.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Section` for a malformed table.
    pub fn from_theme(theme: &ThemeOptions) -> Result<Option<Self>, ConfigError> {
        theme.parse_section(SECTION)
    }

    /// Record a finished build here and in the theme table.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the theme entry is not a table.
    pub fn apply_output(&mut self, output: &CheatsheetOutput, theme: &mut ThemeOptions) -> Result<(), ConfigError> {
        theme.set_section_value(SECTION, "output_dir", output.pdf.as_str())?;
        theme.set_section_value(SECTION, "thumbnail", output.thumbnail.as_str())?;
        self.output_dir = Some(output.pdf.clone());
        self.thumbnail = Some(output.thumbnail.clone());
        Ok(())
    }

    /// Whether `page` shows the cheat sheet in its sidebar.
    pub fn shows_on(&self, page: &str) -> bool {
        self.pages.iter().any(|p| p == page)
    }
}

/// Pages showing the cheat sheet sidebar; empty when not configured.
pub fn cheatsheet_sidebar_pages(options: Option<&CheatsheetOptions>) -> &[String] {
    options.map_or(&[][..], |o| o.pages.as_slice())
}

/// Accept a single page name or a list of them.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(page) => vec![page],
        OneOrMany::Many(pages) => pages,
    })
}

/// Cheat sheet build error.
#[derive(Debug, thiserror::Error)]
pub enum CheatsheetError {
    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("Failed to build cheat sheet: {} does not exist", .0.display())]
    MissingOutput(PathBuf),
    #[error("Failed to clean up {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn theme(toml: &str) -> ThemeOptions {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_defaults() {
        let options = CheatsheetOptions::from_theme(&theme("[cheatsheet]\nfile = \"cheat.qmd\"\n"))
            .unwrap()
            .unwrap();
        assert_eq!(options.version, "main");
        assert_eq!(options.pages, vec!["index".to_owned()]);
        assert!(options.shows_on("index"));
    }

    #[test]
    fn test_pages_as_string_or_list() {
        let single = CheatsheetOptions::from_theme(&theme("[cheatsheet]\npages = \"guide\"\n"))
            .unwrap()
            .unwrap();
        assert_eq!(single.pages, vec!["guide".to_owned()]);

        let many = CheatsheetOptions::from_theme(&theme("[cheatsheet]\npages = [\"a\", \"b\"]\n"))
            .unwrap()
            .unwrap();
        assert_eq!(cheatsheet_sidebar_pages(Some(&many)), &["a".to_owned(), "b".to_owned()]);
        assert!(cheatsheet_sidebar_pages(None).is_empty());
    }

    #[test]
    fn test_apply_output_writes_back() {
        let mut theme = theme("[cheatsheet]\nfile = \"cheat.qmd\"\n");
        let mut options = CheatsheetOptions::from_theme(&theme).unwrap().unwrap();
        let output = CheatsheetOutput {
            pdf: "_static/cheat.pdf".to_owned(),
            thumbnail: "_static/cheat.png".to_owned(),
        };

        options.apply_output(&output, &mut theme).unwrap();

        assert_eq!(options.thumbnail.as_deref(), Some("_static/cheat.png"));
        let reread = CheatsheetOptions::from_theme(&theme).unwrap().unwrap();
        assert_eq!(reread.output_dir.as_deref(), Some("_static/cheat.pdf"));
        assert_eq!(reread.thumbnail.as_deref(), Some("_static/cheat.png"));
    }
}
