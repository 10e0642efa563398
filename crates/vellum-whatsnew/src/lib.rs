//! Changelog grouping and "What's New" sections.
//!
//! Given the parsed changelog document and an optional fragments file, the
//! transform groups patch releases under synthesized `Version x.y` headers
//! and adds a "What's New" section of dropdowns under every minor version
//! that has fragments. [`extract_whatsnew`] then builds the sidebar rollup.
//!
//! Configured through the `[theme.whatsnew]` table:
//!
//! ```toml
//! [theme.whatsnew]
//! whatsnew_file_name = "whatsnew.yml"
//! changelog_file_name = "changelog.md"
//! sidebar_pages = ["index"]
//! sidebar_no_of_headers = 3
//! ```

mod changelog;
mod content;
mod fragments;
mod markup;
mod sidebar;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use vellum_config::{ConfigError, ThemeOptions};

pub use changelog::add_whatsnew_changelog;
pub use content::{fragment_dropdown, render_fragment_body, whatsnew_section};
pub use fragments::{Fragment, FragmentIndex, load_fragments};
pub use markup::split_inline;
pub use sidebar::{WhatsnewEntry, WhatsnewItem, extract_whatsnew, whatsnew_sidebar_pages};

/// Theme table holding these options.
pub const SECTION: &str = "whatsnew";

/// What's new options.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct WhatsnewOptions {
    /// Fragments file, relative to the docs source directory.
    #[serde(default)]
    pub whatsnew_file_name: Option<String>,
    /// Changelog source file, relative to the docs source directory.
    #[serde(default)]
    pub changelog_file_name: Option<String>,
    /// Minor versions shown in the sidebar.
    #[serde(default = "default_sidebar_headers")]
    pub sidebar_no_of_headers: usize,
    /// Items shown per minor version; all when unset.
    #[serde(default)]
    pub sidebar_no_of_contents: Option<usize>,
    /// Pages showing the sidebar.
    #[serde(default)]
    pub sidebar_pages: Vec<String>,
}

fn default_sidebar_headers() -> usize {
    3
}

impl WhatsnewOptions {
    /// Read options from the theme; `Ok(None)` when not configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Section` for a malformed table.
    pub fn from_theme(theme: &ThemeOptions) -> Result<Option<Self>, ConfigError> {
        theme.parse_section(SECTION)
    }
}

/// Fragments and changelog locations resolved against the source directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WhatsnewPaths {
    pub fragments_file: Option<PathBuf>,
    pub changelog_file: PathBuf,
    /// Document name of the changelog (`changelog_file` without extension).
    pub changelog_docname: String,
}

impl WhatsnewPaths {
    /// Resolve file names; `None` when no changelog is configured.
    pub fn resolve(options: &WhatsnewOptions, source_dir: &Path) -> Option<Self> {
        let changelog = options.changelog_file_name.as_deref()?;
        let docname = Path::new(changelog)
            .with_extension("")
            .to_string_lossy()
            .replace('\\', "/");
        Some(Self {
            fragments_file: options
                .whatsnew_file_name
                .as_deref()
                .map(|name| source_dir.join(name)),
            changelog_file: source_dir.join(changelog),
            changelog_docname: docname,
        })
    }
}

/// What's new error.
#[derive(Debug, thiserror::Error)]
pub enum WhatsnewError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid fragments file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_options_from_theme() {
        let theme: ThemeOptions = toml::from_str(
            "[whatsnew]\nwhatsnew_file_name = \"whatsnew.yml\"\nchangelog_file_name = \"release/changelog.md\"\n",
        )
        .unwrap();
        let options = WhatsnewOptions::from_theme(&theme).unwrap().unwrap();
        assert_eq!(options.sidebar_no_of_headers, 3);
        assert_eq!(options.sidebar_no_of_contents, None);

        let paths = WhatsnewPaths::resolve(&options, Path::new("/docs")).unwrap();
        assert_eq!(paths.fragments_file, Some(PathBuf::from("/docs/whatsnew.yml")));
        assert_eq!(paths.changelog_file, PathBuf::from("/docs/release/changelog.md"));
        assert_eq!(paths.changelog_docname, "release/changelog");
    }

    #[test]
    fn test_not_configured() {
        let theme = ThemeOptions::default();
        assert_eq!(WhatsnewOptions::from_theme(&theme).unwrap(), None);
    }

    #[test]
    fn test_paths_without_changelog() {
        let options = WhatsnewOptions {
            whatsnew_file_name: Some("whatsnew.yml".to_owned()),
            changelog_file_name: None,
            sidebar_no_of_headers: 3,
            sidebar_no_of_contents: None,
            sidebar_pages: Vec::new(),
        };
        assert_eq!(WhatsnewPaths::resolve(&options, Path::new("/docs")), None);
    }
}
