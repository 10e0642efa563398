//! Navbar layout file.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;

use crate::{NavbarError, NavigationOptions};

/// Entry of the navbar layout.
///
/// An entry points either at a document (`file`) or an external URL
/// (`link`). Entries with `sections` become dropdowns.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct NavEntry {
    #[serde(default)]
    pub title: Option<String>,
    /// Target document name.
    #[serde(default)]
    pub file: Option<String>,
    /// External URL.
    #[serde(default)]
    pub link: Option<String>,
    /// Text shown under the title.
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub sections: Option<Vec<NavEntry>>,
}

/// Load the layout named by `navigation_dropdown.layout_file`.
///
/// Returns `Ok(None)` when no layout is configured.
///
/// # Errors
///
/// Returns `NavbarError::NotFound` if the file is missing,
/// `NavbarError::Parse` if it is not a valid layout and `NavbarError::Io`
/// for other read failures.
pub fn load_navbar_layout(
    source_dir: &Path,
    options: Option<&NavigationOptions>,
) -> Result<Option<Vec<NavEntry>>, NavbarError> {
    let Some(layout_file) = options.and_then(|o| o.layout_file.as_deref()) else {
        return Ok(None);
    };
    let path = source_dir.join(layout_file);
    let content = fs::read_to_string(&path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => NavbarError::NotFound(layout_file.to_owned()),
        _ => NavbarError::Io {
            path: path.clone(),
            source,
        },
    })?;
    let entries: Vec<NavEntry> = serde_yaml::from_str(&content).map_err(|source| NavbarError::Parse {
        file: layout_file.to_owned(),
        source,
    })?;
    tracing::debug!(file = layout_file, entries = entries.len(), "Loaded navbar layout");
    Ok(Some(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn options(file: &str) -> NavigationOptions {
        NavigationOptions {
            layout_file: Some(file.to_owned()),
        }
    }

    #[test]
    fn test_not_configured() {
        let dir = TempDir::new().unwrap();
        assert_eq!(load_navbar_layout(dir.path(), None).unwrap(), None);
        let empty = NavigationOptions::default();
        assert_eq!(load_navbar_layout(dir.path(), Some(&empty)).unwrap(), None);
    }

    #[test]
    fn test_load_nested_layout() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("navbar.yml"),
            r"
- title: Guide
  file: guide/index
  sections:
    - title: Setup
      file: guide/setup
      caption: Install and configure
- title: Issues
  link: https://github.com/example/project/issues
",
        )
        .unwrap();

        let entries = load_navbar_layout(dir.path(), Some(&options("navbar.yml")))
            .unwrap()
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].file.as_deref(), Some("guide/index"));
        let sections = entries[0].sections.as_ref().unwrap();
        assert_eq!(sections[0].caption.as_deref(), Some("Install and configure"));
        assert_eq!(
            entries[1].link.as_deref(),
            Some("https://github.com/example/project/issues")
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_navbar_layout(dir.path(), Some(&options("navbar.yml"))).unwrap_err();
        assert!(matches!(err, NavbarError::NotFound(ref f) if f == "navbar.yml"));
    }

    #[test]
    fn test_malformed_yaml() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("navbar.yml"), "- title: [unclosed\n").unwrap();
        let err = load_navbar_layout(dir.path(), Some(&options("navbar.yml"))).unwrap_err();
        assert!(matches!(err, NavbarError::Parse { .. }));
    }
}
