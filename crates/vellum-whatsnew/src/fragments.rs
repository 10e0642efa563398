//! What's new fragments file loading and grouping.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::WhatsnewError;

/// One what's new entry.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Fragment {
    /// Release that introduced the feature (`0.3.1`).
    #[serde(deserialize_with = "version_string")]
    pub version: String,
    pub title: String,
    /// Loosely RST-formatted body text.
    #[serde(default)]
    pub content: String,
}

impl Fragment {
    /// Grouping key: the first two dot-separated components.
    pub fn minor_version(&self) -> String {
        self.version.split('.').take(2).collect::<Vec<_>>().join(".")
    }
}

/// Versions must be strings; integers such as `1` are accepted.
///
/// Unquoted floats are rejected: `0.10` would otherwise read as `0.1`.
fn version_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) if !n.is_f64() => Ok(n.to_string()),
        serde_yaml::Value::Number(n) => Err(serde::de::Error::custom(format!(
            "version {n} must be quoted, e.g. version: \"{n}\""
        ))),
        other => Err(serde::de::Error::custom(format!(
            "expected version string, got {other:?}"
        ))),
    }
}

#[derive(Deserialize)]
struct FragmentsFile {
    #[serde(default)]
    fragments: Vec<Fragment>,
}

/// Fragments grouped by minor version, in first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FragmentIndex {
    groups: Vec<(String, Vec<Fragment>)>,
}

impl FragmentIndex {
    /// Group fragments by `major.minor`.
    pub fn group(fragments: impl IntoIterator<Item = Fragment>) -> Self {
        let mut index = Self::default();
        for fragment in fragments {
            let minor = fragment.minor_version();
            match index.groups.iter_mut().find(|(key, _)| *key == minor) {
                Some((_, group)) => group.push(fragment),
                None => index.groups.push((minor, vec![fragment])),
            }
        }
        index
    }

    /// Fragments for a minor version.
    pub fn get(&self, minor: &str) -> Option<&[Fragment]> {
        self.groups
            .iter()
            .find(|(key, _)| key == minor)
            .map(|(_, group)| group.as_slice())
    }

    /// Minor versions in first-seen order.
    pub fn minor_versions(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(key, _)| key.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Load and group the fragments file.
///
/// A missing file disables the feature and returns `Ok(None)`.
///
/// # Errors
///
/// Returns `WhatsnewError::Io` if the file cannot be read and
/// `WhatsnewError::Parse` for malformed YAML.
pub fn load_fragments(path: &Path) -> Result<Option<FragmentIndex>, WhatsnewError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "what's new fragments file not found");
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|source| WhatsnewError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_fragments(&content, path).map(Some)
}

fn parse_fragments(content: &str, path: &Path) -> Result<FragmentIndex, WhatsnewError> {
    let file: FragmentsFile =
        serde_yaml::from_str(content).map_err(|source| WhatsnewError::Parse {
            path: PathBuf::from(path),
            source,
        })?;
    Ok(FragmentIndex::group(file.fragments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
fragments:
  - title: Faster startup
    version: 0.3.1
    content: |
      Startup is **faster**.
  - title: New theme
    version: 0.3.0
    content: Dark mode.
  - title: Old thing
    version: "0.2"
    content: Removed.
"#;

    #[test]
    fn test_group_by_minor_version() {
        let index = parse_fragments(SAMPLE, Path::new("whatsnew.yml")).unwrap();
        assert_eq!(index.minor_versions().collect::<Vec<_>>(), vec!["0.3", "0.2"]);
        let titles: Vec<_> = index
            .get("0.3")
            .unwrap()
            .iter()
            .map(|f| f.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Faster startup", "New theme"]);
        assert_eq!(index.get("0.2").unwrap()[0].version, "0.2");
        assert!(index.get("0.1").is_none());
    }

    #[test]
    fn test_unquoted_float_version_is_error() {
        let content = "fragments:\n  - title: Tables\n    version: 0.10\n";
        let err = parse_fragments(content, Path::new("whatsnew.yml")).unwrap_err();
        assert!(matches!(err, WhatsnewError::Parse { .. }));
        assert!(err.to_string().contains("must be quoted"), "{err}");
    }

    #[test]
    fn test_quoted_minor_version_keeps_trailing_zero() {
        let content = "fragments:\n  - title: Tables\n    version: \"0.10\"\n  - title: Major\n    version: 1\n";
        let index = parse_fragments(content, Path::new("whatsnew.yml")).unwrap();
        assert_eq!(index.minor_versions().collect::<Vec<_>>(), vec!["0.10", "1"]);
    }

    #[test]
    fn test_missing_file_disables_feature() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_fragments(&dir.path().join("whatsnew.yml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("whatsnew.yml");
        std::fs::write(&path, "fragments: [unclosed").unwrap();
        let err = load_fragments(&path).unwrap_err();
        assert!(matches!(err, WhatsnewError::Parse { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("whatsnew.yml");
        std::fs::write(&path, SAMPLE).unwrap();
        let index = load_fragments(&path).unwrap().unwrap();
        assert!(!index.is_empty());
    }
}
