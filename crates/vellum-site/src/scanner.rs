//! Source discovery by filesystem walking.
//!
//! The scanner only finds Markdown files; reading and parsing them is left to
//! the `doctree-read` stage.

use std::fs;
use std::path::{Path, PathBuf};

use vellum_config::DocsConfig;

use crate::BuildError;

/// A Markdown source file and the document name it maps to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    /// `/`-separated path relative to the source directory, no extension.
    pub docname: String,
    pub path: PathBuf,
}

/// Finds Markdown sources under the docs source directory.
///
/// Hidden entries, directories starting with `_` (`_build`, `_static`, ...),
/// the output directory and files matching `docs.exclude` are skipped.
#[derive(Debug)]
pub struct Scanner {
    source_dir: PathBuf,
    output_dir: PathBuf,
    exclude: Vec<glob::Pattern>,
}

impl Scanner {
    /// Create a scanner for the configured docs directories.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::Pattern` if an exclude pattern is not a valid glob.
    pub fn new(docs: &DocsConfig) -> Result<Self, BuildError> {
        let exclude = docs
            .exclude
            .iter()
            .map(|pattern| {
                glob::Pattern::new(pattern).map_err(|source| BuildError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            source_dir: docs.source_dir.clone(),
            output_dir: docs.output_dir.clone(),
            exclude,
        })
    }

    /// Scan the source directory; sources are sorted by document name.
    ///
    /// Returns an empty list if the source directory doesn't exist.
    pub fn scan(&self) -> Vec<SourceFile> {
        let mut sources = Vec::new();
        if self.source_dir.is_dir() {
            self.scan_directory(&self.source_dir, "", &mut sources);
        }
        sources.sort_by(|a, b| a.docname.cmp(&b.docname));
        sources
    }

    fn scan_directory(&self, dir: &Path, prefix: &str, sources: &mut Vec<SourceFile>) {
        let Ok(entries) = fs::read_dir(dir) else {
            tracing::warn!(dir = %dir.display(), "Cannot read source directory");
            return;
        };

        for entry in entries.filter_map(Result::ok) {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let path = entry.path();
            let relative = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };

            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                if name.starts_with('_') || path == self.output_dir {
                    continue;
                }
                self.scan_directory(&path, &relative, sources);
            } else if path.extension().is_some_and(|ext| ext == "md") {
                if self.is_excluded(&relative) {
                    tracing::debug!(file = %relative, "Excluded source");
                    continue;
                }
                let docname = relative.trim_end_matches(".md").to_owned();
                sources.push(SourceFile { docname, path });
            }
        }
    }

    fn is_excluded(&self, relative: &str) -> bool {
        self.exclude.iter().any(|pattern| pattern.matches(relative))
    }
}
