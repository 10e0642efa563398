//! Locating documented objects in source files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// Python `def`/`class` header: indentation, keyword, name.
static DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)(?:async\s+def|def|class)\s+([A-Za-z_][A-Za-z0-9_]*)\b")
        .expect("invalid definition regex")
});

/// Lines of a documented object in a source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceSpan {
    /// Path relative to the locator root, `/`-separated.
    pub file: String,
    /// First line (1-based), including decorators.
    pub start_line: usize,
    /// Last non-blank line (1-based).
    pub end_line: usize,
}

/// Finds where a documented object is defined.
pub trait SourceLocator {
    /// Locate `fullname` (dotted path inside `module`).
    ///
    /// Returns `None` when the module or object cannot be found.
    fn locate(&self, module: &str, fullname: &str) -> Option<SourceSpan>;
}

/// Locates Python objects by scanning source files under a root directory.
#[derive(Clone, Debug)]
pub struct PythonSourceLocator {
    root: PathBuf,
}

impl PythonSourceLocator {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Source file of a dotted module name, relative to the root.
    fn module_file(&self, module: &str) -> Option<String> {
        let base = module.replace('.', "/");
        [format!("{base}.py"), format!("{base}/__init__.py")]
            .into_iter()
            .find(|candidate| self.root.join(candidate).is_file())
    }
}

impl SourceLocator for PythonSourceLocator {
    fn locate(&self, module: &str, fullname: &str) -> Option<SourceSpan> {
        let file = self.module_file(module)?;
        let source = match fs::read_to_string(self.root.join(&file)) {
            Ok(source) => source,
            Err(e) => {
                tracing::debug!(file = %file, error = %e, "Cannot read module source");
                return None;
            }
        };
        let lines: Vec<&str> = source.lines().collect();
        let (start, end) = find_object(&lines, fullname)?;
        Some(SourceSpan {
            file,
            start_line: start + 1,
            end_line: end + 1,
        })
    }
}

/// Zero-based line range of a dotted object path.
fn find_object(lines: &[&str], fullname: &str) -> Option<(usize, usize)> {
    let mut range = (0, lines.len());
    let mut indent = 0;
    let mut found = None;

    for part in fullname.split('.') {
        let header = (range.0..range.1).find(|&idx| {
            DEFINITION
                .captures(lines[idx])
                .is_some_and(|caps| caps[1].len() == indent && &caps[2] == part)
        })?;
        let end = block_end(lines, header, indent);
        let start = decorators_start(lines, header, indent);
        found = Some((start, end));

        range = (header + 1, end + 1);
        indent = body_indent(lines, range).unwrap_or(indent + 4);
    }
    found
}

/// Last non-blank line of the block opened at `header`.
fn block_end(lines: &[&str], header: usize, indent: usize) -> usize {
    let mut end = header;
    for (idx, line) in lines.iter().enumerate().skip(header + 1) {
        if line.trim().is_empty() {
            continue;
        }
        if indentation(line) <= indent {
            break;
        }
        end = idx;
    }
    end
}

/// First decorator line directly above `header`.
fn decorators_start(lines: &[&str], header: usize, indent: usize) -> usize {
    let mut start = header;
    while start > 0 {
        let line = lines[start - 1];
        if indentation(line) == indent && line.trim_start().starts_with('@') {
            start -= 1;
        } else {
            break;
        }
    }
    start
}

/// Indentation of the first non-blank line in the range.
fn body_indent(lines: &[&str], (start, end): (usize, usize)) -> Option<usize> {
    lines[start..end]
        .iter()
        .find(|line| !line.trim().is_empty())
        .map(|line| indentation(line))
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start().len()
}
