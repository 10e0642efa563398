//! Search index output.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::SearchError;
use crate::indexer::SearchRecord;

/// Index location relative to the output directory.
pub const SEARCH_INDEX_PATH: &str = "_static/search.json";

/// Write records as pretty-printed JSON to `<outdir>/_static/search.json`.
///
/// Returns the path written.
///
/// # Errors
///
/// Returns `SearchError::Io` if the directory or file cannot be written.
pub fn write_search_index(records: &[SearchRecord], outdir: &Path) -> Result<PathBuf, SearchError> {
    let path = outdir.join(SEARCH_INDEX_PATH);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| SearchError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut serializer)?;

    fs::write(&path, buf).map_err(|source| SearchError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), records = records.len(), "Wrote search index");
    Ok(path)
}
