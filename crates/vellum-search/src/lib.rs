//! Static search index for Vellum sites.
//!
//! Documents are split into one record per top-level section plus one per
//! API description. Records are written to `_static/search.json` and
//! searched in the browser.
//!
//! ```
//! use std::path::Path;
//!
//! use vellum_doctree::{DocumentSet, parse_document};
//! use vellum_search::{SearchIndexer, SearchOptions};
//!
//! let mut docs = DocumentSet::new();
//! docs.insert(parse_document("index", Path::new("index.md"), "# Home\n\nHello.\n"));
//!
//! let records = SearchIndexer::new(SearchOptions::default()).unwrap().build_index(&docs);
//! assert_eq!(records[0].href, "index.html#home");
//! assert_eq!(records[0].text, "Hello.");
//! ```

mod indexer;
mod options;
mod writer;

use std::path::PathBuf;

pub use indexer::{SearchIndexer, SearchRecord, title_to_anchor};
pub use options::{NodeFilter, SEARCH_KEYS, SECTION, SearchOptions};
pub use writer::{SEARCH_INDEX_PATH, write_search_index};

use vellum_config::ConfigError;

/// Search index error.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize search index: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid index pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}
