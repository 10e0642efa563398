//! Build pipeline and page rendering for Vellum.
//!
//! A build threads one [`BuildContext`] through the ordered stages of a
//! [`Pipeline`]:
//!
//! 1. `config-inited`: theme defaults, search and feature options
//! 2. `builder-inited`: navbar layout, cheat sheet, source links
//! 3. `doctree-read`: source discovery, parsing, per-document transforms
//! 4. `env-updated`: what's new sidebar
//! 5. `html-page-context`: page contexts, rendering, writing
//! 6. `build-finished`: search index, static assets, 404 page
//! 7. `api-pages-finished`: markup repair in generated API pages
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use vellum_config::Config;
//!
//! let config = Config::load(None, None)?;
//! let report = vellum_site::build(config)?;
//! println!("{} pages in {}", report.pages, report.output_dir.display());
//! # Ok(())
//! # }
//! ```

mod autoapi;
mod context;
mod minigallery;
mod page;
mod pipeline;
mod scanner;
mod stages;
mod templates;

use std::path::PathBuf;

use vellum_assets::AssetError;
use vellum_cheatsheet::CheatsheetError;
use vellum_config::{Config, ConfigError};
use vellum_linkcode::LinkcodeError;
use vellum_navbar::NavbarError;
use vellum_search::SearchError;
use vellum_whatsnew::WhatsnewError;

pub use autoapi::{AutoapiOptions, unescape_api_pages};
pub use context::BuildContext;
pub use minigallery::{GalleryExample, MinigalleryOptions};
pub use page::{
    BreadcrumbData, CheatsheetData, PageContext, PageData, ProjectData, THEME_VERSION, TocData, page_breadcrumbs,
    page_toc, root_prefix,
};
pub use pipeline::{Pipeline, Stage};
pub use scanner::{Scanner, SourceFile};
pub use stages::{
    ApiPagesFinished, BuildFinished, BuilderInited, ConfigInited, DoctreeRead, EnvUpdated, HtmlPageContext,
};
pub use templates::{TEMPLATE_NAMES, Templates};

/// Summary of a finished build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Pages written, including `404.html`.
    pub pages: usize,
    pub search_records: usize,
    pub output_dir: PathBuf,
}

/// Run the standard pipeline over `config`.
///
/// # Errors
///
/// Returns the error of the first failing stage.
pub fn build(config: Config) -> Result<BuildReport, BuildError> {
    build_with(BuildContext::new(config))
}

/// Run the standard pipeline over a prepared context.
///
/// # Errors
///
/// Returns the error of the first failing stage.
pub fn build_with(ctx: BuildContext) -> Result<BuildReport, BuildError> {
    build_observed(ctx, |_| {})
}

/// Run the standard pipeline, calling `observe` as each stage starts.
///
/// # Errors
///
/// Returns the error of the first failing stage.
pub fn build_observed(mut ctx: BuildContext, observe: impl FnMut(&'static str)) -> Result<BuildReport, BuildError> {
    Pipeline::standard().run_observed(&mut ctx, observe)?;
    Ok(BuildReport {
        pages: ctx.pages.len(),
        search_records: ctx.search_records,
        output_dir: ctx.output_dir().to_path_buf(),
    })
}

/// Build error.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Whatsnew(#[from] WhatsnewError),
    #[error(transparent)]
    Navbar(#[from] NavbarError),
    #[error(transparent)]
    Linkcode(#[from] LinkcodeError),
    #[error(transparent)]
    Cheatsheet(#[from] CheatsheetError),
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error("Failed to serialize page context: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid glob pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
