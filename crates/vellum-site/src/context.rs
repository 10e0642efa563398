//! Mutable state shared by the build stages.

use std::fs;
use std::path::{Path, PathBuf};

use vellum_cheatsheet::{CheatsheetOptions, ProcessRunner, ToolRunner};
use vellum_config::Config;
use vellum_doctree::DocumentSet;
use vellum_linkcode::LinkcodeResolver;
use vellum_navbar::NavbarRenderer;
use vellum_search::SearchOptions;
use vellum_whatsnew::{WhatsnewEntry, WhatsnewOptions, WhatsnewPaths};

use crate::BuildError;
use crate::autoapi::AutoapiOptions;
use crate::minigallery::MinigalleryOptions;

/// State of one build, threaded through every [`Stage`](crate::Stage).
///
/// Feature options start empty and are filled by the `config-inited` stage;
/// documents by `doctree-read`.
pub struct BuildContext {
    pub config: Config,
    pub documents: DocumentSet,
    pub search: SearchOptions,
    pub whatsnew: Option<WhatsnewOptions>,
    pub whatsnew_paths: Option<WhatsnewPaths>,
    /// Sidebar rollup of the changelog.
    pub whatsnew_entries: Vec<WhatsnewEntry>,
    pub navbar: NavbarRenderer,
    pub cheatsheet: Option<CheatsheetOptions>,
    pub autoapi: Option<AutoapiOptions>,
    pub minigallery: Option<MinigalleryOptions>,
    /// Present when source links or API edit links can be resolved.
    pub linkcode: Option<LinkcodeResolver>,
    /// Written pages, relative to the output directory.
    pub pages: Vec<String>,
    /// Number of records in the search index.
    pub search_records: usize,
    pub(crate) tool_runner: Box<dyn ToolRunner>,
}

impl BuildContext {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            documents: DocumentSet::new(),
            search: SearchOptions::default(),
            whatsnew: None,
            whatsnew_paths: None,
            whatsnew_entries: Vec::new(),
            navbar: NavbarRenderer::default(),
            cheatsheet: None,
            autoapi: None,
            minigallery: None,
            linkcode: None,
            pages: Vec::new(),
            search_records: 0,
            tool_runner: Box::new(ProcessRunner),
        }
    }

    /// Run external tools through `runner` instead of child processes.
    #[must_use]
    pub fn with_tool_runner(mut self, runner: impl ToolRunner + 'static) -> Self {
        self.tool_runner = Box::new(runner);
        self
    }

    pub fn tool_runner(&self) -> &dyn ToolRunner {
        self.tool_runner.as_ref()
    }

    pub fn source_dir(&self) -> &Path {
        &self.config.docs_resolved.source_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.docs_resolved.output_dir
    }

    /// Write `contents` to `relative` under the output directory.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::Io` if the file or its parent cannot be created.
    pub fn write_output(&self, relative: &str, contents: &str) -> Result<PathBuf, BuildError> {
        let path = self.output_dir().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| BuildError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, contents).map_err(|source| BuildError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Copy the files of `src` into `dst`, recursively.
///
/// Returns the number of files copied; a missing `src` copies nothing.
pub(crate) fn copy_tree(src: &Path, dst: &Path) -> Result<usize, BuildError> {
    if !src.is_dir() {
        return Ok(0);
    }
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| BuildError::Io { path, source }
    };

    fs::create_dir_all(dst).map_err(io_err(dst))?;
    let mut copied = 0;
    for entry in fs::read_dir(src).map_err(io_err(src))? {
        let entry = entry.map_err(io_err(src))?;
        let target = dst.join(entry.file_name());
        if entry.file_type().map_err(io_err(&entry.path()))?.is_dir() {
            copied += copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(io_err(&target))?;
            copied += 1;
        }
    }
    Ok(copied)
}
