//! Template context for rendered pages.

use serde::Serialize;
use vellum_cheatsheet::CheatsheetOptions;
use vellum_config::{Config, ThemeOptions};
use vellum_doctree::{Document, DocumentSet, Node, relative_path};
use vellum_whatsnew::WhatsnewEntry;

/// Version printed in the page footer.
pub const THEME_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Deepest heading level listed in the page table of contents.
const TOC_MAX_LEVEL: u8 = 3;

/// Project metadata exposed to templates.
#[derive(Debug, Serialize)]
pub struct ProjectData {
    pub name: String,
    pub title: String,
    pub version: String,
    pub copyright: Option<String>,
}

impl ProjectData {
    pub fn from_config(config: &Config) -> Self {
        Self {
            name: config.project.name.clone(),
            title: config.project.html_title().to_owned(),
            version: config.project.version.clone(),
            copyright: config.project.copyright.clone(),
        }
    }
}

/// Data for a breadcrumb entry.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct BreadcrumbData {
    pub title: String,
    pub url: String,
}

/// Data for a table of contents entry.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct TocData {
    pub level: u8,
    pub title: String,
    pub id: String,
}

/// Built cheat sheet shown in a page sidebar.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CheatsheetData {
    pub title: Option<String>,
    pub pdf: String,
    pub thumbnail: String,
}

impl CheatsheetData {
    /// `None` until the cheat sheet has been built.
    pub fn from_options(options: &CheatsheetOptions) -> Option<Self> {
        Some(Self {
            title: options.title.clone(),
            pdf: options.output_dir.clone()?,
            thumbnail: options.thumbnail.clone()?,
        })
    }
}

/// Per-document part of the context.
#[derive(Debug, Serialize)]
pub struct PageData {
    /// Document name.
    pub name: String,
    pub title: String,
    /// Rendered document body.
    pub body: String,
    pub breadcrumbs: Vec<BreadcrumbData>,
    pub toc: Vec<TocData>,
    pub edit_url: Option<String>,
}

/// Everything a page template can reference.
#[derive(Debug, Serialize)]
pub struct PageContext<'a> {
    pub project: ProjectData,
    pub master_doc: &'a str,
    /// Prefix leading from the page back to the output root.
    pub root: String,
    pub theme: &'a ThemeOptions,
    pub theme_version: &'static str,
    /// Search options as a JSON object literal.
    pub search_options: String,
    pub navbar_html: Option<String>,
    pub whatsnew: Option<&'a [WhatsnewEntry]>,
    pub cheatsheet: Option<CheatsheetData>,
    /// Extra stylesheets linked from every page.
    pub css_files: Vec<&'static str>,
    pub minigallery_html: Option<String>,
    pub page: Option<PageData>,
    pub issue_page: Option<String>,
}

impl<'a> PageContext<'a> {
    /// Context shared by every page; page-specific fields are left empty.
    pub fn new(config: &'a Config, root: String, search_options: String) -> Self {
        Self {
            project: ProjectData::from_config(config),
            master_doc: &config.docs_resolved.master_doc,
            root,
            theme: &config.theme,
            theme_version: THEME_VERSION,
            search_options,
            navbar_html: None,
            whatsnew: None,
            cheatsheet: None,
            css_files: Vec::new(),
            minigallery_html: None,
            page: None,
            issue_page: None,
        }
    }
}

/// Relative prefix from `docname`'s page to the output root (`""` at the top).
pub fn root_prefix(docname: &str) -> String {
    "../".repeat(docname.matches('/').count())
}

/// Headings below the document title, down to level 3.
pub fn page_toc(document: &Document) -> Vec<TocData> {
    let mut toc = Vec::new();
    for node in &document.children {
        if let Node::Section(section) = node {
            collect_toc(&section.children, 2, &mut toc);
        }
    }
    toc
}

fn collect_toc(nodes: &[Node], level: u8, toc: &mut Vec<TocData>) {
    if level > TOC_MAX_LEVEL {
        return;
    }
    for node in nodes {
        if let Node::Section(section) = node {
            if let (Some(id), Some(title)) = (node.id(), node.section_title_text()) {
                toc.push(TocData {
                    level,
                    title,
                    id: id.to_owned(),
                });
            }
            collect_toc(&section.children, level + 1, toc);
        }
    }
}

/// Configured extra breadcrumbs followed by the page's parent documents.
pub fn page_breadcrumbs(docname: &str, documents: &DocumentSet, additional: &[(String, String)]) -> Vec<BreadcrumbData> {
    let mut crumbs: Vec<BreadcrumbData> = additional
        .iter()
        .map(|(title, url)| BreadcrumbData {
            title: title.clone(),
            url: url.clone(),
        })
        .collect();

    let page = format!("{docname}.html");
    crumbs.extend(documents.parents(docname).into_iter().map(|(parent, title)| BreadcrumbData {
        title,
        url: relative_path(&page, &format!("{parent}.html")),
    }));
    crumbs
}

/// GitHub issues page of the project, for the 404 page.
pub fn issue_page(config: &Config) -> Option<String> {
    if let Some(library) = config.html_context.library() {
        return Some(format!("https://github.com/{library}/issues/"));
    }
    config
        .theme
        .github_url
        .as_deref()
        .map(|url| format!("{}/issues/", url.trim_end_matches('/')))
}
