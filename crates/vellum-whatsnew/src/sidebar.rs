//! What's new sidebar rollup.

use serde::Serialize;
use vellum_doctree::{Document, Node};

use crate::WhatsnewOptions;

/// One what's new item under a version in the sidebar.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct WhatsnewItem {
    pub title: String,
    pub url: String,
}

/// Sidebar block for one minor version.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct WhatsnewEntry {
    /// `"{html_title} Version x.y"`.
    pub title: String,
    /// Link to the version header.
    pub title_url: String,
    /// Link to the "What's New" section.
    pub url: String,
    pub children: Vec<WhatsnewItem>,
}

/// Collect sidebar entries from a transformed changelog document.
///
/// Only `version-*` sections holding a `{id}-whatsnew` section count; the
/// first `sidebar_no_of_headers` are kept.
pub fn extract_whatsnew(document: &Document, options: &WhatsnewOptions, html_title: &str) -> Vec<WhatsnewEntry> {
    let page = document.html_path();
    document
        .sections()
        .filter(|section| is_minor_header(section))
        .take(options.sidebar_no_of_headers)
        .filter_map(|version| {
            let version_id = version.id()?;
            let version_title = version.section_title_text()?;
            let whatsnew = version.descendants().find(|node| {
                matches!(node, Node::Section(_))
                    && node
                        .section_title_text()
                        .is_some_and(|title| title.to_lowercase() == "what's new")
            })?;

            let mut children: Vec<WhatsnewItem> = whatsnew
                .descendants()
                .filter(|node| matches!(node, Node::Rubric(_)))
                .map(|rubric| WhatsnewItem {
                    title: rubric.astext(),
                    url: format!("{page}#{}", rubric.id().unwrap_or_default()),
                })
                .collect();
            if let Some(limit) = options.sidebar_no_of_contents {
                children.truncate(limit);
            }

            Some(WhatsnewEntry {
                title: format!("{html_title} {version_title}"),
                title_url: format!("{page}#{version_id}"),
                url: format!("{page}#{}", whatsnew.id().unwrap_or_default()),
                children,
            })
        })
        .collect()
}

fn is_minor_header(section: &Node) -> bool {
    let Some(id) = section.id() else {
        return false;
    };
    if !id.starts_with("version") || id.contains("whatsnew") {
        return false;
    }
    let whatsnew_id = format!("{id}-whatsnew");
    section
        .descendants()
        .any(|node| matches!(node, Node::Section(_)) && node.id() == Some(whatsnew_id.as_str()))
}

/// Pages on which the what's new sidebar is shown.
pub fn whatsnew_sidebar_pages(options: Option<&WhatsnewOptions>) -> &[String] {
    options.map_or(&[][..], |options| options.sidebar_pages.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Fragment, FragmentIndex, add_whatsnew_changelog};
    use pretty_assertions::assert_eq;
    use vellum_doctree::parse_document;

    fn options() -> WhatsnewOptions {
        WhatsnewOptions {
            whatsnew_file_name: Some("whatsnew.yml".to_owned()),
            changelog_file_name: Some("changelog.md".to_owned()),
            sidebar_no_of_headers: 3,
            sidebar_no_of_contents: None,
            sidebar_pages: vec!["index".to_owned()],
        }
    }

    fn transformed() -> Document {
        let source = "\
# Changelog

## [0.3.1](https://x/0.3.1)

## [0.2.0](https://x/0.2.0)

## [0.1.0](https://x/0.1.0)
";
        let mut doc = parse_document("changelog", std::path::Path::new("/c.md"), source);
        let fragment = |version: &str, title: &str| Fragment {
            version: version.to_owned(),
            title: title.to_owned(),
            content: String::new(),
        };
        let index = FragmentIndex::group([
            fragment("0.3.1", "Fast mode"),
            fragment("0.3.0", "Dark mode"),
            fragment("0.1.0", "First"),
        ]);
        add_whatsnew_changelog(&mut doc, Some(&index));
        doc
    }

    #[test]
    fn test_extract_entries() {
        let entries = extract_whatsnew(&transformed(), &options(), "Demo");
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0],
            WhatsnewEntry {
                title: "Demo Version 0.3".to_owned(),
                title_url: "changelog.html#version-0.3".to_owned(),
                url: "changelog.html#version-0.3-whatsnew".to_owned(),
                children: vec![
                    WhatsnewItem {
                        title: "Fast mode".to_owned(),
                        url: "changelog.html#fast-mode".to_owned(),
                    },
                    WhatsnewItem {
                        title: "Dark mode".to_owned(),
                        url: "changelog.html#dark-mode".to_owned(),
                    },
                ],
            }
        );
        assert_eq!(entries[1].title, "Demo Version 0.1");
    }

    #[test]
    fn test_header_and_content_limits() {
        let options = WhatsnewOptions {
            sidebar_no_of_headers: 1,
            sidebar_no_of_contents: Some(1),
            ..options()
        };
        let entries = extract_whatsnew(&transformed(), &options, "Demo");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].children.len(), 1);
    }

    #[test]
    fn test_sidebar_pages() {
        assert_eq!(whatsnew_sidebar_pages(Some(&options())), ["index".to_owned()]);
        assert!(whatsnew_sidebar_pages(None).is_empty());
    }
}
