//! Per-document search records.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use vellum_doctree::{Document, DocumentSet, Node, NodeKind, retain_nodes};

use crate::SearchError;
use crate::options::{NodeFilter, SearchOptions};

/// Node kinds removed before text extraction.
const STRIPPED: [NodeKind; 5] = [
    NodeKind::Image,
    NodeKind::Math,
    NodeKind::Raw,
    NodeKind::Comment,
    NodeKind::Target,
];

static NON_ANCHOR_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("invalid anchor regex"));

/// One searchable entry.
#[derive(Clone, Debug, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchRecord {
    /// Document name.
    #[serde(rename = "objectID")]
    pub object_id: String,
    /// Page link with anchor.
    pub href: String,
    /// Breadcrumb trail.
    pub title: String,
    /// Section or object title.
    pub section: String,
    pub text: String,
}

/// Anchor for a title: lowercased, spaces to `-`, punctuation removed.
///
/// # Examples
///
/// ```
/// use vellum_search::title_to_anchor;
///
/// assert_eq!(title_to_anchor(" Getting Started! "), "getting-started");
/// assert_eq!(title_to_anchor("What's New"), "whats-new");
/// ```
pub fn title_to_anchor(title: &str) -> String {
    let dashed = title.to_lowercase().trim().replace(' ', "-");
    NON_ANCHOR_CHARS.replace_all(&dashed, "").into_owned()
}

/// Builds search records from documents.
pub struct SearchIndexer {
    options: SearchOptions,
    patterns: Vec<(glob::Pattern, NodeFilter)>,
}

impl SearchIndexer {
    /// Create an indexer, compiling the `index_patterns` globs.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Pattern` for an invalid glob.
    pub fn new(options: SearchOptions) -> Result<Self, SearchError> {
        let patterns = options
            .index_patterns
            .iter()
            .map(|(pattern, filter)| {
                glob::Pattern::new(pattern)
                    .map(|compiled| (compiled, *filter))
                    .map_err(|source| SearchError::Pattern {
                        pattern: pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { options, patterns })
    }

    /// Node filter for a document: the first matching pattern, else all.
    pub fn filter_for(&self, docname: &str) -> NodeFilter {
        self.patterns
            .iter()
            .find(|(pattern, _)| pattern.matches(docname))
            .map_or(NodeFilter::All, |(_, filter)| *filter)
    }

    /// Records for every document not excluded, in document-set order.
    pub fn build_index(&self, documents: &DocumentSet) -> Vec<SearchRecord> {
        let records: Vec<SearchRecord> = documents
            .iter()
            .filter(|doc| !self.options.is_excluded(&doc.docname))
            .flat_map(|doc| self.document_records(doc, documents))
            .collect();
        tracing::debug!(records = records.len(), "built search index");
        records
    }

    /// Records for one document.
    ///
    /// Each top-level section yields one record holding the text of all of
    /// its subsections. Each API description yields an extra record.
    pub fn document_records(&self, document: &Document, documents: &DocumentSet) -> Vec<SearchRecord> {
        let mut children = document.children.clone();
        retain_nodes(&mut children, &mut |node: &Node| !STRIPPED.contains(&node.kind()));

        let filter = self.filter_for(&document.docname);
        let doc_title = document.title().unwrap_or_default();
        let parents: Vec<String> = documents
            .parents(&document.docname)
            .into_iter()
            .map(|(_, title)| title)
            .collect();
        let page = document.html_path();

        let mut records = Vec::new();
        for section in children.iter().filter(|n| n.kind() == NodeKind::Section) {
            let title = section.section_title_text().unwrap_or_default();
            records.push(SearchRecord {
                object_id: document.docname.clone(),
                href: format!("{page}#{}", anchor_of(section, &title)),
                title: breadcrumbs(&parents, &doc_title, &title),
                text: section_text(section, filter),
                section: title,
            });
        }

        let mut enclosing = Vec::new();
        collect_descs(&children, &mut enclosing, &mut |desc: &Node, section_id: Option<&str>| {
            let signature = desc
                .children()
                .iter()
                .find(|n| n.kind() == NodeKind::DescSignature);
            let name = signature.map(desc_name).unwrap_or_default();
            let Some(anchor) = signature
                .and_then(Node::id)
                .or(section_id)
                .map(str::to_owned)
            else {
                return;
            };
            let content = desc
                .children()
                .iter()
                .find(|n| n.kind() == NodeKind::DescContent);
            records.push(SearchRecord {
                object_id: document.docname.clone(),
                href: format!("{page}#{anchor}"),
                title: breadcrumbs(&parents, &doc_title, &name),
                text: content.map(|c| section_text(c, filter)).unwrap_or_default(),
                section: name,
            });
        });

        records
    }
}

/// Anchor of a section: its id, or one derived from the title.
fn anchor_of(section: &Node, title: &str) -> String {
    section
        .id()
        .map_or_else(|| title_to_anchor(title), str::to_owned)
}

/// Object name shown for a description: the `sig-name` part of the signature.
fn desc_name(signature: &Node) -> String {
    signature
        .children()
        .iter()
        .find(|n| n.attrs().is_some_and(|a| a.has_class("sig-name")))
        .unwrap_or(signature)
        .astext()
}

/// Walk descriptions with the id of their innermost enclosing section.
fn collect_descs<'a, F>(nodes: &'a [Node], sections: &mut Vec<&'a str>, visit: &mut F)
where
    F: FnMut(&'a Node, Option<&'a str>),
{
    for node in nodes {
        match node {
            Node::Desc(_) => {
                visit(node, sections.last().copied());
                collect_descs(node.children(), sections, visit);
            }
            Node::Section(_) => {
                let pushed = node.id().map(|id| sections.push(id)).is_some();
                collect_descs(node.children(), sections, visit);
                if pushed {
                    sections.pop();
                }
            }
            _ => collect_descs(node.children(), sections, visit),
        }
    }
}

/// Text of paragraphs and literal blocks below a node, per filter.
fn section_text(node: &Node, filter: NodeFilter) -> String {
    let wanted = |kind: NodeKind| match filter {
        NodeFilter::All => matches!(kind, NodeKind::Paragraph | NodeKind::LiteralBlock),
        NodeFilter::Paragraphs => kind == NodeKind::Paragraph,
        NodeFilter::Literal => kind == NodeKind::LiteralBlock,
        NodeFilter::Titles => false,
    };
    let mut parts = Vec::new();
    collect_text(node.children(), &wanted, &mut parts);
    parts.join("\n")
}

/// Collect text of wanted nodes without descending into them.
fn collect_text(nodes: &[Node], wanted: &impl Fn(NodeKind) -> bool, parts: &mut Vec<String>) {
    for node in nodes {
        if wanted(node.kind()) {
            let text = node.astext();
            if !text.is_empty() {
                parts.push(text);
            }
        } else {
            collect_text(node.children(), wanted, parts);
        }
    }
}

/// `parents > document > section`, without repeating the document title.
fn breadcrumbs(parents: &[String], doc_title: &str, section_title: &str) -> String {
    let mut parts: Vec<&str> = parents.iter().map(String::as_str).collect();
    if section_title != doc_title && !doc_title.is_empty() {
        parts.push(doc_title);
    }
    parts.push(section_title);
    parts.join(" > ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use vellum_doctree::parse_document;

    fn docs() -> DocumentSet {
        let mut set = DocumentSet::new();
        for (name, source) in [
            ("index", "# Home\n\nWelcome.\n"),
            ("user", "# User Guide\n\nRead me.\n"),
            (
                "user/setup",
                "# Setup\n\nInstall it.\n\n![logo](logo.png)\n\n## Configure\n\nEdit the file.\n\n```toml\nkey = 1\n```\n",
            ),
            (
                "api/index",
                "# API\n\n```{py:function} pkg.mod.run(a)\nRuns the thing.\n```\n",
            ),
        ] {
            set.insert(parse_document(name, Path::new(&format!("/src/{name}.md")), source));
        }
        set
    }

    fn indexer(options: SearchOptions) -> SearchIndexer {
        SearchIndexer::new(options).unwrap()
    }

    #[test]
    fn test_top_level_section_folds_subsections() {
        let set = docs();
        let records = indexer(SearchOptions::default()).document_records(set.get("user/setup").unwrap(), &set);
        assert_eq!(
            records,
            vec![SearchRecord {
                object_id: "user/setup".to_owned(),
                href: "user/setup.html#setup".to_owned(),
                title: "User Guide > Setup".to_owned(),
                section: "Setup".to_owned(),
                text: "Install it.\nEdit the file.\nkey = 1\n".to_owned(),
            }]
        );
    }

    #[test]
    fn test_desc_record_uses_signature_anchor() {
        let set = docs();
        let records = indexer(SearchOptions::default()).document_records(set.get("api/index").unwrap(), &set);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].href, "api/index.html#pkg.mod.run");
        assert_eq!(records[1].section, "pkg.mod.run");
        assert_eq!(records[1].title, "API > pkg.mod.run");
        assert_eq!(records[1].text, "Runs the thing.");
    }

    #[test]
    fn test_node_filters() {
        let set = docs();
        let mut options = SearchOptions::default();
        options.index_patterns.insert("user/*".to_owned(), NodeFilter::Literal);
        options.index_patterns.insert("index".to_owned(), NodeFilter::Titles);
        let indexer = indexer(options);

        let setup = indexer.document_records(set.get("user/setup").unwrap(), &set);
        assert_eq!(setup[0].text, "key = 1\n");
        let home = indexer.document_records(set.get("index").unwrap(), &set);
        assert_eq!(home[0].text, "");
        assert_eq!(indexer.filter_for("other"), NodeFilter::All);
    }

    #[test]
    fn test_exclusion_and_idempotence() {
        let set = docs();
        let options = SearchOptions {
            exclude: vec!["api".to_owned()],
            ..SearchOptions::default()
        };
        let indexer = indexer(options);
        let mut first = indexer.build_index(&set);
        let mut second = indexer.build_index(&set);
        assert!(first.iter().all(|r| !r.object_id.starts_with("api")));
        first.sort();
        second.sort();
        assert_eq!(first, second);
    }

    #[test]
    fn test_index_page_is_not_its_own_parent() {
        let set = docs();
        let records = indexer(SearchOptions::default()).document_records(set.get("api/index").unwrap(), &set);
        assert_eq!(records[0].title, "API");
    }

    #[test]
    fn test_breadcrumbs() {
        assert_eq!(breadcrumbs(&[], "Home", "Home"), "Home");
        assert_eq!(breadcrumbs(&[], "Home", "Intro"), "Home > Intro");
        assert_eq!(
            breadcrumbs(&["Guide".to_owned()], "Setup", "Setup"),
            "Guide > Setup"
        );
    }

    #[test]
    fn test_invalid_pattern() {
        let mut options = SearchOptions::default();
        options.index_patterns.insert("[".to_owned(), NodeFilter::All);
        assert!(matches!(
            SearchIndexer::new(options),
            Err(SearchError::Pattern { .. })
        ));
    }
}
