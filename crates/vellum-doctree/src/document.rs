//! Parsed documents and the per-build document set.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::node::{Descendants, Node};

/// A parsed source document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    /// Document name: source path relative to the source directory, without
    /// extension, `/`-separated (e.g. `"index"`, `"user/setup"`).
    pub docname: String,
    /// Absolute path of the source file.
    pub source_path: PathBuf,
    /// Top-level nodes.
    pub children: Vec<Node>,
}

impl Document {
    /// Create a document.
    #[must_use]
    pub fn new(docname: impl Into<String>, source_path: impl Into<PathBuf>, children: Vec<Node>) -> Self {
        Self {
            docname: docname.into(),
            source_path: source_path.into(),
            children,
        }
    }

    /// Title of the first section, if the document has one.
    pub fn title(&self) -> Option<String> {
        self.children
            .iter()
            .find(|node| matches!(node, Node::Section(_)))
            .and_then(Node::section_title_text)
    }

    /// Pre-order iterator over every node of the document.
    pub fn traverse(&self) -> Descendants<'_> {
        Descendants::of(&self.children)
    }

    /// All sections of the document, in document order.
    pub fn sections(&self) -> impl Iterator<Item = &Node> {
        self.traverse().filter(|node| matches!(node, Node::Section(_)))
    }

    /// Output file name of the rendered page, relative to the output directory.
    pub fn html_path(&self) -> String {
        format!("{}.html", self.docname)
    }
}

/// All documents of one build, in discovery order.
#[derive(Debug, Default)]
pub struct DocumentSet {
    documents: Vec<Document>,
    index: HashMap<String, usize>,
}

impl DocumentSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document, replacing any document with the same name.
    pub fn insert(&mut self, document: Document) {
        if let Some(&idx) = self.index.get(&document.docname) {
            self.documents[idx] = document;
        } else {
            self.index
                .insert(document.docname.clone(), self.documents.len());
            self.documents.push(document);
        }
    }

    /// Look up a document by name.
    pub fn get(&self, docname: &str) -> Option<&Document> {
        self.index.get(docname).map(|&idx| &self.documents[idx])
    }

    /// Look up a document by name for mutation.
    pub fn get_mut(&mut self, docname: &str) -> Option<&mut Document> {
        self.index
            .get(docname)
            .copied()
            .map(move |idx| &mut self.documents[idx])
    }

    /// Whether a document with this name exists.
    pub fn contains(&self, docname: &str) -> bool {
        self.index.contains_key(docname)
    }

    /// Title of the named document.
    pub fn title(&self, docname: &str) -> Option<String> {
        self.get(docname).and_then(Document::title)
    }

    /// `(docname, title)` of the documents above `docname` in its path.
    ///
    /// For `a/b/page` the documents `a` and `a/b` are looked up, falling back
    /// to their `index` documents. A folder's own index page has no parent
    /// entry for that folder.
    pub fn parents(&self, docname: &str) -> Vec<(String, String)> {
        let segments: Vec<&str> = docname.split('/').collect();
        (1..segments.len())
            .filter_map(|end| {
                let prefix = segments[..end].join("/");
                let index = format!("{prefix}/index");
                [prefix, index]
                    .into_iter()
                    .filter(|candidate| candidate != docname)
                    .find_map(|candidate| self.title(&candidate).map(|title| (candidate, title)))
            })
            .collect()
    }

    /// Iterate documents in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    /// Iterate documents mutably in discovery order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Document> {
        self.documents.iter_mut()
    }

    /// Document names in discovery order.
    pub fn docnames(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|d| d.docname.as_str())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl<'a> IntoIterator for &'a DocumentSet {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str, title: &str) -> Document {
        Document::new(name, format!("/src/{name}.md"), vec![Node::section("s", title)])
    }

    #[test]
    fn test_document_title_from_first_section() {
        assert_eq!(doc("index", "Home").title(), Some("Home".to_owned()));
        let empty = Document::new("empty", "/src/empty.md", vec![]);
        assert_eq!(empty.title(), None);
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut set = DocumentSet::new();
        set.insert(doc("index", "Home"));
        set.insert(doc("guide", "Guide"));
        set.insert(doc("index", "Welcome"));

        assert_eq!(set.len(), 2);
        assert_eq!(set.title("index"), Some("Welcome".to_owned()));
        assert_eq!(set.docnames().collect::<Vec<_>>(), vec!["index", "guide"]);
    }

    #[test]
    fn test_get_missing_document() {
        let set = DocumentSet::new();
        assert!(set.get("nope").is_none());
        assert!(!set.contains("nope"));
    }

    #[test]
    fn test_parents_fall_back_to_index() {
        let mut set = DocumentSet::new();
        set.insert(doc("user/index", "User Guide"));
        set.insert(doc("user/setup", "Setup"));
        set.insert(doc("user/setup/linux", "Linux"));

        assert_eq!(
            set.parents("user/setup/linux"),
            vec![
                ("user/index".to_owned(), "User Guide".to_owned()),
                ("user/setup".to_owned(), "Setup".to_owned()),
            ]
        );
        assert!(set.parents("user/index").is_empty());
        assert!(set.parents("index").is_empty());
    }

    #[test]
    fn test_html_path() {
        assert_eq!(doc("user/setup", "Setup").html_path(), "user/setup.html");
    }
}
