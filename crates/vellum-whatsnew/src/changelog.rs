//! Changelog transform: minor-version headers and what's new sections.

use std::sync::LazyLock;

use regex::Regex;
use vellum_doctree::{Attrs, Document, Element, Node};

use crate::content::whatsnew_section;
use crate::fragments::FragmentIndex;

/// Semantic version, as suggested on semver.org (unanchored).
static SEMVER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)",
        r"(?:-((?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)",
        r"(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?",
        r"(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?",
    ))
    .expect("invalid semver regex")
});

/// Group patch release sections under minor-version headers.
///
/// Sections are visited in document order. A section qualifies when its
/// title contains a semantic version; its version is the text of the first
/// reference inside it. The first section seen for each `major.minor`
/// receives a `Version {minor}` section as its first child, holding a
/// "What's New" section when `fragments` has entries for that minor version.
///
/// Returns the minor versions that received a header.
pub fn add_whatsnew_changelog(document: &mut Document, fragments: Option<&FragmentIndex>) -> Vec<String> {
    let mut seen = Vec::new();
    visit(&mut document.children, fragments, &mut seen);
    tracing::debug!(
        docname = %document.docname,
        minors = seen.len(),
        "grouped changelog by minor version"
    );
    seen
}

fn visit(nodes: &mut [Node], fragments: Option<&FragmentIndex>, seen: &mut Vec<String>) {
    for node in nodes {
        let header = match node {
            Node::Section(_) => minor_header(node, fragments, seen),
            _ => None,
        };
        // Headers are inserted after the subtree walk so they are never revisited.
        if let Some(children) = node.children_mut() {
            visit(children, fragments, seen);
            if let Some(header) = header {
                children.insert(0, header);
            }
        }
    }
}

fn minor_header(section: &Node, fragments: Option<&FragmentIndex>, seen: &mut Vec<String>) -> Option<Node> {
    let title = section.section_title_text()?;
    if !SEMVER.is_match(&title) {
        return None;
    }
    let version = section
        .descendants()
        .find(|node| matches!(node, Node::Reference(_)))
        .map(Node::astext)?;
    let minor = minor_version(version.trim())?;
    if seen.contains(&minor) {
        return None;
    }
    seen.push(minor.clone());

    let mut header = Node::Section(Element::with_attrs(
        Attrs::with_id(format!("version-{minor}")).named(format!("Version {minor}")),
        vec![Node::Title(Element::text(format!("Version {minor}")))],
    ));
    if let Some(group) = fragments.and_then(|index| index.get(&minor))
        && let Some(children) = header.children_mut()
    {
        children.push(whatsnew_section(&minor, group));
    }
    Some(header)
}

/// Version without its last dot component (`0.3.1` -> `0.3`).
fn minor_version(version: &str) -> Option<String> {
    version
        .rsplit_once('.')
        .map(|(minor, _)| minor.to_owned())
        .filter(|minor| !minor.is_empty())
}
