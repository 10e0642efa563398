//! Navbar layout to document nodes.

use vellum_doctree::{Attrs, Element, Node, Reference, relative_path};

use crate::layout::NavEntry;

/// Build the navbar list for a page.
///
/// File entries link relative to `current_page`; link entries keep their
/// URL. Entries with neither are skipped.
pub fn build_navbar_nodes(entries: &[NavEntry], current_page: &str, top_level: bool) -> Node {
    let class = if top_level { "navbar-toplevel" } else { "navbar-sublevel" };
    let items = entries
        .iter()
        .filter_map(|entry| list_item(entry, current_page))
        .collect();
    Node::BulletList(Element::with_attrs(Attrs::with_classes([class]), items))
}

fn list_item(entry: &NavEntry, current_page: &str) -> Option<Node> {
    let title = entry.title.clone().unwrap_or_default();
    let (refuri, internal) = match (&entry.file, &entry.link) {
        (Some(file), _) => (relative_path(current_page, &format!("{file}.html")), true),
        (None, Some(link)) => (link.clone(), false),
        (None, None) => {
            tracing::warn!(title = %title, "Navbar entry is missing 'file' or 'link', skipping");
            return None;
        }
    };

    let mut children = vec![Node::Inline(Element::with_attrs(
        Attrs::with_classes(["navbar-link-title"]),
        vec![Node::text(title.clone())],
    ))];
    if let Some(caption) = &entry.caption {
        children.push(Node::text(caption.clone()));
    }
    let reference = Node::Reference(Reference {
        refuri,
        internal,
        reftitle: entry.title.clone(),
        children,
        ..Reference::default()
    });

    let container = Node::Container(Element::with_attrs(
        Attrs::with_classes(["ref-container"]),
        vec![Node::paragraph(vec![reference])],
    ));
    let mut item_children = vec![container];
    if let Some(sections) = &entry.sections {
        item_children.push(Node::Container(Element::with_attrs(
            Attrs::with_classes(["navbar-dropdown"]),
            vec![build_navbar_nodes(sections, current_page, false)],
        )));
    }

    let active = entry.file.as_deref() == Some(current_page);
    let attrs = if active {
        Attrs::with_classes(["active-link"])
    } else {
        Attrs::default()
    };
    Some(Node::ListItem(Element::with_attrs(attrs, item_children)))
}
