//! `[source]` links on API descriptions.

use std::collections::HashSet;

use vellum_doctree::{Attrs, Document, Element, Node, Reference, walk_mut};

use crate::resolver::LinkcodeResolver;
use crate::signature_info;

/// Label of the appended link.
pub const SOURCE_LABEL: &str = "[source]";

/// Append a `[source]` link to every resolvable API signature.
///
/// Signatures of one description that resolve to the same URL get a single
/// link. Returns the number of links added.
pub fn link_code(document: &mut Document, resolver: &LinkcodeResolver) -> usize {
    let mut added = 0;
    walk_mut(&mut document.children, &mut |node: &mut Node| {
        let Node::Desc(desc) = node else {
            return;
        };
        let mut uris = HashSet::new();
        for child in &mut desc.children {
            let Node::DescSignature(signature) = child else {
                continue;
            };
            let Some(info) = signature_info(&desc.domain, signature) else {
                continue;
            };
            let Some(uri) = resolver.resolve(&desc.domain, &info, false) else {
                continue;
            };
            if !uris.insert(uri.clone()) {
                continue;
            }
            signature.children.push(source_link(uri));
            added += 1;
        }
    });
    if added > 0 {
        tracing::debug!(docname = %document.docname, links = added, "Added source links");
    }
    added
}

fn source_link(uri: String) -> Node {
    Node::Reference(Reference {
        refuri: uri,
        internal: false,
        children: vec![Node::Inline(Element::with_attrs(
            Attrs::with_classes(["viewcode-link"]),
            vec![Node::text(SOURCE_LABEL)],
        ))],
        ..Reference::default()
    })
}
