//! Dropdown chevrons for navbar entries.

use crate::NavbarError;
use crate::fragment::{FragmentNode, parse_fragment, serialize_fragment};

/// Icon appended to entries that open a dropdown.
pub const CHEVRON_CLASS: &str = "fa-solid fa-chevron-down";

/// Append a chevron icon to the `div.ref-container` of every list item that
/// has a direct `div.navbar-dropdown` child.
///
/// # Errors
///
/// Returns `NavbarError::Markup` if `html` is not well-formed.
pub fn add_navbar_chevrons(html: &str) -> Result<String, NavbarError> {
    let mut root = parse_fragment(html)?;
    add_chevrons(&mut root);
    Ok(serialize_fragment(&root))
}

fn add_chevrons(node: &mut FragmentNode) {
    for child in &mut node.children {
        add_chevrons(child);
    }
    if node.tag != "li" || !node.children.iter().any(|c| c.is("div", "navbar-dropdown")) {
        return;
    }
    if let Some(container) = node.find_mut(&|n: &FragmentNode| n.is("div", "ref-container")) {
        container
            .children
            .push(FragmentNode::new("i").with_attr("class", CHEVRON_CLASS));
    }
}
