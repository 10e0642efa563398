//! Typed document tree for Vellum builds.
//!
//! Markdown sources are parsed into a tree of [`Node`] values, transformed in
//! place by build stages, and rendered to XHTML by [`HtmlWriter`].
//!
//! # Example
//!
//! ```
//! use vellum_doctree::{parse_markdown, render_nodes};
//!
//! let nodes = parse_markdown("# Guide\n\nRead **this**.\n");
//! let html = render_nodes(&nodes);
//! assert!(html.contains("<strong>this</strong>"));
//! ```

mod document;
mod html;
mod node;
mod parser;
mod util;

pub use document::{Document, DocumentSet};
pub use html::{HtmlWriter, render_nodes};
pub use node::{
    Attrs, Desc, DescSignature, Descendants, Element, Image, LiteralBlock, Node, NodeKind, Raw,
    Reference, retain_nodes, walk_mut,
};
pub use parser::{parse_document, parse_markdown};
pub use util::{escape_html, make_id, relative_path};
