//! Conversion of fragment text into document nodes.

use vellum_doctree::{Attrs, Element, LiteralBlock, Node};

use crate::fragments::Fragment;
use crate::markup::split_inline;

const DROPDOWN_CLASSES: [&str; 4] = ["sd-dropdown", "sd-card", "sd-mb-3", "sd-fade-in-slide-down"];
const COPY_BUTTON_CLASSES: [&str; 4] = [
    "sd-button",
    "sd-button--icon",
    "sd-button--icon-only",
    "sd-button--icon-small",
];
const CARD_TEXT: &str = "sd-card-text";

/// Line cursor over fragment content.
struct LineCursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> LineCursor<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            lines: content.split('\n').collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }
}

fn is_code_directive(line: &str) -> bool {
    line.contains(".. code") || line.contains(".. sourcecode")
}

/// Convert fragment body text into nodes.
///
/// Lines containing a `.. code::` or `.. sourcecode::` directive open a code
/// block; anything else starts a paragraph that runs until a line starting
/// with `.. `.
pub fn render_fragment_body(content: &str) -> Vec<Node> {
    let mut cursor = LineCursor::new(content);
    let mut nodes = Vec::new();
    while let Some(line) = cursor.peek() {
        if is_code_directive(line) {
            let language = line
                .split_once("::")
                .map(|(_, lang)| lang.trim())
                .unwrap_or_default();
            cursor.advance();
            nodes.push(code_block(&mut cursor, language));
        } else {
            nodes.push(paragraph(&mut cursor));
        }
    }
    nodes
}

/// Consume indented or blank lines into a highlighted literal block.
fn code_block(cursor: &mut LineCursor<'_>, language: &str) -> Node {
    let mut lines = Vec::new();
    let mut in_dictionary = false;
    while let Some(line) = cursor.peek() {
        if !(line.is_empty() || line.starts_with(' ')) {
            break;
        }
        let trimmed = line.trim_start();
        let formatted = if in_dictionary {
            if trimmed.starts_with('}') {
                in_dictionary = false;
                trimmed
            } else {
                line
            }
        } else {
            if trimmed.starts_with('{') {
                in_dictionary = true;
            }
            trimmed
        };
        lines.push(Node::inline(format!("{formatted}\n")));
        cursor.advance();
    }

    let literal = Node::LiteralBlock(LiteralBlock {
        attrs: Attrs::with_classes(COPY_BUTTON_CLASSES),
        language: None,
        children: lines,
    });
    let highlight = Node::Container(Element::with_attrs(
        Attrs::with_classes(["highlight"]),
        vec![literal],
    ));
    let attrs = if language.is_empty() {
        Attrs::default()
    } else {
        Attrs::with_classes([format!("highlight-{language} notranslate")])
    };
    Node::Container(Element::with_attrs(attrs, vec![highlight]))
}

/// Consume lines up to the next `.. ` directive into a paragraph.
///
/// Always consumes at least one line.
fn paragraph(cursor: &mut LineCursor<'_>) -> Node {
    let mut children = Vec::new();
    let mut first = true;
    while let Some(line) = cursor.peek() {
        if !first && line.starts_with(".. ") {
            break;
        }
        first = false;
        if line.is_empty() {
            children.push(Node::LineBreak);
        } else {
            children.extend(split_inline(line));
        }
        children.push(Node::inline(" "));
        cursor.advance();
    }
    Node::Paragraph(Element::with_attrs(Attrs::with_classes([CARD_TEXT]), children))
}

/// Rubric id for a fragment title: lowercased, spaces replaced by `-`.
fn title_id(title: &str) -> String {
    title.replace(' ', "-").to_lowercase()
}

/// Dropdown container for one fragment.
pub fn fragment_dropdown(fragment: &Fragment) -> Node {
    let mut children = vec![
        Node::Rubric(Element::with_attrs(
            Attrs::with_id(title_id(&fragment.title)),
            vec![Node::text(fragment.title.as_str())],
        )),
        Node::Paragraph(Element::with_attrs(
            Attrs::with_classes([CARD_TEXT]),
            vec![Node::Emphasis(Element::text(format!(
                "Available in v{} and later",
                fragment.version
            )))],
        )),
    ];
    children.extend(render_fragment_body(&fragment.content));
    Node::Container(Element::with_attrs(Attrs::with_classes(DROPDOWN_CLASSES), children))
}

/// "What's New" section for a minor version.
pub fn whatsnew_section(minor: &str, fragments: &[Fragment]) -> Node {
    let mut section = Node::section(format!("version-{minor}-whatsnew"), "What's New");
    if let Some(children) = section.children_mut() {
        children.extend(fragments.iter().map(fragment_dropdown));
    }
    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vellum_doctree::NodeKind;

    #[test]
    fn test_plain_body_keeps_text() {
        let nodes = render_fragment_body("Startup is faster.\nMuch faster.");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].astext(), "Startup is faster. Much faster. ");
    }

    #[test]
    fn test_python_code_block_holds_both_lines() {
        let nodes = render_fragment_body(".. code:: python\n\n    x = 1\n    print(x)");
        assert_eq!(nodes.len(), 1);
        let Node::Container(outer) = &nodes[0] else {
            panic!("expected container");
        };
        assert!(outer.attrs.has_class("highlight-python notranslate"));
        let literals: Vec<_> = nodes[0]
            .descendants()
            .filter(|n| n.kind() == NodeKind::LiteralBlock)
            .collect();
        assert_eq!(literals.len(), 1);
        assert_eq!(literals[0].astext(), "\nx = 1\nprint(x)\n");
    }

    #[test]
    fn test_code_block_without_language() {
        let nodes = render_fragment_body(".. code::\n    run");
        let Node::Container(outer) = &nodes[0] else {
            panic!("expected container");
        };
        assert!(outer.attrs.classes.is_empty());
    }

    #[test]
    fn test_dictionary_lines_keep_indentation() {
        let body = ".. code:: python\n    {\n        \"a\": 1,\n    }\n    done";
        let literal = render_fragment_body(body)[0]
            .find(|n| n.kind() == NodeKind::LiteralBlock)
            .unwrap()
            .astext();
        assert_eq!(literal, "{\n        \"a\": 1,\n}\ndone\n");
    }

    #[test]
    fn test_code_then_paragraph() {
        let body = "Intro text\n.. code:: python\n    x = 1\nAfter code";
        let kinds: Vec<_> = render_fragment_body(body).iter().map(Node::kind).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::Paragraph, NodeKind::Container, NodeKind::Paragraph]
        );
    }

    #[test]
    fn test_unterminated_code_block_keeps_partial_content() {
        let nodes = render_fragment_body(".. sourcecode:: bash\n    echo hi");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].astext(), "echo hi\n");
    }

    #[test]
    fn test_empty_line_becomes_line_break() {
        let nodes = render_fragment_body("one\n\ntwo");
        let Node::Paragraph(p) = &nodes[0] else {
            panic!("expected paragraph");
        };
        assert!(p.children.contains(&Node::LineBreak));
    }

    #[test]
    fn test_non_code_directive_line_is_consumed() {
        let nodes = render_fragment_body(".. note:: careful\nbody");
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn test_fragment_dropdown_layout() {
        let fragment = Fragment {
            version: "0.3.1".to_owned(),
            title: "Faster Startup".to_owned(),
            content: "Quick.".to_owned(),
        };
        let dropdown = fragment_dropdown(&fragment);
        let children = dropdown.children();
        assert_eq!(children[0].id(), Some("faster-startup"));
        assert_eq!(children[0].astext(), "Faster Startup");
        assert_eq!(children[1].astext(), "Available in v0.3.1 and later");
        assert_eq!(children[2].astext(), "Quick. ");
    }
}
