//! Inline markup for fragment text.
//!
//! Rules are tried together: the match starting leftmost wins, and rules
//! listed first win ties. Text between matches becomes inline nodes.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use vellum_doctree::{Attrs, Element, Node, Reference};

/// Pattern plus the node it produces.
struct InlineRule {
    pattern: Regex,
    build: fn(&Captures<'_>) -> Node,
}

static RULES: LazyLock<Vec<InlineRule>> = LazyLock::new(|| {
    vec![
        InlineRule {
            pattern: Regex::new(r"`([^<`]+?) <([^>`]+?)>`_").expect("invalid link regex"),
            build: link,
        },
        InlineRule {
            pattern: Regex::new(r"`([^`]+?)`").expect("invalid literal regex"),
            build: |caps| Node::Literal(Element::text(&caps[1])),
        },
        InlineRule {
            pattern: Regex::new(r"``(.*?)``").expect("invalid double literal regex"),
            build: |caps| Node::Literal(Element::text(&caps[1])),
        },
        InlineRule {
            pattern: Regex::new(r"\*\*(.*?)\*\*").expect("invalid strong regex"),
            build: |caps| Node::Strong(Element::text(&caps[1])),
        },
        InlineRule {
            pattern: Regex::new(r"\*([^*]+?)\*").expect("invalid emphasis regex"),
            build: |caps| Node::Emphasis(Element::text(&caps[1])),
        },
    ]
});

fn link(caps: &Captures<'_>) -> Node {
    let url = &caps[2];
    let external = url.starts_with("http") || url.starts_with("www");
    let class = if external {
        "reference-external"
    } else {
        "reference-internal"
    };
    Node::Reference(Reference {
        attrs: Attrs::with_classes([class]),
        refuri: url.to_owned(),
        internal: !external,
        reftitle: None,
        children: vec![Node::text(&caps[1])],
    })
}

/// Split one line into inline nodes.
///
/// Returns an empty vector for an empty line.
pub fn split_inline(line: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut rest = line;
    while !rest.is_empty() {
        let next = RULES
            .iter()
            .filter_map(|rule| rule.pattern.captures(rest).map(|caps| (rule, caps)))
            .filter(|(_, caps)| caps.get(0).is_some_and(|m| !m.is_empty()))
            .min_by_key(|(_, caps)| caps.get(0).map_or(usize::MAX, |m| m.start()));

        let Some((rule, caps)) = next else {
            nodes.push(Node::inline(rest));
            break;
        };
        let Some(whole) = caps.get(0) else { break };
        if whole.start() > 0 {
            nodes.push(Node::inline(&rest[..whole.start()]));
        }
        nodes.push((rule.build)(&caps));
        rest = &rest[whole.end()..];
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text_is_single_inline() {
        assert_eq!(split_inline("just words"), vec![Node::inline("just words")]);
    }

    #[test]
    fn test_empty_line() {
        assert!(split_inline("").is_empty());
    }

    #[test]
    fn test_mixed_markup() {
        let nodes = split_inline("The files are **deleted** when the ``GUI`` is closed.");
        assert_eq!(
            nodes,
            vec![
                Node::inline("The files are "),
                Node::Strong(Element::text("deleted")),
                Node::inline(" when the "),
                Node::Literal(Element::text("GUI")),
                Node::inline(" is closed."),
            ]
        );
    }

    #[test]
    fn test_external_link() {
        let nodes = split_inline("See `the docs <https://example.com>`_ now");
        assert_eq!(nodes.len(), 3);
        let Node::Reference(reference) = &nodes[1] else {
            panic!("expected reference, got {:?}", nodes[1]);
        };
        assert_eq!(reference.refuri, "https://example.com");
        assert!(reference.attrs.has_class("reference-external"));
        assert!(!reference.internal);
        assert_eq!(nodes[1].astext(), "the docs");
    }

    #[test]
    fn test_internal_link() {
        let nodes = split_inline("`Install <install.html>`_");
        let Node::Reference(reference) = &nodes[0] else {
            panic!("expected reference");
        };
        assert!(reference.attrs.has_class("reference-internal"));
        assert!(reference.internal);
    }

    #[test]
    fn test_single_backtick_and_italic() {
        let nodes = split_inline("Use `run` for *fast* mode");
        assert_eq!(
            nodes,
            vec![
                Node::inline("Use "),
                Node::Literal(Element::text("run")),
                Node::inline(" for "),
                Node::Emphasis(Element::text("fast")),
                Node::inline(" mode"),
            ]
        );
    }
}
