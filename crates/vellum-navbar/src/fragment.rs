//! Minimal XHTML fragment tree for post-processing rendered markup.
//!
//! The navbar is rendered by the XHTML writer, so fragments are well-formed
//! XML and can be read with `quick-xml`.

use std::fmt::Write;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::NavbarError;

/// Elements written without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

/// Element of a parsed fragment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FragmentNode {
    pub tag: String,
    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,
    /// Text before the first child.
    pub text: String,
    /// Text after this element's closing tag.
    pub tail: String,
    pub children: Vec<FragmentNode>,
}

impl FragmentNode {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Whether this is a `<tag class="... class ...">` element.
    pub fn is(&self, tag: &str, class: &str) -> bool {
        self.tag == tag && self.has_class(class)
    }

    /// First descendant (excluding self) matching the predicate, depth first.
    pub fn find_mut<P>(&mut self, predicate: &P) -> Option<&mut FragmentNode>
    where
        P: Fn(&FragmentNode) -> bool,
    {
        for child in &mut self.children {
            if predicate(child) {
                return Some(child);
            }
            if let Some(found) = child.find_mut(predicate) {
                return Some(found);
            }
        }
        None
    }
}

/// Parse an XHTML fragment.
///
/// The fragment may have several top-level elements; they become children of
/// an unnamed root.
///
/// # Errors
///
/// Returns `NavbarError::Markup` if the fragment is not well-formed.
pub fn parse_fragment(html: &str) -> Result<FragmentNode, NavbarError> {
    let wrapped = format!("<root>{html}</root>");
    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().trim_text(false);

    loop {
        match reader.read_event()? {
            Event::Start(_) => break,
            Event::Eof => return Ok(FragmentNode::default()),
            _ => {}
        }
    }
    let mut root = parse_children(&mut reader)?;
    root.tag.clear();
    Ok(root)
}

fn parse_children(reader: &mut Reader<&[u8]>) -> Result<FragmentNode, NavbarError> {
    let mut node = FragmentNode::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let mut child = parse_children(reader)?;
                child.tag = decode_tag(&e);
                child.attrs = decode_attrs(&e);
                node.children.push(child);
            }
            Event::Empty(e) => node.children.push(FragmentNode {
                tag: decode_tag(&e),
                attrs: decode_attrs(&e),
                ..FragmentNode::default()
            }),
            Event::Text(e) => {
                let text = reader.decoder().decode(&e)?.into_owned();
                append_text(&mut node, &text);
            }
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?.into_owned();
                append_text(&mut node, &decode_entity(&entity));
            }
            Event::CData(e) => append_text(&mut node, &String::from_utf8_lossy(&e)),
            Event::End(_) | Event::Eof => return Ok(node),
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }
}

fn decode_tag(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn decode_attrs(e: &BytesStart) -> Vec<(String, String)> {
    e.attributes()
        .flatten()
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_or_else(
                |_| String::from_utf8_lossy(&attr.value).into_owned(),
                std::borrow::Cow::into_owned,
            );
            (key, value)
        })
        .collect()
}

fn append_text(node: &mut FragmentNode, text: &str) {
    match node.children.last_mut() {
        Some(last) => last.tail.push_str(text),
        None => node.text.push_str(text),
    }
}

fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        s if s.starts_with('#') => {
            let code = match s.strip_prefix("#x").or_else(|| s.strip_prefix("#X")) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => s[1..].parse::<u32>().ok(),
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        _ => format!("&{entity};"),
    }
}

/// Serialize the children of a fragment root back to XHTML.
pub fn serialize_fragment(root: &FragmentNode) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(&escape_xml(&root.text, false));
    for child in &root.children {
        serialize_node(child, &mut out);
    }
    out
}

fn serialize_node(node: &FragmentNode, out: &mut String) {
    out.push('<');
    out.push_str(&node.tag);
    for (key, value) in &node.attrs {
        let _ = write!(out, r#" {key}="{}""#, escape_xml(value, true));
    }

    if VOID_ELEMENTS.contains(&node.tag.as_str()) {
        out.push_str(" />");
    } else {
        out.push('>');
        out.push_str(&escape_xml(&node.text, false));
        for child in &node.children {
            serialize_node(child, out);
        }
        let _ = write!(out, "</{}>", node.tag);
    }

    out.push_str(&escape_xml(&node.tail, false));
}

fn escape_xml(text: &str, escape_quotes: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if escape_quotes => result.push_str("&quot;"),
            _ => result.push(ch),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_nested_with_tail() {
        let root = parse_fragment("<p><strong>Bold</strong> text</p><br />").unwrap();
        assert_eq!(root.children.len(), 2);
        let p = &root.children[0];
        assert_eq!(p.children[0].text, "Bold");
        assert_eq!(p.children[0].tail, " text");
        assert_eq!(root.children[1].tag, "br");
    }

    #[test]
    fn test_entities_are_decoded() {
        let root = parse_fragment(r#"<a title="Tom&#x27;s">a &amp; b</a>"#).unwrap();
        let a = &root.children[0];
        assert_eq!(a.attr("title"), Some("Tom's"));
        assert_eq!(a.text, "a & b");
    }

    #[test]
    fn test_serialize_preserves_markup() {
        let html = r#"<ul class="x"><li><a href="a.html?x=1&amp;y=2">A &lt; B</a></li></ul><hr />"#;
        let root = parse_fragment(html).unwrap();
        assert_eq!(serialize_fragment(&root), html);
    }

    #[test]
    fn test_empty_element_keeps_closing_tag() {
        let root = parse_fragment(r#"<i class="icon"></i>"#).unwrap();
        assert_eq!(serialize_fragment(&root), r#"<i class="icon"></i>"#);
    }

    #[test]
    fn test_malformed_fragment() {
        assert!(parse_fragment("<p><b>x</p>").is_err());
    }
}
