//! XHTML writer for document trees.
//!
//! Output is well-formed XML (void elements are self-closed) so rendered
//! fragments can be re-parsed during post-processing.

use crate::node::{Attrs, Node};
use crate::util::escape_html;

/// Render nodes to XHTML.
///
/// # Examples
///
/// ```
/// use vellum_doctree::{parse_markdown, render_nodes};
///
/// let html = render_nodes(&parse_markdown("# Hi\n\nSome `code`.\n"));
/// assert!(html.starts_with(r#"<section id="hi"><h1>Hi"#));
/// assert!(html.contains(r#"<code class="docutils literal notranslate">code</code>"#));
/// ```
pub fn render_nodes(nodes: &[Node]) -> String {
    let mut writer = HtmlWriter::new();
    writer.write_all(nodes);
    writer.finish()
}

/// Stateful XHTML writer tracking section depth for heading levels.
#[derive(Debug, Default)]
pub struct HtmlWriter {
    out: String,
    depth: usize,
    /// Id of the section whose title is being written.
    title_anchor: Option<String>,
}

impl HtmlWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start nested at the given section depth (for fragments of a page).
    #[must_use]
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn finish(self) -> String {
        self.out
    }

    pub fn write_all(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.write(node);
        }
    }

    #[allow(clippy::too_many_lines)]
    pub fn write(&mut self, node: &Node) {
        match node {
            Node::Text(text) => self.out.push_str(&escape_html(text)),
            Node::Section(section) => {
                self.open("section", &section.attrs, &[]);
                self.depth += 1;
                let anchor = self.title_anchor.replace(section.attrs.id().unwrap_or_default().to_owned());
                self.write_all(&section.children);
                self.title_anchor = anchor;
                self.depth -= 1;
                self.out.push_str("</section>");
            }
            Node::Title(title) => {
                if self.depth == 0 {
                    self.element("p", &title.attrs, &["title"], &title.children);
                    return;
                }
                let tag = format!("h{}", self.depth.min(6));
                self.open(&tag, &title.attrs, &[]);
                self.write_all(&title.children);
                if let Some(anchor) = self.title_anchor.take().filter(|a| !a.is_empty()) {
                    self.out.push_str(&format!(
                        r##"<a class="headerlink" href="#{}" title="Link to this heading">¶</a>"##,
                        escape_html(&anchor)
                    ));
                }
                self.out.push_str(&format!("</{tag}>"));
            }
            Node::Paragraph(e) => self.element("p", &e.attrs, &[], &e.children),
            Node::Inline(e) => self.element("span", &e.attrs, &[], &e.children),
            Node::Emphasis(e) => self.element("em", &e.attrs, &[], &e.children),
            Node::Strong(e) => self.element("strong", &e.attrs, &[], &e.children),
            Node::Literal(e) => {
                self.element("code", &e.attrs, &["docutils", "literal", "notranslate"], &e.children);
            }
            Node::Reference(reference) => {
                let kind = if reference.internal { "internal" } else { "external" };
                self.out.push_str("<a");
                self.out.push_str(&attributes(&reference.attrs, &["reference", kind]));
                self.out.push_str(&format!(r#" href="{}""#, escape_html(&reference.refuri)));
                if let Some(title) = &reference.reftitle {
                    self.out.push_str(&format!(r#" title="{}""#, escape_html(title)));
                }
                self.out.push('>');
                self.write_all(&reference.children);
                self.out.push_str("</a>");
            }
            Node::LiteralBlock(block) => match &block.language {
                Some(language) => {
                    self.out.push_str(&format!(
                        r#"<div class="highlight-{} notranslate"><div class="highlight">"#,
                        escape_html(language)
                    ));
                    self.element("pre", &block.attrs, &[], &block.children);
                    self.out.push_str("</div></div>");
                }
                None => self.element("pre", &block.attrs, &[], &block.children),
            },
            Node::Container(e) => self.element("div", &e.attrs, &[], &e.children),
            Node::Rubric(e) => self.element("p", &e.attrs, &["rubric"], &e.children),
            Node::BulletList(e) => self.element("ul", &e.attrs, &[], &e.children),
            Node::EnumeratedList(e) => self.element("ol", &e.attrs, &[], &e.children),
            Node::ListItem(e) => self.element("li", &e.attrs, &[], &e.children),
            Node::BlockQuote(e) => self.element("blockquote", &e.attrs, &[], &e.children),
            Node::LineBreak => self.out.push_str("<br />"),
            Node::Transition => self.out.push_str(r#"<hr class="docutils" />"#),
            Node::Desc(desc) => {
                self.element("dl", &desc.attrs, &[], &desc.children);
            }
            Node::DescSignature(sig) => {
                self.open("dt", &sig.attrs, &["sig", "sig-object"]);
                self.write_all(&sig.children);
                if let Some(id) = sig.attrs.id() {
                    self.out.push_str(&format!(
                        r##"<a class="headerlink" href="#{}" title="Link to this definition">¶</a>"##,
                        escape_html(id)
                    ));
                }
                self.out.push_str("</dt>");
            }
            Node::DescContent(e) => self.element("dd", &e.attrs, &[], &e.children),
            Node::Image(image) => {
                self.out.push_str("<img");
                self.out.push_str(&attributes(&image.attrs, &[]));
                self.out.push_str(&format!(
                    r#" src="{}" alt="{}" />"#,
                    escape_html(&image.uri),
                    escape_html(&image.alt)
                ));
            }
            Node::Math(math) => {
                self.out.push_str(&format!(
                    r#"<div class="math notranslate nohighlight">\[{}\]</div>"#,
                    escape_html(math)
                ));
            }
            Node::Raw(raw) => {
                if raw.format == "html" {
                    self.out.push_str(&raw.text);
                }
            }
            Node::Comment(_) => {}
            Node::Target(attrs) => {
                if let Some(id) = attrs.id() {
                    self.out.push_str(&format!(r#"<span id="{}"></span>"#, escape_html(id)));
                }
            }
        }
    }

    fn open(&mut self, tag: &str, attrs: &Attrs, classes: &[&str]) {
        self.out.push('<');
        self.out.push_str(tag);
        self.out.push_str(&attributes(attrs, classes));
        self.out.push('>');
    }

    fn element(&mut self, tag: &str, attrs: &Attrs, classes: &[&str], children: &[Node]) {
        self.open(tag, attrs, classes);
        self.write_all(children);
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }
}

/// Render `id` and `class` attributes with a leading space.
fn attributes(attrs: &Attrs, classes: &[&str]) -> String {
    let mut out = String::new();
    if let Some(id) = attrs.id() {
        out.push_str(&format!(r#" id="{}""#, escape_html(id)));
    }
    let all: Vec<&str> = classes
        .iter()
        .copied()
        .chain(attrs.classes.iter().map(String::as_str))
        .collect();
    if !all.is_empty() {
        out.push_str(&format!(r#" class="{}""#, escape_html(&all.join(" "))));
    }
    out
}
