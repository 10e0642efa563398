//! Markdown to document tree conversion.
//!
//! Headings open nested sections, so the tree mirrors the heading outline.
//! Fenced blocks whose info string is a `{directive}` are interpreted:
//!
//! - `{math}`: display math.
//! - `{py:module}` / `{py:currentmodule}`: sets the module used by following
//!   Python object descriptions.
//! - `{domain:objtype} signature`: API object description for the `py`,
//!   `c`, `cpp` and `js` domains. Leading `:key: value` lines are options;
//!   the rest of the body is parsed as Markdown.
//! - any other `{name}`: container classed `name` holding the parsed body.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;

use crate::document::Document;
use crate::node::{Attrs, Desc, DescSignature, Element, Image, LiteralBlock, Node, Raw, Reference};
use crate::util::make_id;

const DESC_DOMAINS: &[&str] = &["py", "c", "cpp", "js"];

static OPTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:([\w-]+):\s*(.*)$").expect("invalid option line regex"));

/// Parse a Markdown source into a [`Document`].
pub fn parse_document(docname: &str, source_path: &Path, source: &str) -> Document {
    Document::new(docname, source_path, parse_markdown(source))
}

/// Parse Markdown into top-level document nodes.
///
/// # Examples
///
/// ```
/// use vellum_doctree::{Node, parse_markdown};
///
/// let nodes = parse_markdown("# Title\n\nSome *text*.\n");
/// assert_eq!(nodes.len(), 1);
/// assert_eq!(nodes[0].section_title_text().as_deref(), Some("Title"));
/// assert_eq!(nodes[0].id(), Some("title"));
/// ```
pub fn parse_markdown(source: &str) -> Vec<Node> {
    TreeBuilder::new(DescContext::default(), false).build(source)
}

fn parser_options() -> Options {
    Options::ENABLE_MATH | Options::ENABLE_TASKLISTS
}

/// Module and enclosing object for Python descriptions.
#[derive(Clone, Debug, Default)]
struct DescContext {
    module: Option<String>,
    prefix: Option<String>,
}

struct Frame {
    node: Node,
    /// Heading level for section frames.
    level: Option<u8>,
}

struct CodeState {
    info: String,
    buf: String,
}

struct TreeBuilder {
    stack: Vec<Frame>,
    code: Option<CodeState>,
    html: Option<String>,
    ids: HashMap<String, usize>,
    context: DescContext,
    /// Headings become rubrics inside directive bodies.
    nested: bool,
}

impl TreeBuilder {
    fn new(context: DescContext, nested: bool) -> Self {
        Self {
            stack: vec![Frame {
                node: Node::Container(Element::default()),
                level: None,
            }],
            code: None,
            html: None,
            ids: HashMap::new(),
            context,
            nested,
        }
    }

    fn build(mut self, source: &str) -> Vec<Node> {
        for event in Parser::new_ext(source, parser_options()) {
            self.process_event(event);
        }
        if self.code.is_some() {
            self.end_tag(TagEnd::CodeBlock);
        }
        // Unterminated constructs are closed with what they hold so far.
        while self.stack.len() > 1 {
            self.close_frame();
        }
        match self.stack.pop() {
            Some(Frame {
                node: Node::Container(root),
                ..
            }) => root.children,
            _ => Vec::new(),
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.append(Node::Literal(Element::text(code.as_ref()))),
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                self.append(Node::Math(math.to_string()));
            }
            Event::Html(html) => match self.html.as_mut() {
                Some(buf) => buf.push_str(&html),
                None => self.append(raw_html(&html)),
            },
            Event::InlineHtml(html) => self.append(raw_html(&html)),
            Event::SoftBreak => self.text("\n"),
            Event::HardBreak => self.append(Node::LineBreak),
            Event::Rule => self.append(Node::Transition),
            Event::TaskListMarker(checked) => {
                self.append(Node::text(if checked { "[x] " } else { "[ ] " }));
            }
            Event::FootnoteReference(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        let node = match tag {
            Tag::Heading { level, .. } => {
                let level = level as u8;
                if self.at_block_level() {
                    self.close_sections(level);
                }
                Node::Title(Element::default())
            }
            Tag::CodeBlock(kind) => {
                let info = match kind {
                    CodeBlockKind::Fenced(info) => info.trim().to_owned(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.code = Some(CodeState {
                    info,
                    buf: String::new(),
                });
                return;
            }
            Tag::HtmlBlock => {
                self.html = Some(String::new());
                return;
            }
            Tag::Paragraph => Node::Paragraph(Element::default()),
            Tag::BlockQuote(_) => Node::BlockQuote(Element::default()),
            Tag::List(Some(_)) => Node::EnumeratedList(Element::default()),
            Tag::List(None) => Node::BulletList(Element::default()),
            Tag::Item => Node::ListItem(Element::default()),
            Tag::Emphasis => Node::Emphasis(Element::default()),
            Tag::Strong => Node::Strong(Element::default()),
            Tag::Link {
                dest_url, title, ..
            } => {
                let (refuri, internal) = resolve_link(&dest_url);
                Node::Reference(Reference {
                    refuri,
                    internal,
                    reftitle: (!title.is_empty()).then(|| title.to_string()),
                    ..Reference::default()
                })
            }
            Tag::Image { dest_url, .. } => Node::Image(Image {
                attrs: Attrs::default(),
                uri: dest_url.to_string(),
                alt: String::new(),
            }),
            Tag::FootnoteDefinition(_)
            | Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::Table(_)
            | Tag::TableHead
            | Tag::TableRow
            | Tag::TableCell
            | Tag::Strikethrough
            | Tag::Superscript
            | Tag::Subscript => Node::Inline(Element::default()),
        };
        self.stack.push(Frame { node, level: None });
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    for node in self.code_block(&code.info, code.buf) {
                        self.append(node);
                    }
                }
            }
            TagEnd::HtmlBlock => {
                if let Some(html) = self.html.take() {
                    self.append(raw_html(&html));
                }
            }
            TagEnd::Heading(level) => self.end_heading(level as u8),
            _ => self.close_frame(),
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(code) = self.code.as_mut() {
            code.buf.push_str(text);
            return;
        }
        if let Some(html) = self.html.as_mut() {
            html.push_str(text);
            return;
        }
        if let Some(Frame {
            node: Node::Image(image),
            ..
        }) = self.stack.last_mut()
        {
            image.alt.push_str(text);
            return;
        }
        // Merge adjacent text runs.
        if let Some(frame) = self.stack.last_mut()
            && let Some(children) = frame.node.children_mut()
        {
            if let Some(Node::Text(prev)) = children.last_mut() {
                prev.push_str(text);
            } else {
                children.push(Node::text(text));
            }
        }
    }

    fn append(&mut self, node: Node) {
        if let Some(children) = self
            .stack
            .last_mut()
            .and_then(|frame| frame.node.children_mut())
        {
            children.push(node);
        }
    }

    /// Whether only sections are open, so a heading starts a new section.
    fn at_block_level(&self) -> bool {
        !self.nested && self.stack.iter().skip(1).all(|frame| frame.level.is_some())
    }

    fn close_sections(&mut self, level: u8) {
        while self
            .stack
            .last()
            .and_then(|frame| frame.level)
            .is_some_and(|open| open >= level)
        {
            self.close_frame();
        }
    }

    fn end_heading(&mut self, level: u8) {
        let Some(Frame {
            node: Node::Title(title),
            ..
        }) = self.stack.pop()
        else {
            return;
        };
        if !self.at_block_level() {
            self.append(Node::Rubric(title));
            return;
        }
        let text = Node::Title(title.clone()).astext();
        let id = self.unique_id(&make_id(&text));
        let attrs = Attrs::with_id(id).named(text.to_lowercase());
        self.stack.push(Frame {
            node: Node::Section(Element::with_attrs(attrs, vec![Node::Title(title)])),
            level: Some(level),
        });
    }

    fn unique_id(&mut self, base: &str) -> String {
        let count = self.ids.entry(base.to_owned()).or_insert(0);
        let id = if *count == 0 {
            base.to_owned()
        } else {
            format!("{base}-{count}")
        };
        *count += 1;
        id
    }

    fn close_frame(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        if let Some(mut frame) = self.stack.pop() {
            if let Node::ListItem(item) = &mut frame.node {
                wrap_inline_runs(&mut item.children);
            }
            self.append(frame.node);
        }
    }

    fn code_block(&mut self, info: &str, body: String) -> Vec<Node> {
        let Some((directive, argument)) = parse_directive(info) else {
            let language = info.split_whitespace().next().map(str::to_owned);
            return vec![Node::LiteralBlock(LiteralBlock {
                attrs: Attrs::default(),
                language,
                children: vec![Node::Text(body)],
            })];
        };

        match directive {
            "math" => vec![Node::Math(body.trim_end().to_owned())],
            "py:module" | "py:currentmodule" => {
                let module = argument.trim();
                if module.is_empty() || module == "None" {
                    self.context.module = None;
                    return Vec::new();
                }
                self.context.module = Some(module.to_owned());
                if directive == "py:module" {
                    vec![Node::Target(Attrs::with_id(format!("module-{module}")))]
                } else {
                    Vec::new()
                }
            }
            _ => match directive.split_once(':') {
                Some((domain, objtype)) if DESC_DOMAINS.contains(&domain) => {
                    vec![self.desc(domain, objtype, argument, &body)]
                }
                _ => {
                    tracing::debug!(directive, "rendering directive as container");
                    let children =
                        TreeBuilder::new(self.context.clone(), true).build(&body);
                    vec![Node::Container(Element::with_attrs(
                        Attrs::with_classes([directive]),
                        children,
                    ))]
                }
            },
        }
    }

    fn desc(&self, domain: &str, objtype: &str, argument: &str, body: &str) -> Node {
        let (options, content) = split_options(body);
        let (name, params) = split_signature(argument);

        let mut signature = DescSignature::default();
        let mut nested = self.context.clone();
        match domain {
            "py" => {
                let module = options
                    .get("module")
                    .cloned()
                    .or_else(|| self.context.module.clone());
                let (module, fullname) = python_names(name, module, self.context.prefix.as_deref());
                signature.attrs.ids.push(match &module {
                    Some(module) => format!("{module}.{fullname}"),
                    None => fullname.clone(),
                });
                if objtype == "class" || objtype == "exception" {
                    nested.prefix = Some(fullname.clone());
                }
                nested.module.clone_from(&module);
                signature.module = module;
                signature.fullname = Some(fullname);
            }
            "js" => {
                let object = name.rsplit_once('.').map(|(object, _)| object.to_owned());
                signature.attrs.ids.push(name.to_owned());
                signature.object = object;
                signature.fullname = Some(name.to_owned());
            }
            _ => {
                signature.attrs.ids.push(format!("{domain}.{name}"));
                signature.names.push(name.to_owned());
            }
        }

        signature.children.push(Node::Inline(Element::with_attrs(
            Attrs::with_classes(["sig-name", "descname"]),
            vec![Node::text(name)],
        )));
        if !params.is_empty() {
            signature.children.push(Node::Inline(Element::with_attrs(
                Attrs::with_classes(["sig-params"]),
                vec![Node::text(params)],
            )));
        }

        let content = TreeBuilder::new(nested, true).build(&content);
        Node::Desc(Desc {
            attrs: Attrs::with_classes([domain, objtype]),
            domain: domain.to_owned(),
            objtype: objtype.to_owned(),
            children: vec![
                Node::DescSignature(signature),
                Node::DescContent(Element::new(content)),
            ],
        })
    }
}

fn raw_html(html: &str) -> Node {
    let trimmed = html.trim();
    if let Some(comment) = trimmed
        .strip_prefix("<!--")
        .and_then(|rest| rest.strip_suffix("-->"))
    {
        Node::Comment(comment.trim().to_owned())
    } else {
        Node::Raw(Raw {
            format: "html".to_owned(),
            text: html.to_owned(),
        })
    }
}

/// Split `{name} argument` into its parts.
fn parse_directive(info: &str) -> Option<(&str, &str)> {
    let rest = info.strip_prefix('{')?;
    let (name, argument) = rest.split_once('}')?;
    Some((name.trim(), argument.trim()))
}

/// Split leading `:key: value` lines off a directive body.
fn split_options(body: &str) -> (HashMap<String, String>, String) {
    let mut options = HashMap::new();
    let mut lines = body.lines().peekable();
    while let Some(caps) = lines.peek().and_then(|line| OPTION_LINE.captures(line.trim())) {
        options.insert(caps[1].to_owned(), caps[2].trim().to_owned());
        lines.next();
    }
    (options, lines.collect::<Vec<_>>().join("\n"))
}

/// Split `name(params)` into the name and the parameter list.
fn split_signature(argument: &str) -> (&str, &str) {
    match argument.find('(') {
        Some(idx) => (argument[..idx].trim(), argument[idx..].trim()),
        None => (argument.trim(), ""),
    }
}

/// Module and qualified name of a Python object.
fn python_names(name: &str, module: Option<String>, prefix: Option<&str>) -> (Option<String>, String) {
    match module {
        Some(module) => {
            let relative = name
                .strip_prefix(module.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or(name);
            let fullname = match prefix {
                Some(prefix) if !relative.starts_with(&format!("{prefix}.")) => {
                    format!("{prefix}.{relative}")
                }
                _ => relative.to_owned(),
            };
            (Some(module), fullname)
        }
        None => match name.rsplit_once('.') {
            Some((module, fullname)) => (Some(module.to_owned()), fullname.to_owned()),
            None => (None, name.to_owned()),
        },
    }
}

/// Rewrite local `.md` targets to their rendered `.html` pages.
///
/// Returns the URI and whether it points inside the site.
fn resolve_link(url: &str) -> (String, bool) {
    if url.contains("://") || url.starts_with("//") || url.starts_with("mailto:") || url.starts_with("www.") {
        return (url.to_owned(), false);
    }
    let (path, fragment) = match url.find('#') {
        Some(idx) => url.split_at(idx),
        None => (url, ""),
    };
    match path.strip_suffix(".md") {
        Some(stem) => (format!("{stem}.html{fragment}"), true),
        None => (url.to_owned(), true),
    }
}

fn is_inline(node: &Node) -> bool {
    matches!(
        node,
        Node::Text(_)
            | Node::Inline(_)
            | Node::Emphasis(_)
            | Node::Strong(_)
            | Node::Literal(_)
            | Node::Reference(_)
            | Node::LineBreak
            | Node::Image(_)
            | Node::Math(_)
    )
}

/// Wrap runs of inline children (tight list items) in paragraphs.
fn wrap_inline_runs(children: &mut Vec<Node>) {
    if !children.iter().any(is_inline) {
        return;
    }
    let mut wrapped = Vec::with_capacity(children.len());
    let mut run = Vec::new();
    for child in children.drain(..) {
        if is_inline(&child) {
            run.push(child);
        } else {
            if !run.is_empty() {
                wrapped.push(Node::paragraph(std::mem::take(&mut run)));
            }
            wrapped.push(child);
        }
    }
    if !run.is_empty() {
        wrapped.push(Node::paragraph(run));
    }
    *children = wrapped;
}
