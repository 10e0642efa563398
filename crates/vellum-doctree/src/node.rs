//! Document tree node types.
//!
//! The tree is a closed sum type: every node kind the parser, the
//! transformers and the HTML writer know about is a [`Node`] variant.
//! Dispatch is by pattern matching; there is no runtime type probing.
//!
//! Sections follow the docutils layout: the section title is the first
//! [`Node::Title`] child, so inserting a node at index 0 of a section puts it
//! *before* the section's own title.

/// Common attributes carried by element nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attrs {
    /// Anchor identifiers. The first one is rendered as the HTML `id`.
    pub ids: Vec<String>,
    /// Reference names (lowercased titles for sections).
    pub names: Vec<String>,
    /// CSS classes.
    pub classes: Vec<String>,
}

impl Attrs {
    /// Attributes with a single id.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            ids: vec![id.into()],
            ..Self::default()
        }
    }

    /// Attributes with the given classes.
    #[must_use]
    pub fn with_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Add a reference name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// First id, if any.
    pub fn id(&self) -> Option<&str> {
        self.ids.first().map(String::as_str)
    }

    /// Whether the given class is present.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Generic element: attributes plus child nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    pub attrs: Attrs,
    pub children: Vec<Node>,
}

impl Element {
    /// Element without attributes.
    #[must_use]
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            attrs: Attrs::default(),
            children,
        }
    }

    /// Element with attributes.
    #[must_use]
    pub fn with_attrs(attrs: Attrs, children: Vec<Node>) -> Self {
        Self { attrs, children }
    }

    /// Element holding a single text node.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![Node::Text(text.into())])
    }
}

/// Hyperlink.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reference {
    pub attrs: Attrs,
    /// Target URI.
    pub refuri: String,
    /// Whether the target is a page of this site.
    pub internal: bool,
    /// Tooltip title.
    pub reftitle: Option<String>,
    pub children: Vec<Node>,
}

/// Preformatted code.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LiteralBlock {
    pub attrs: Attrs,
    /// Highlight language.
    pub language: Option<String>,
    /// Code text, as text or inline nodes (one per line for generated blocks).
    pub children: Vec<Node>,
}

/// API object description (`desc` in docutils terms).
///
/// Children are [`Node::DescSignature`] nodes followed by one
/// [`Node::DescContent`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Desc {
    pub attrs: Attrs,
    /// Domain name (`py`, `c`, `cpp`, `js`).
    pub domain: String,
    /// Object type (`function`, `class`, `method`, ...).
    pub objtype: String,
    pub children: Vec<Node>,
}

/// Signature line of an API object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DescSignature {
    pub attrs: Attrs,
    /// Containing module (Python domain).
    pub module: Option<String>,
    /// Name relative to the module (or object for JavaScript).
    pub fullname: Option<String>,
    /// Containing object (JavaScript domain).
    pub object: Option<String>,
    /// Declared names (C and C++ domains).
    pub names: Vec<String>,
    pub children: Vec<Node>,
}

impl DescSignature {
    /// Look up a signature field by its domain key name.
    ///
    /// Returns `None` for unknown keys and unset fields.
    pub fn info(&self, key: &str) -> Option<String> {
        match key {
            "module" => self.module.clone(),
            "fullname" => self.fullname.clone(),
            "object" => self.object.clone(),
            "names" if !self.names.is_empty() => Some(self.names.join(" ")),
            _ => None,
        }
    }
}

/// Image reference.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Image {
    pub attrs: Attrs,
    pub uri: String,
    pub alt: String,
}

/// Raw pass-through content for a given output format.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Raw {
    pub format: String,
    pub text: String,
}

/// Document tree node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Section(Element),
    Title(Element),
    Paragraph(Element),
    Inline(Element),
    Emphasis(Element),
    Strong(Element),
    Literal(Element),
    Reference(Reference),
    LiteralBlock(LiteralBlock),
    Container(Element),
    Rubric(Element),
    BulletList(Element),
    EnumeratedList(Element),
    ListItem(Element),
    BlockQuote(Element),
    /// Forced line break.
    LineBreak,
    Transition,
    Desc(Desc),
    DescSignature(DescSignature),
    DescContent(Element),
    Image(Image),
    /// Display math source.
    Math(String),
    Raw(Raw),
    Comment(String),
    /// Anchor without content.
    Target(Attrs),
}

/// Fieldless discriminant of [`Node`], used for kind-based filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Text,
    Section,
    Title,
    Paragraph,
    Inline,
    Emphasis,
    Strong,
    Literal,
    Reference,
    LiteralBlock,
    Container,
    Rubric,
    BulletList,
    EnumeratedList,
    ListItem,
    BlockQuote,
    LineBreak,
    Transition,
    Desc,
    DescSignature,
    DescContent,
    Image,
    Math,
    Raw,
    Comment,
    Target,
}

const NO_CHILDREN: &[Node] = &[];

impl Node {
    /// Text node.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Section with an id, a name and a title.
    #[must_use]
    pub fn section(id: impl Into<String>, title: impl Into<String>) -> Self {
        let title = title.into();
        let attrs = Attrs::with_id(id).named(title.clone());
        Self::Section(Element::with_attrs(
            attrs,
            vec![Self::Title(Element::text(title))],
        ))
    }

    /// Paragraph holding the given children.
    #[must_use]
    pub fn paragraph(children: Vec<Node>) -> Self {
        Self::Paragraph(Element::new(children))
    }

    /// Inline node holding plain text.
    #[must_use]
    pub fn inline(text: impl Into<String>) -> Self {
        Self::Inline(Element::text(text))
    }

    /// Node kind discriminant.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Text(_) => NodeKind::Text,
            Self::Section(_) => NodeKind::Section,
            Self::Title(_) => NodeKind::Title,
            Self::Paragraph(_) => NodeKind::Paragraph,
            Self::Inline(_) => NodeKind::Inline,
            Self::Emphasis(_) => NodeKind::Emphasis,
            Self::Strong(_) => NodeKind::Strong,
            Self::Literal(_) => NodeKind::Literal,
            Self::Reference(_) => NodeKind::Reference,
            Self::LiteralBlock(_) => NodeKind::LiteralBlock,
            Self::Container(_) => NodeKind::Container,
            Self::Rubric(_) => NodeKind::Rubric,
            Self::BulletList(_) => NodeKind::BulletList,
            Self::EnumeratedList(_) => NodeKind::EnumeratedList,
            Self::ListItem(_) => NodeKind::ListItem,
            Self::BlockQuote(_) => NodeKind::BlockQuote,
            Self::LineBreak => NodeKind::LineBreak,
            Self::Transition => NodeKind::Transition,
            Self::Desc(_) => NodeKind::Desc,
            Self::DescSignature(_) => NodeKind::DescSignature,
            Self::DescContent(_) => NodeKind::DescContent,
            Self::Image(_) => NodeKind::Image,
            Self::Math(_) => NodeKind::Math,
            Self::Raw(_) => NodeKind::Raw,
            Self::Comment(_) => NodeKind::Comment,
            Self::Target(_) => NodeKind::Target,
        }
    }

    /// Attributes of element nodes.
    pub fn attrs(&self) -> Option<&Attrs> {
        match self {
            Self::Section(e)
            | Self::Title(e)
            | Self::Paragraph(e)
            | Self::Inline(e)
            | Self::Emphasis(e)
            | Self::Strong(e)
            | Self::Literal(e)
            | Self::Container(e)
            | Self::Rubric(e)
            | Self::BulletList(e)
            | Self::EnumeratedList(e)
            | Self::ListItem(e)
            | Self::BlockQuote(e)
            | Self::DescContent(e) => Some(&e.attrs),
            Self::Reference(r) => Some(&r.attrs),
            Self::LiteralBlock(b) => Some(&b.attrs),
            Self::Desc(d) => Some(&d.attrs),
            Self::DescSignature(s) => Some(&s.attrs),
            Self::Image(i) => Some(&i.attrs),
            Self::Target(a) => Some(a),
            Self::Text(_)
            | Self::LineBreak
            | Self::Transition
            | Self::Math(_)
            | Self::Raw(_)
            | Self::Comment(_) => None,
        }
    }

    /// First id of the node, if any.
    pub fn id(&self) -> Option<&str> {
        self.attrs().and_then(Attrs::id)
    }

    /// Child nodes (empty for leaves).
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Section(e)
            | Self::Title(e)
            | Self::Paragraph(e)
            | Self::Inline(e)
            | Self::Emphasis(e)
            | Self::Strong(e)
            | Self::Literal(e)
            | Self::Container(e)
            | Self::Rubric(e)
            | Self::BulletList(e)
            | Self::EnumeratedList(e)
            | Self::ListItem(e)
            | Self::BlockQuote(e)
            | Self::DescContent(e) => &e.children,
            Self::Reference(r) => &r.children,
            Self::LiteralBlock(b) => &b.children,
            Self::Desc(d) => &d.children,
            Self::DescSignature(s) => &s.children,
            Self::Text(_)
            | Self::LineBreak
            | Self::Transition
            | Self::Image(_)
            | Self::Math(_)
            | Self::Raw(_)
            | Self::Comment(_)
            | Self::Target(_) => NO_CHILDREN,
        }
    }

    /// Mutable child list, `None` for leaves.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Self::Section(e)
            | Self::Title(e)
            | Self::Paragraph(e)
            | Self::Inline(e)
            | Self::Emphasis(e)
            | Self::Strong(e)
            | Self::Literal(e)
            | Self::Container(e)
            | Self::Rubric(e)
            | Self::BulletList(e)
            | Self::EnumeratedList(e)
            | Self::ListItem(e)
            | Self::BlockQuote(e)
            | Self::DescContent(e) => Some(&mut e.children),
            Self::Reference(r) => Some(&mut r.children),
            Self::LiteralBlock(b) => Some(&mut b.children),
            Self::Desc(d) => Some(&mut d.children),
            Self::DescSignature(s) => Some(&mut s.children),
            Self::Text(_)
            | Self::LineBreak
            | Self::Transition
            | Self::Image(_)
            | Self::Math(_)
            | Self::Raw(_)
            | Self::Comment(_)
            | Self::Target(_) => None,
        }
    }

    /// Whether children are joined without separators in [`astext`](Self::astext).
    fn is_text_element(&self) -> bool {
        matches!(
            self,
            Self::Title(_)
                | Self::Paragraph(_)
                | Self::Inline(_)
                | Self::Emphasis(_)
                | Self::Strong(_)
                | Self::Literal(_)
                | Self::Reference(_)
                | Self::LiteralBlock(_)
                | Self::Rubric(_)
                | Self::DescSignature(_)
        )
    }

    /// Plain-text rendition of the node.
    ///
    /// Text elements concatenate their children; structural elements join
    /// their children's text with blank lines.
    pub fn astext(&self) -> String {
        match self {
            Self::Text(text) | Self::Math(text) => text.clone(),
            Self::LineBreak => "\n".to_owned(),
            Self::Image(image) => image.alt.clone(),
            Self::Raw(raw) => raw.text.clone(),
            Self::Comment(_) | Self::Target(_) | Self::Transition => String::new(),
            _ => {
                let parts = self.children().iter().map(Node::astext);
                if self.is_text_element() {
                    parts.collect()
                } else {
                    parts
                        .filter(|part| !part.is_empty())
                        .collect::<Vec<_>>()
                        .join("\n\n")
                }
            }
        }
    }

    /// Title node of a section.
    pub fn section_title(&self) -> Option<&Node> {
        match self {
            Self::Section(e) => e.children.iter().find(|c| matches!(c, Self::Title(_))),
            _ => None,
        }
    }

    /// Title text of a section.
    pub fn section_title_text(&self) -> Option<String> {
        self.section_title().map(Node::astext)
    }

    /// Pre-order iterator over this node and all of its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// First descendant (including self) matching the predicate.
    pub fn find<P>(&self, mut predicate: P) -> Option<&Node>
    where
        P: FnMut(&Node) -> bool,
    {
        self.descendants().find(|node| predicate(node))
    }

    /// Remove every descendant for which `keep` returns false.
    pub fn retain_descendants<F>(&mut self, keep: &mut F)
    where
        F: FnMut(&Node) -> bool,
    {
        if let Some(children) = self.children_mut() {
            retain_nodes(children, keep);
        }
    }
}

/// Remove nodes (recursively) for which `keep` returns false.
pub fn retain_nodes<F>(nodes: &mut Vec<Node>, keep: &mut F)
where
    F: FnMut(&Node) -> bool,
{
    nodes.retain(|node| keep(node));
    for node in nodes.iter_mut() {
        node.retain_descendants(keep);
    }
}

/// Visit every node in pre-order with mutable access.
///
/// Children added by `visit` to the node it was called on are visited too.
pub fn walk_mut<F>(nodes: &mut [Node], visit: &mut F)
where
    F: FnMut(&mut Node),
{
    for node in nodes {
        visit(node);
        if let Some(children) = node.children_mut() {
            walk_mut(children, visit);
        }
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Descendants<'a> {
    /// Iterator over a forest of root nodes.
    pub fn of(nodes: &'a [Node]) -> Self {
        Self {
            stack: nodes.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_section() -> Node {
        let mut section = Node::section("intro", "Intro");
        if let Some(children) = section.children_mut() {
            children.push(Node::paragraph(vec![
                Node::text("Hello "),
                Node::Strong(Element::text("world")),
            ]));
            children.push(Node::paragraph(vec![Node::text("Second")]));
        }
        section
    }

    #[test]
    fn test_section_title_text() {
        let section = sample_section();
        assert_eq!(section.section_title_text(), Some("Intro".to_owned()));
        assert_eq!(section.id(), Some("intro"));
    }

    #[test]
    fn test_astext_joins_blocks_with_blank_lines() {
        let section = sample_section();
        assert_eq!(section.astext(), "Intro\n\nHello world\n\nSecond");
    }

    #[test]
    fn test_descendants_pre_order() {
        let section = sample_section();
        let kinds: Vec<NodeKind> = section.descendants().map(Node::kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Section,
                NodeKind::Title,
                NodeKind::Text,
                NodeKind::Paragraph,
                NodeKind::Text,
                NodeKind::Strong,
                NodeKind::Text,
                NodeKind::Paragraph,
                NodeKind::Text,
            ]
        );
    }

    #[test]
    fn test_retain_descendants_removes_nested_nodes() {
        let mut section = sample_section();
        section.retain_descendants(&mut |node| !matches!(node, Node::Strong(_)));
        assert_eq!(section.astext(), "Intro\n\nHello \n\nSecond");
    }

    #[test]
    fn test_walk_mut_visits_all_nodes() {
        let mut nodes = vec![sample_section()];
        let mut count = 0;
        walk_mut(&mut nodes, &mut |_| count += 1);
        assert_eq!(count, 9);
    }

    #[test]
    fn test_signature_info_keys() {
        let sig = DescSignature {
            module: Some("pkg.mod".to_owned()),
            fullname: Some("Thing.run".to_owned()),
            ..DescSignature::default()
        };
        assert_eq!(sig.info("module"), Some("pkg.mod".to_owned()));
        assert_eq!(sig.info("fullname"), Some("Thing.run".to_owned()));
        assert_eq!(sig.info("names"), None);
        assert_eq!(sig.info("unknown"), None);
    }
}
