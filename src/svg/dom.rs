//! Arena-backed SVG document tree.
//!
//! Nodes live in a flat `Vec` and refer to each other by [`NodeId`], so a
//! whole document is cloned with one `Vec` copy and handles never dangle:
//! rebuilding a tree produces a new arena with its own root handle.
//!
//! Parsing uses quick-xml's event reader. Only the root element and its
//! subtree are kept; the XML declaration, DOCTYPE and anything else outside
//! the root is dropped, so serialized output can go straight into HTML.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::SvgError;
use crate::utils::html::{escape_attr, escape_text, resolve_entity};

/// Index of a node inside its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Payload of a tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    /// Decoded character data.
    Text(String),
    /// Raw `<![CDATA[...]]>` content.
    CData(String),
    /// Raw comment content.
    Comment(String),
    /// Raw processing instruction content (target included).
    Instruction(String),
    /// Entity reference that could not be resolved, kept by name.
    EntityRef(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Element name plus attributes in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
        }
    }

    /// Name without namespace prefix (`svg:title` -> `title`).
    #[inline]
    pub fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    #[inline]
    pub fn is_tag(&self, name: &str) -> bool {
        self.local_name() == name
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_attr_mut(&mut self, key: &str) -> Option<&mut String> {
        self.attrs
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Set an attribute, keeping its position when it already exists.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.get_attr_mut(&key) {
            Some(existing) => *existing = value,
            None => self.attrs.push((key, value)),
        }
    }

    pub fn remove_attr(&mut self, key: &str) -> Option<String> {
        let idx = self.attrs.iter().position(|(k, _)| k == key)?;
        Some(self.attrs.remove(idx).1)
    }
}

/// A parsed SVG document: node arena plus root handle.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Parse markup into a document.
    pub fn parse(raw: &str) -> Result<Self, SvgError> {
        let mut reader = Reader::from_str(raw);
        let mut builder = TreeBuilder::default();

        loop {
            let event = reader.read_event().map_err(|err| {
                SvgError::Malformed(format!("{err} (at byte {})", reader.error_position()))
            })?;
            match event {
                Event::Start(start) => builder.open(element_from(&start)?)?,
                Event::Empty(start) => {
                    builder.open(element_from(&start)?)?;
                    builder.close()?;
                }
                Event::End(_) => builder.close()?,
                Event::Text(text) => builder.text(utf8(&text)?)?,
                Event::GeneralRef(entity) => {
                    let name = utf8(&entity)?;
                    match character_reference(name)? {
                        Some(c) => builder.text(c.encode_utf8(&mut [0; 4]))?,
                        None => builder.leaf(NodeKind::EntityRef(name.to_string())),
                    }
                }
                Event::CData(data) => builder.leaf(NodeKind::CData(utf8(&data)?.to_string())),
                Event::Comment(comment) => {
                    builder.leaf(NodeKind::Comment(utf8(&comment)?.to_string()));
                }
                Event::PI(pi) => builder.leaf(NodeKind::Instruction(utf8(&pi)?.to_string())),
                // Never carried into output
                Event::Decl(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        builder.finish()
    }

    /// Handle of the root element.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.node(id).kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.node_mut(id).kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    /// The root element. Always present in a parsed document.
    pub fn root_element(&self) -> &Element {
        match &self.nodes[self.root.0].kind {
            NodeKind::Element(el) => el,
            _ => unreachable!("document root is always an element"),
        }
    }

    pub fn root_element_mut(&mut self) -> &mut Element {
        match &mut self.nodes[self.root.0].kind {
            NodeKind::Element(el) => el,
            _ => unreachable!("document root is always an element"),
        }
    }

    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// All elements reachable from the root, in document (pre-)order.
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if matches!(node.kind, NodeKind::Element(_)) {
                out.push(id);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Concatenated text and CDATA of the direct children.
    #[cfg(test)]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            match &self.node(child).kind {
                NodeKind::Text(text) | NodeKind::CData(text) => out.push_str(text),
                _ => {}
            }
        }
        out
    }

    /// Apply `f` to every direct text and CDATA child of `id`.
    pub fn edit_text(&mut self, id: NodeId, mut f: impl FnMut(&str) -> String) {
        let children = self.node(id).children.clone();
        for child in children {
            if let NodeKind::Text(text) | NodeKind::CData(text) = &mut self.node_mut(child).kind {
                *text = f(text);
            }
        }
    }

    /// Create a detached element. Attach it with [`Document::prepend_child`].
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.alloc(NodeKind::Element(Element::new(name)), None)
    }

    /// Insert `child` as the first child of `parent`.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.insert(0, child);
    }

    /// Replace all children of `id` with a single text node.
    ///
    /// An existing text child is rewritten in place; the other children are
    /// detached.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        let children = std::mem::take(&mut self.node_mut(id).children);
        let reused = children
            .iter()
            .copied()
            .find(|&child| matches!(self.node(child).kind, NodeKind::Text(_)));
        for &child in &children {
            if Some(child) != reused {
                self.node_mut(child).parent = None;
            }
        }

        match reused {
            Some(node) => {
                self.node_mut(node).kind = NodeKind::Text(text.to_string());
                self.node_mut(id).children.push(node);
            }
            None => {
                self.alloc(NodeKind::Text(text.to_string()), Some(id));
            }
        }
    }

    fn alloc(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    /// Serialize the root element and its subtree.
    pub fn serialize(&self) -> String {
        let mut out = String::with_capacity(self.nodes.len() * 32);
        self.write_node(self.root, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Element(el) => {
                out.push('<');
                out.push_str(&el.name);
                for (key, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                if node.children.is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for &child in &node.children {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(&el.name);
                out.push('>');
            }
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::CData(data) => {
                out.push_str("<![CDATA[");
                out.push_str(data);
                out.push_str("]]>");
            }
            NodeKind::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
            NodeKind::Instruction(pi) => {
                out.push_str("<?");
                out.push_str(pi);
                out.push_str("?>");
            }
            NodeKind::EntityRef(name) => {
                out.push('&');
                out.push_str(name);
                out.push(';');
            }
        }
    }
}

// ============================================================================
// Parsing helpers
// ============================================================================

#[inline]
fn utf8(bytes: &[u8]) -> Result<&str, SvgError> {
    std::str::from_utf8(bytes).map_err(|err| SvgError::Malformed(err.to_string()))
}

/// Convert a start tag into an [`Element`], decoding attribute values.
fn element_from(start: &BytesStart<'_>) -> Result<Element, SvgError> {
    let mut element = Element::new(utf8(start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr.map_err(|err| SvgError::Malformed(err.to_string()))?;
        let key = utf8(attr.key.as_ref())?;
        let value = decode_attr_value(utf8(&attr.value)?)?;
        element.attrs.push((key.to_string(), value.into_owned()));
    }
    Ok(element)
}

/// Resolve `&name;`. Unknown named entities give `None` and are kept as
/// [`NodeKind::EntityRef`]; a numeric reference must name an XML character.
fn character_reference(name: &str) -> Result<Option<char>, SvgError> {
    match resolve_entity(name) {
        Some(c) => Ok(Some(c)),
        None if name.starts_with('#') => Err(SvgError::Malformed(format!(
            "invalid character reference `&{name};`"
        ))),
        None => Ok(None),
    }
}

/// Decode references in an attribute value.
///
/// Attribute values are stored decoded and re-escaped on output, so there is
/// no way to carry an unknown entity through; it is rejected instead.
fn decode_attr_value(raw: &str) -> Result<Cow<'_, str>, SvgError> {
    if !raw.contains('&') {
        return Ok(Cow::Borrowed(raw));
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let Some(end) = tail.find(';') else {
            return Err(SvgError::Malformed(format!(
                "unterminated reference in attribute value `{raw}`"
            )));
        };
        let name = &tail[..end];
        let c = character_reference(name)?.ok_or_else(|| {
            SvgError::Malformed(format!("undefined entity `&{name};` in attribute value"))
        })?;
        out.push(c);
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    Ok(Cow::Owned(out))
}

/// Incrementally assembles the arena from reader events.
#[derive(Default)]
struct TreeBuilder {
    nodes: Vec<Node>,
    stack: Vec<NodeId>,
    root: Option<NodeId>,
}

impl TreeBuilder {
    fn alloc(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    fn open(&mut self, element: Element) -> Result<(), SvgError> {
        let parent = self.stack.last().copied();
        if parent.is_none() && self.root.is_some() {
            return Err(SvgError::Malformed(format!(
                "unexpected second root element <{}>",
                element.name
            )));
        }
        let id = self.alloc(NodeKind::Element(element), parent);
        if parent.is_none() {
            self.root = Some(id);
        }
        self.stack.push(id);
        Ok(())
    }

    fn close(&mut self) -> Result<(), SvgError> {
        self.stack
            .pop()
            .map(|_| ())
            .ok_or_else(|| SvgError::Malformed("unmatched closing tag".to_string()))
    }

    /// Text outside the root may only be whitespace and is dropped.
    fn text(&mut self, text: &str) -> Result<(), SvgError> {
        let Some(&parent) = self.stack.last() else {
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(SvgError::Malformed(
                "text content outside the root element".to_string(),
            ));
        };

        // Entity references split text into several events; merge them back
        if let Some(&last) = self.nodes[parent.0].children.last()
            && let NodeKind::Text(existing) = &mut self.nodes[last.0].kind
        {
            existing.push_str(text);
            return Ok(());
        }
        self.alloc(NodeKind::Text(text.to_string()), Some(parent));
        Ok(())
    }

    /// Comments, CDATA and PIs outside the root are dropped.
    fn leaf(&mut self, kind: NodeKind) {
        if let Some(&parent) = self.stack.last() {
            self.alloc(kind, Some(parent));
        }
    }

    fn finish(self) -> Result<Document, SvgError> {
        if let Some(&open) = self.stack.last()
            && let NodeKind::Element(el) = &self.nodes[open.0].kind
        {
            return Err(SvgError::Malformed(format!("unclosed element <{}>", el.name)));
        }
        let root = self
            .root
            .ok_or_else(|| SvgError::Malformed("no root element".to_string()))?;
        Ok(Document {
            nodes: self.nodes,
            root,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize_round_trip() {
        let raw = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><g id="a"><path d="M0 0h10"/></g></svg>"#;
        let doc = Document::parse(raw).unwrap();
        assert_eq!(doc.serialize(), raw);
    }

    #[test]
    fn test_declaration_and_doctype_dropped() {
        let raw = "<?xml version=\"1.0\"?>\n<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n<!-- outside --><svg><rect/></svg>\n";
        let doc = Document::parse(raw).unwrap();
        assert_eq!(doc.serialize(), "<svg><rect/></svg>");
    }

    #[test]
    fn test_entities_decoded_and_reescaped() {
        let raw = r#"<svg><text x="a&amp;b">1 &lt; 2 &#x26; 3 &copy;</text></svg>"#;
        let doc = Document::parse(raw).unwrap();
        let text = doc.elements()[1];
        assert_eq!(doc.element(text).unwrap().get_attr("x"), Some("a&b"));
        assert_eq!(doc.text_content(text), "1 < 2 & 3 ");
        assert_eq!(
            doc.serialize(),
            r#"<svg><text x="a&amp;b">1 &lt; 2 &amp; 3 &copy;</text></svg>"#
        );
    }

    #[test]
    fn test_unknown_entity_kept_in_text() {
        let doc = Document::parse("<svg><text>x &copy; y</text></svg>").unwrap();
        assert_eq!(doc.serialize(), "<svg><text>x &copy; y</text></svg>");
    }

    #[test]
    fn test_attribute_references() {
        let doc = Document::parse(r#"<svg aria-label="a &#169; b &lt;c&gt;"/>"#).unwrap();
        assert_eq!(doc.root_element().get_attr("aria-label"), Some("a © b <c>"));

        // Undefined entities cannot survive decoding in attribute values
        for raw in [
            r#"<svg aria-label="a &copy; b"><text>x &copy; y</text></svg>"#,
            r#"<svg aria-label="fish & chips"/>"#,
        ] {
            assert!(
                matches!(Document::parse(raw), Err(SvgError::Malformed(_))),
                "expected malformed: {raw:?}"
            );
        }
    }

    #[test]
    fn test_invalid_character_references() {
        for raw in [
            "<svg><text>&#0;</text></svg>",
            "<svg><text>&#x1B;</text></svg>",
            "<svg><text>&#xD800;</text></svg>",
            r#"<svg a="&#x1;"/>"#,
        ] {
            assert!(
                matches!(Document::parse(raw), Err(SvgError::Malformed(_))),
                "expected malformed: {raw:?}"
            );
        }
        let doc = Document::parse("<svg><text>a&#9;b&#x1F600;</text></svg>").unwrap();
        assert_eq!(doc.serialize(), "<svg><text>a\tb😀</text></svg>");
    }

    #[test]
    fn test_cdata_comments_preserved() {
        let raw = "<svg><style><![CDATA[.a > .b { fill: red }]]></style><!-- note --></svg>";
        let doc = Document::parse(raw).unwrap();
        assert_eq!(doc.serialize(), raw);
    }

    #[test]
    fn test_elements_pre_order() {
        let doc = Document::parse("<svg><g><a/><b/></g><c/></svg>").unwrap();
        let names: Vec<_> = doc
            .elements()
            .into_iter()
            .map(|id| doc.element(id).unwrap().name.clone())
            .collect();
        assert_eq!(names, ["svg", "g", "a", "b", "c"]);
    }

    #[test]
    fn test_malformed_inputs() {
        for raw in [
            "",
            "just text",
            "<svg><g></svg>",
            "<svg>",
            "<svg></svg><svg></svg>",
            "<svg a=\"1\" a=\"2\"/>",
            "<svg/>trailing",
        ] {
            assert!(
                matches!(Document::parse(raw), Err(SvgError::Malformed(_))),
                "expected malformed: {raw:?}"
            );
        }
    }

    #[test]
    fn test_prepend_and_set_text() {
        let mut doc = Document::parse("<svg><path/></svg>").unwrap();
        let root = doc.root();
        let title = doc.create_element("title");
        doc.prepend_child(root, title);
        doc.set_text(title, "A & B");
        assert_eq!(doc.serialize(), "<svg><title>A &amp; B</title><path/></svg>");

        doc.set_text(title, "C");
        assert_eq!(doc.serialize(), "<svg><title>C</title><path/></svg>");
    }

    #[test]
    fn test_set_text_reuses_text_node() {
        let mut doc = Document::parse("<svg><title>Old<!-- c --></title></svg>").unwrap();
        let title = doc.elements()[1];
        let before = doc.nodes.len();

        doc.set_text(title, "New");
        doc.set_text(title, "Newer");
        assert_eq!(doc.nodes.len(), before);
        assert_eq!(doc.children(title).len(), 1);
        assert_eq!(doc.serialize(), "<svg><title>Newer</title></svg>");
    }

    #[test]
    fn test_element_attrs() {
        let mut el = Element::new("svg:title");
        assert_eq!(el.local_name(), "title");
        el.set_attr("a", "1");
        el.set_attr("b", "2");
        el.set_attr("a", "3");
        assert_eq!(
            el.attrs,
            vec![
                ("a".to_string(), "3".to_string()),
                ("b".to_string(), "2".to_string())
            ]
        );
        assert_eq!(el.remove_attr("a"), Some("3".to_string()));
        assert_eq!(el.remove_attr("a"), None);
    }
}
