//! A small, namespace-aware XML element tree.
//!
//! Package descriptors and container pointers are parsed into this tree, mutated,
//! and written back. Text and attribute values are kept in their raw (escaped) form
//! so untouched content round-trips with its entity references intact. Element
//! lookups are namespace-tolerant: an element matches a namespaced query either when
//! it resolves to that namespace or when it carries no namespace at all.

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};

/// XML declaration emitted at the top of every serialized document.
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String), // raw, escaped
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

/// An XML element with its resolved namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Qualified name as written, e.g. `dc:language`.
    pub name: String,
    /// Namespace URI the name resolves to, if any.
    pub namespace: Option<String>,
    /// Attributes in document order; values are raw (escaped).
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
    self_closing: bool,
}

impl Element {
    /// Creates an empty element. It serializes as `<name/>` until children are added.
    pub fn new(name: impl Into<String>, namespace: Option<&str>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.map(str::to_string),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: true,
        }
    }

    /// The namespace prefix of the qualified name, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// The local part of the qualified name.
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Namespace-tolerant match: same local name, and either in `namespace` or un-namespaced.
    pub fn matches(&self, namespace: &str, local: &str) -> bool {
        self.local_name() == local
            && match self.namespace.as_deref() {
                Some(ns) => ns == namespace,
                None => true,
            }
    }

    /// Iterates over child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Iterates mutably over child elements.
    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child matching `namespace`/`local`, preferring a namespaced match over a bare one.
    pub fn find_child(&self, namespace: &str, local: &str) -> Option<&Element> {
        self.child_elements()
            .find(|e| e.local_name() == local && e.namespace.as_deref() == Some(namespace))
            .or_else(|| self.child_elements().find(|e| e.matches(namespace, local)))
    }

    /// Mutable variant of [`Element::find_child`].
    pub fn find_child_mut(&mut self, namespace: &str, local: &str) -> Option<&mut Element> {
        let strict = self
            .child_elements()
            .position(|e| e.local_name() == local && e.namespace.as_deref() == Some(namespace));
        let index =
            strict.or_else(|| self.child_elements().position(|e| e.matches(namespace, local)))?;
        self.child_elements_mut().nth(index)
    }

    /// All descendants in document order, excluding `self`.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut found = Vec::new();
        for child in self.child_elements() {
            found.push(child);
            found.extend(child.descendants());
        }
        found
    }

    /// Raw (escaped) value of an attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute to an unescaped value, replacing it in place or appending it.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let escaped = escape(value).into_owned();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = escaped,
            None => self.attributes.push((name.to_string(), escaped)),
        }
    }

    /// Replaces all children with a single text node holding `text` (unescaped).
    pub fn set_text(&mut self, text: &str) {
        self.children = vec![Node::Text(escape(text).into_owned())];
        self.self_closing = false;
    }

    /// Concatenated raw text of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) | Node::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn push_child(&mut self, element: Element) {
        self.children.push(Node::Element(element));
        self.self_closing = false;
    }

    /// Removes child elements for which `predicate` returns true.
    pub fn remove_child_elements<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&Element) -> bool,
    {
        self.children.retain(|node| match node {
            Node::Element(e) => !predicate(e),
            _ => true,
        });
    }

    /// The prefix this element declares for `uri` via `xmlns:prefix`, if any.
    pub fn declared_prefix(&self, uri: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find_map(|(key, value)| key.strip_prefix("xmlns:").filter(|_| value == uri))
    }

    /// Whether this element declares a binding for `prefix`.
    pub fn declares_prefix(&self, prefix: &str) -> bool {
        self.attributes
            .iter()
            .any(|(key, _)| key.strip_prefix("xmlns:") == Some(prefix))
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            let quote = if value.contains('"') { '\'' } else { '"' };
            out.push(' ');
            out.push_str(key);
            out.push('=');
            out.push(quote);
            out.push_str(value);
            out.push(quote);
        }
        if self.children.is_empty() && self.self_closing {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(e) => e.write_to(out),
                Node::Text(t) => out.push_str(t),
                Node::CData(t) => {
                    out.push_str("<![CDATA[");
                    out.push_str(t);
                    out.push_str("]]>");
                }
                Node::Comment(t) => {
                    out.push_str("<!--");
                    out.push_str(t);
                    out.push_str("-->");
                }
                Node::ProcessingInstruction(t) => {
                    out.push_str("<?");
                    out.push_str(t);
                    out.push_str("?>");
                }
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

/// A parsed XML document. Only the root element is retained; the prolog is regenerated.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub root: Element,
}

impl XmlDocument {
    /// Parses `text` into an element tree, resolving namespace prefixes.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut reader = Reader::from_str(text);
        let mut scopes = NamespaceScopes::default();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let element = scopes.open(&e)?;
                    stack.push(element);
                }
                Event::Empty(e) => {
                    let element = scopes.open(&e)?;
                    scopes.close();
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let mut element = stack
                        .pop()
                        .ok_or_else(|| Error::MalformedXml("unexpected closing tag".to_string()))?;
                    scopes.close();
                    element.self_closing = false;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(e) => push_text(&mut stack, &lossy(&e)),
                Event::GeneralRef(e) => push_text(&mut stack, &format!("&{};", lossy(&e))),
                Event::CData(e) => push_node(&mut stack, Node::CData(lossy(&e))),
                Event::Comment(e) => push_node(&mut stack, Node::Comment(lossy(&e))),
                Event::PI(e) => push_node(&mut stack, Node::ProcessingInstruction(lossy(&e))),
                Event::Eof => break,
                // declaration and doctype; the prolog is regenerated on output
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::MalformedXml(format!(
                "element <{}> is never closed",
                open.name
            )));
        }
        let root = root.ok_or_else(|| Error::MalformedXml("document has no root element".to_string()))?;
        Ok(Self { root })
    }

    /// Serializes the document with a standard UTF-8 XML declaration.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::from(XML_DECLARATION);
        self.root.write_to(&mut out);
        out
    }
}

/// Stack of in-scope prefix bindings; `None` is the default namespace.
#[derive(Default)]
struct NamespaceScopes {
    frames: Vec<Vec<(Option<String>, String)>>,
}

impl NamespaceScopes {
    /// Pushes the bindings declared by `start` and builds the element it opens.
    fn open(&mut self, start: &BytesStart<'_>) -> Result<Element> {
        let name = lossy(start.name().as_ref());
        let mut attributes = Vec::new();
        let mut frame = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = lossy(attr.key.as_ref());
            let value = lossy(&attr.value);
            if key == "xmlns" {
                frame.push((None, value.clone()));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                frame.push((Some(prefix.to_string()), value.clone()));
            }
            attributes.push((key, value));
        }
        self.frames.push(frame);

        let prefix = name.split_once(':').map(|(p, _)| p);
        let namespace = self.resolve(prefix).filter(|uri| !uri.is_empty());
        Ok(Element {
            namespace: namespace.map(str::to_string),
            name,
            attributes,
            children: Vec::new(),
            self_closing: true,
        })
    }

    fn close(&mut self) {
        self.frames.pop();
    }

    fn resolve(&self, prefix: Option<&str>) -> Option<&str> {
        self.frames.iter().rev().flatten().find_map(|(bound, uri)| {
            (bound.as_deref() == prefix).then_some(uri.as_str())
        })
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(Error::MalformedXml(
            "document has more than one root element".to_string(),
        )),
    }
}

/// Appends text to the open element, merging with a preceding text node. Text outside
/// the root element is dropped.
fn push_text(stack: &mut [Element], text: &str) {
    if let Some(parent) = stack.last_mut() {
        if let Some(Node::Text(existing)) = parent.children.last_mut() {
            existing.push_str(text);
        } else {
            parent.children.push(Node::Text(text.to_string()));
        }
    }
}

fn push_node(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Local part of a possibly prefixed name (`dc:title` -> `title`).
pub fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, local)| local).unwrap_or(name)
}
