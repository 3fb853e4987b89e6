//! In-memory document tree.

use std::fmt;
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::parse;
use super::selector::Selector;
use super::{DomError, Event, Listener, NodeKind, RenderNode, RenderTarget};
use crate::error::{Error, Result};

/// Elements that never have children.
pub(crate) const VOID_ELEMENTS: &[&str] = &["area", "br", "hr", "img", "input", "link", "meta"];

/// Handle to a node. Cloning yields another handle to the same node.
#[derive(Clone)]
pub struct Node {
    inner: Arc<NodeInner>,
}

struct NodeInner {
    kind: NodeKind,
    tag: String,
    state: RwLock<NodeState>,
    listeners: RwLock<Vec<(String, Listener)>>,
}

#[derive(Default)]
struct NodeState {
    parent: Option<Weak<NodeInner>>,
    children: Vec<Node>,
    attributes: IndexMap<String, String>,
    text: String,
    value: String,
}

impl Node {
    fn with_kind(kind: NodeKind, tag: &str) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                kind,
                tag: tag.to_ascii_lowercase(),
                state: RwLock::new(NodeState::default()),
                listeners: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn element(tag: &str) -> Self {
        Self::with_kind(NodeKind::Element, tag)
    }

    pub fn text(text: &str) -> Self {
        let node = Self::with_kind(NodeKind::Text, "#text");
        node.inner.state.write().text = text.to_owned();
        node
    }

    pub fn fragment() -> Self {
        Self::with_kind(NodeKind::Fragment, "#fragment")
    }

    /// Lower-cased tag name; `#text`, `#fragment` or `#document` otherwise.
    pub fn tag(&self) -> &str {
        &self.inner.tag
    }

    pub fn parent(&self) -> Option<Node> {
        self.inner
            .state
            .read()
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Node { inner })
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn is_void(&self) -> bool {
        self.inner.kind == NodeKind::Element && VOID_ELEMENTS.contains(&self.tag())
    }

    fn is_ancestor_of(&self, other: &Node) -> bool {
        let mut current = other.parent();
        while let Some(node) = current {
            if node.ptr_eq(self) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    fn detach(&self) {
        let parent = self.inner.state.write().parent.take();
        if let Some(parent) = parent.and_then(|weak| weak.upgrade()) {
            parent.state.write().children.retain(|child| !child.ptr_eq(self));
        }
    }

    fn adopt(&self, child: &Node) {
        child.detach();
        child.inner.state.write().parent = Some(Arc::downgrade(&self.inner));
        self.inner.state.write().children.push(child.clone());
    }

    /// Deliver `event` to every listener registered for its kind, in
    /// registration order. All listeners run; the first failure is returned.
    pub fn dispatch_event(&self, event: &Event) -> Result<()> {
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .read()
            .iter()
            .filter(|(kind, _)| kind == event.kind())
            .map(|(_, listener)| listener.clone())
            .collect();

        let mut first: Option<Error> = None;
        for listener in listeners {
            if let Err(err) = listener(event) {
                tracing::error!(event = event.kind(), error = %err, "listener failed");
                first.get_or_insert(err);
            }
        }
        first.map_or(Ok(()), Err)
    }

    /// Simulate typing: set the value slot, then fire `input`.
    pub fn input(&self, value: &str) -> Result<()> {
        self.set_value(value)?;
        self.dispatch_event(&Event::with_value("input", value))
    }

    /// Fire a `click` event.
    pub fn click(&self) -> Result<()> {
        self.dispatch_event(&Event::new("click"))
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.inner
            .listeners
            .read()
            .iter()
            .filter(|(kind, _)| kind == event)
            .count()
    }

    /// Pre-order search of descendants, excluding `self`.
    pub fn query(&self, selector: &Selector) -> Option<Node> {
        for child in self.child_nodes() {
            let matched = child.inner.kind == NodeKind::Element && {
                let state = child.inner.state.read();
                selector.matches(child.tag(), |name: &str| {
                    state.attributes.get(name).map(String::as_str)
                })
            };
            if matched {
                return Some(child);
            }
            if let Some(found) = child.query(selector) {
                return Some(found);
            }
        }
        None
    }

    /// Serialize this node's children back to markup.
    pub fn inner_markup(&self) -> String {
        let mut out = String::new();
        for child in self.child_nodes() {
            child.write_markup(&mut out);
        }
        out
    }

    /// Serialize this node, including itself, to markup.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        match self.inner.kind {
            NodeKind::Text => out.push_str(&escape(&self.inner.state.read().text, false)),
            NodeKind::Document | NodeKind::Fragment => out.push_str(&self.inner_markup()),
            NodeKind::Element => {
                out.push('<');
                out.push_str(self.tag());
                for (name, value) in self.attributes() {
                    out.push(' ');
                    out.push_str(&name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        out.push_str(&escape(&value, true));
                        out.push('"');
                    }
                }
                out.push('>');
                if self.is_void() {
                    return;
                }
                out.push_str(&self.inner_markup());
                out.push_str("</");
                out.push_str(self.tag());
                out.push('>');
            }
        }
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

impl RenderNode for Node {
    fn kind(&self) -> NodeKind {
        self.inner.kind
    }

    fn child_nodes(&self) -> Vec<Self> {
        self.inner.state.read().children.clone()
    }

    fn first_child(&self) -> Option<Self> {
        self.inner.state.read().children.first().cloned()
    }

    fn append_child(&self, child: &Self) -> Result<(), DomError> {
        if matches!(self.inner.kind, NodeKind::Text) || self.is_void() {
            return Err(DomError::HierarchyRequest {
                reason: "parent cannot have children",
            });
        }
        match child.inner.kind {
            NodeKind::Document => Err(DomError::HierarchyRequest {
                reason: "a document cannot be a child",
            }),
            NodeKind::Fragment => {
                for grandchild in child.child_nodes() {
                    self.adopt(&grandchild);
                }
                Ok(())
            }
            _ if child.ptr_eq(self) || child.is_ancestor_of(self) => {
                Err(DomError::HierarchyRequest {
                    reason: "a node cannot contain its own ancestor",
                })
            }
            _ => {
                self.adopt(child);
                Ok(())
            }
        }
    }

    fn attributes(&self) -> Vec<(String, String)> {
        self.inner
            .state
            .read()
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    fn get_attribute(&self, name: &str) -> Option<String> {
        self.inner.state.read().attributes.get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), DomError> {
        if self.inner.kind != NodeKind::Element {
            return Err(DomError::NotAnElement {
                operation: "set_attribute",
            });
        }
        self.inner
            .state
            .write()
            .attributes
            .insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_attribute(&self, name: &str) {
        self.inner.state.write().attributes.shift_remove(name);
    }

    fn text_content(&self) -> String {
        match self.inner.kind {
            NodeKind::Text => self.inner.state.read().text.clone(),
            _ => self
                .child_nodes()
                .iter()
                .map(RenderNode::text_content)
                .collect(),
        }
    }

    fn set_text_content(&self, text: &str) -> Result<(), DomError> {
        match self.inner.kind {
            NodeKind::Text => {
                self.inner.state.write().text = text.to_owned();
                Ok(())
            }
            NodeKind::Element | NodeKind::Fragment if !self.is_void() => {
                for child in self.child_nodes() {
                    child.detach();
                }
                if !text.is_empty() {
                    self.adopt(&Node::text(text));
                }
                Ok(())
            }
            _ => Err(DomError::NotAText {
                operation: "set_text_content",
            }),
        }
    }

    fn value(&self) -> String {
        self.inner.state.read().value.clone()
    }

    fn set_value(&self, value: &str) -> Result<(), DomError> {
        if self.inner.kind != NodeKind::Element {
            return Err(DomError::NotAnElement {
                operation: "set_value",
            });
        }
        self.inner.state.write().value = value.to_owned();
        Ok(())
    }

    fn add_event_listener(&self, event: &str, listener: Listener) -> Result<(), DomError> {
        self.inner
            .listeners
            .write()
            .push((event.to_owned(), listener));
        Ok(())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.kind {
            NodeKind::Text => write!(f, "Text({:?})", self.inner.state.read().text),
            _ => f
                .debug_struct("Node")
                .field("tag", &self.tag())
                .field("attributes", &self.attributes())
                .field("children", &self.child_nodes().len())
                .finish(),
        }
    }
}

/// An in-memory document.
#[derive(Clone)]
pub struct Document {
    root: Node,
}

impl Document {
    pub fn new() -> Self {
        Self {
            root: Node::with_kind(NodeKind::Document, "#document"),
        }
    }

    /// Parse markup into a new document.
    pub fn parse(markup: &str) -> Result<Self, DomError> {
        let document = Self::new();
        for node in parse::parse_fragment(markup)? {
            document.root.append_child(&node)?;
        }
        Ok(document)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn create_element(&self, tag: &str) -> Node {
        Node::element(tag)
    }

    pub fn create_text_node(&self, text: &str) -> Node {
        Node::text(text)
    }

    pub fn to_markup(&self) -> String {
        self.root.inner_markup()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Document").field(&self.to_markup()).finish()
    }
}

impl RenderTarget for Document {
    type Node = Node;

    fn query_selector(&self, selector: &str) -> Option<Node> {
        match Selector::parse(selector) {
            Ok(selector) => self.root.query(&selector),
            Err(err) => {
                tracing::warn!(error = %err, "selector rejected");
                None
            }
        }
    }

    fn create_fragment(&self) -> Node {
        Node::fragment()
    }
}
