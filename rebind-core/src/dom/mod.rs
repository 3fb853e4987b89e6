//! Render Target
//!
//! The compiler never touches a concrete document. It talks to the render
//! target through two traits:
//!
//! - [`RenderTarget`]: query a node by selector, create a detached fragment.
//! - [`RenderNode`]: the per-node primitives the binders need (children,
//!   attributes, the text slot, the input-value slot and listener
//!   registration).
//!
//! An in-memory implementation ([`Document`], [`Node`]) ships with the crate.
//! It parses a small HTML-like markup, supports `#id`, `.class` and tag
//! selectors, and can dispatch events, so bindings can be driven end to end
//! without a browser.

mod node;
mod parse;
mod selector;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::error::Result;

pub use node::{Document, Node};
pub use selector::Selector;

/// What a node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Fragment,
    Element,
    Text,
}

/// Errors raised by the in-memory render target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("`{operation}` requires an element node")]
    NotAnElement { operation: &'static str },

    #[error("`{operation}` requires a text node")]
    NotAText { operation: &'static str },

    #[error("node cannot be inserted here: {reason}")]
    HierarchyRequest { reason: &'static str },

    #[error("markup parse error at byte {offset}: {message}")]
    Parse { offset: usize, message: String },

    #[error("invalid selector `{0}`")]
    InvalidSelector(String),
}

/// An event delivered to listeners.
///
/// `value` carries the target's result value, e.g. the text of an input
/// after the user typed into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    kind: String,
    value: Option<String>,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: None,
        }
    }

    pub fn with_value(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: Some(value.into()),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// A listener registered on a node.
pub type Listener = Arc<dyn Fn(&Event) -> Result<()> + Send + Sync>;

/// Box a closure as a [`Listener`].
pub fn listener<F>(f: F) -> Listener
where
    F: Fn(&Event) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Per-node primitives required by the compiler.
pub trait RenderNode: Clone + fmt::Debug + Send + Sync + 'static {
    fn kind(&self) -> NodeKind;

    /// Snapshot of the direct children.
    fn child_nodes(&self) -> Vec<Self>;

    fn first_child(&self) -> Option<Self>;

    fn has_child_nodes(&self) -> bool {
        self.first_child().is_some()
    }

    /// Move `child` under this node, detaching it from its current parent.
    /// Appending a fragment moves the fragment's children instead.
    fn append_child(&self, child: &Self) -> Result<(), DomError>;

    /// Attribute `(name, value)` pairs in document order.
    fn attributes(&self) -> Vec<(String, String)>;

    fn get_attribute(&self, name: &str) -> Option<String> {
        self.attributes()
            .into_iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value)
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), DomError>;

    fn remove_attribute(&self, name: &str);

    fn text_content(&self) -> String;

    fn set_text_content(&self, text: &str) -> Result<(), DomError>;

    /// The input-value slot.
    fn value(&self) -> String;

    fn set_value(&self, value: &str) -> Result<(), DomError>;

    fn add_event_listener(&self, event: &str, listener: Listener) -> Result<(), DomError>;
}

/// Document-level primitives required by the compiler.
pub trait RenderTarget {
    type Node: RenderNode;

    /// First node in document order matching `selector`.
    fn query_selector(&self, selector: &str) -> Option<Self::Node>;

    /// A new, detached fragment node.
    fn create_fragment(&self) -> Self::Node;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_expose_their_value() {
        let click = Event::new("click");
        assert_eq!(click.kind(), "click");
        assert_eq!(click.value(), None);

        let input = Event::with_value("input", "Ada");
        assert_eq!(input.value(), Some("Ada"));
    }
}
