//! Template Compiler
//!
//! The compiler walks a markup fragment once and turns directives and
//! interpolation markers into live bindings.
//!
//! # How Compilation Works
//!
//! 1. [`Compiler::init`] resolves the root selector. If nothing matches, a
//!    [`DiagnosticKind::RootNotFound`] diagnostic is recorded and compilation
//!    stops without an error.
//!
//! 2. The root's children are moved into a detached fragment so binding
//!    setup does not mutate the live tree node by node.
//!
//! 3. Every direct child of the fragment is visited:
//!    - element nodes have their directive attributes dispatched to the
//!      event, bind or model binder, and each directive attribute is removed;
//!    - text nodes containing `{{ expression }}` get a text binding.
//!
//!    Any node with children is then visited recursively, whether or not it
//!    carried directives.
//!
//! 4. The fragment is appended back to the root.
//!
//! Each node is visited exactly once. Nodes added to the tree later are
//! never compiled.
//!
//! # Ownership
//!
//! The compiler owns the watchers it creates. Registries only hold them
//! weakly, so dropping the compiler stops all data-to-view updates. Input
//! and event listeners stay attached to their nodes.

mod binders;
mod diagnostic;
mod directive;
mod interpolation;

use std::sync::Arc;

use crate::dom::{NodeKind, RenderNode, RenderTarget};
use crate::error::Result;
use crate::reactive::Watcher;
use crate::viewmodel::ViewModel;

pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use directive::Directive;
pub use interpolation::first_expression;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Pending,
    Compiled,
    /// The root selector did not resolve.
    Aborted,
}

pub struct Compiler<'d, D: RenderTarget> {
    document: &'d D,
    selector: String,
    vm: ViewModel,
    root: Option<D::Node>,
    watchers: Vec<Arc<Watcher>>,
    diagnostics: Vec<Diagnostic>,
    state: State,
}

impl<'d, D: RenderTarget> Compiler<'d, D> {
    /// Create a compiler for the subtree under `selector`. Nothing happens
    /// until [`Compiler::init`] runs.
    pub fn new(document: &'d D, selector: impl Into<String>, vm: ViewModel) -> Self {
        Self {
            document,
            selector: selector.into(),
            vm,
            root: None,
            watchers: Vec::new(),
            diagnostics: Vec::new(),
            state: State::Pending,
        }
    }

    /// Create and initialize in one step.
    pub fn mount(document: &'d D, selector: impl Into<String>, vm: ViewModel) -> Result<Self> {
        let mut compiler = Self::new(document, selector, vm);
        compiler.init()?;
        Ok(compiler)
    }

    /// Resolve the root and compile its subtree. Runs at most once; later
    /// calls are no-ops.
    pub fn init(&mut self) -> Result<()> {
        if self.state != State::Pending {
            return Ok(());
        }

        let Some(root) = self.document.query_selector(&self.selector) else {
            self.state = State::Aborted;
            let message = format!("selector `{}` did not match any node", self.selector);
            self.report(DiagnosticKind::RootNotFound, None, message);
            return Ok(());
        };

        let fragment = self.document.create_fragment();
        while let Some(child) = root.first_child() {
            fragment.append_child(&child)?;
        }

        let compiled = self.compile_element(&fragment);
        // Reattach even if a strict-mode error stopped compilation midway.
        root.append_child(&fragment)?;

        self.root = Some(root);
        self.state = State::Compiled;
        tracing::debug!(
            selector = %self.selector,
            watchers = self.watchers.len(),
            diagnostics = self.diagnostics.len(),
            "compiled"
        );
        compiled
    }

    fn compile_element(&mut self, parent: &D::Node) -> Result<()> {
        for node in parent.child_nodes() {
            match node.kind() {
                NodeKind::Element => self.compile_attributes(&node)?,
                NodeKind::Text => {
                    let text = node.text_content();
                    if let Some(expression) = first_expression(&text) {
                        self.compile_text(&node, expression)?;
                    }
                }
                NodeKind::Document | NodeKind::Fragment => {}
            }

            if node.has_child_nodes() {
                self.compile_element(&node)?;
            }
        }
        Ok(())
    }

    fn compile_attributes(&mut self, node: &D::Node) -> Result<()> {
        let legacy = self.vm.options().legacy_prefixes;

        for (name, value) in node.attributes() {
            let Some(directive) = Directive::parse(&name, legacy) else {
                continue;
            };

            let result = match directive {
                Directive::Malformed => {
                    let message = format!("directive `{name}` is missing its argument");
                    self.report(DiagnosticKind::MalformedDirective, Some(&name), message);
                    Ok(())
                }
                _ if value.trim().is_empty() => {
                    let message = format!("directive `{name}` has no value");
                    self.report(DiagnosticKind::MalformedDirective, Some(&name), message);
                    Ok(())
                }
                Directive::On(event) => self.compile_on(node, &name, event, value.trim()),
                Directive::Bind(attr) => self.compile_bind(node, &name, attr, &value),
                Directive::Model => self.compile_model(node, &name, &value),
            };

            // Directives are not valid render-target attributes.
            node.remove_attribute(&name);
            result?;
        }
        Ok(())
    }

    fn report(&mut self, kind: DiagnosticKind, source: Option<&str>, message: String) {
        let diagnostic = Diagnostic::new(kind, source, message);
        tracing::warn!(kind = ?diagnostic.kind, source = ?diagnostic.source, "{}", diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Watchers created so far, in creation order.
    pub fn watchers(&self) -> &[Arc<Watcher>] {
        &self.watchers
    }

    /// The resolved root, once `init` has found it.
    pub fn root(&self) -> Option<&D::Node> {
        self.root.as_ref()
    }

    pub fn view_model(&self) -> &ViewModel {
        &self.vm
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn is_compiled(&self) -> bool {
        self.state == State::Compiled
    }
}

impl<D: RenderTarget> std::fmt::Debug for Compiler<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("selector", &self.selector)
            .field("state", &self.state)
            .field("watchers", &self.watchers.len())
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}
