//! Directive binders.
//!
//! Each binder wires one directive (or one interpolation) to the
//! view-model. Data-to-view bindings create a watcher and render its
//! initial value immediately; view-to-data bindings attach listeners.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{Compiler, DiagnosticKind};
use crate::dom::{listener, Event, RenderNode, RenderTarget};
use crate::error::{Error, Result};
use crate::reactive::{Path, Watcher};
use crate::value::Value;
use crate::viewmodel::ViewModel;

impl<D: RenderTarget> Compiler<'_, D> {
    /// `on:<event>="method"` / `@<event>="method"`
    pub(super) fn compile_on(
        &mut self,
        node: &D::Node,
        directive: &str,
        event: &str,
        method_name: &str,
    ) -> Result<()> {
        let Some(method) = self.vm.method(method_name) else {
            if self.vm.options().strict_directives {
                return Err(Error::UnknownMethod {
                    name: method_name.to_owned(),
                    directive: directive.to_owned(),
                });
            }
            let message = format!("no method `{method_name}`; no listener attached");
            self.report(DiagnosticKind::MissingMethod, Some(directive), message);
            return Ok(());
        };

        let vm = self.vm.clone();
        node.add_event_listener(event, listener(move |event: &Event| method(&vm, event)))?;
        Ok(())
    }

    /// `bind:<attr>="path"` / `:<attr>="path"`
    pub(super) fn compile_bind(
        &mut self,
        node: &D::Node,
        directive: &str,
        attr: &str,
        expression: &str,
    ) -> Result<()> {
        let Some(path) = self.resolve(directive, expression)? else {
            return Ok(());
        };

        let target = node.clone();
        let name = attr.to_owned();
        let watcher = self.watch(path, move |_, new, _| {
            target.set_attribute(&name, &new.to_text())?;
            Ok(())
        });

        node.set_attribute(attr, &watcher.value().to_text())?;
        Ok(())
    }

    /// `model="path"`
    ///
    /// Data changes are written to the input-value slot. `input` events
    /// write the event value back to the path unless it equals the last
    /// value recorded on either side, which keeps the round trip from
    /// looping.
    pub(super) fn compile_model(
        &mut self,
        node: &D::Node,
        directive: &str,
        expression: &str,
    ) -> Result<()> {
        let Some(path) = self.resolve(directive, expression)? else {
            return Ok(());
        };

        let last = Arc::new(Mutex::new(Value::Undefined));

        let target = node.clone();
        let recorded = last.clone();
        let watcher = self.watch(path.clone(), move |_, new, _| {
            *recorded.lock() = new.clone();
            target.set_value(&new.to_text())?;
            Ok(())
        });

        let initial = watcher.value();
        node.set_value(&initial.to_text())?;
        *last.lock() = initial;

        let vm = self.vm.clone();
        let policy = vm.options().change_detection;
        node.add_event_listener(
            "input",
            listener(move |event: &Event| {
                let Some(text) = event.value() else {
                    return Ok(());
                };
                let incoming = Value::from(text);
                {
                    let mut last = last.lock();
                    if policy.same(&incoming, &last) {
                        return Ok(());
                    }
                    *last = incoming.clone();
                }
                vm.data().set_path(&path, incoming)
            }),
        )?;
        Ok(())
    }

    /// `{{ path }}` inside a text node. The whole node text is replaced.
    pub(super) fn compile_text(&mut self, node: &D::Node, expression: &str) -> Result<()> {
        let source = format!("{{{{ {expression} }}}}");
        let Some(path) = self.resolve(&source, expression)? else {
            return Ok(());
        };

        let target = node.clone();
        let watcher = self.watch(path, move |_, new, _| {
            target.set_text_content(&new.to_text())?;
            Ok(())
        });

        node.set_text_content(&watcher.value().to_text())?;
        Ok(())
    }

    /// Parse an expression and check it against the current data.
    ///
    /// `Ok(None)` means the directive is skipped. A missing path is only
    /// reported; the binding is still created.
    fn resolve(&mut self, source: &str, expression: &str) -> Result<Option<Path>> {
        let strict = self.vm.options().strict_directives;

        let path = match Path::parse(expression) {
            Ok(path) => path,
            Err(err) if strict => return Err(err),
            Err(err) => {
                self.report(DiagnosticKind::InvalidExpression, Some(source), err.to_string());
                return Ok(None);
            }
        };

        if !self.vm.data().has_path(&path) {
            if strict {
                return Err(Error::UnknownPath {
                    path: path.to_string(),
                    directive: source.to_owned(),
                });
            }
            let message = format!("no data at `{path}`; rendering as empty");
            self.report(DiagnosticKind::MissingPath, Some(source), message);
        }

        Ok(Some(path))
    }

    fn watch<F>(&mut self, path: Path, callback: F) -> Arc<Watcher>
    where
        F: Fn(&ViewModel, &Value, &Value) -> Result<()> + Send + Sync + 'static,
    {
        let watcher = Watcher::with_path(&self.vm, path, Box::new(callback));
        self.watchers.push(watcher.clone());
        watcher
    }
}
