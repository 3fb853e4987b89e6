//! View-model: the surface the compiler binds markup against.
//!
//! A view-model bundles the reactive `data` store, a table of named
//! `methods` that event directives call, and the engine [`Options`]. Methods
//! receive the view-model as their receiver together with the triggering
//! event.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::Options;
use crate::dom::Event;
use crate::error::{Error, Result};
use crate::reactive::{EvalContext, Path, Store};
use crate::value::Value;

/// A method callable from an event directive.
pub type Method = Arc<dyn Fn(&ViewModel, &Event) -> Result<()> + Send + Sync>;

/// Cheap-to-clone handle to a view-model.
#[derive(Clone)]
pub struct ViewModel {
    inner: Arc<Inner>,
}

struct Inner {
    data: Store,
    methods: IndexMap<String, Method>,
    options: Options,
}

impl ViewModel {
    /// A view-model with no methods and default options.
    pub fn new(data: Store) -> Self {
        Self::builder(data).build()
    }

    pub fn builder(data: Store) -> ViewModelBuilder {
        ViewModelBuilder {
            data,
            methods: IndexMap::new(),
            options: Options::default(),
        }
    }

    pub fn data(&self) -> &Store {
        &self.inner.data
    }

    pub fn options(&self) -> &Options {
        &self.inner.options
    }

    pub fn method(&self, name: &str) -> Option<Method> {
        self.inner.methods.get(name).cloned()
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.inner.methods.contains_key(name)
    }

    /// Method names in registration order.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.inner.methods.keys().map(String::as_str)
    }

    /// Untracked read of a key or dotted path.
    pub fn get(&self, path: &str) -> Result<Value> {
        let path = Path::parse(path)?;
        Ok(self.inner.data.get_path(&path, &EvalContext::untracked()))
    }

    /// Write a key or dotted path, notifying dependents synchronously.
    pub fn set(&self, path: &str, value: impl Into<Value>) -> Result<()> {
        let path = Path::parse(path)?;
        self.inner.data.set_path(&path, value)
    }

    /// Invoke a method with this view-model as receiver.
    pub fn call(&self, name: &str, event: &Event) -> Result<()> {
        let method = self.method(name).ok_or_else(|| Error::UnknownMethod {
            name: name.to_owned(),
            directive: "call".to_owned(),
        })?;
        method(self, event)
    }

    pub fn ptr_eq(&self, other: &ViewModel) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModel")
            .field("data", &self.inner.data)
            .field("methods", &self.inner.methods.keys().collect::<Vec<_>>())
            .field("options", &self.inner.options)
            .finish()
    }
}

pub struct ViewModelBuilder {
    data: Store,
    methods: IndexMap<String, Method>,
    options: Options,
}

impl ViewModelBuilder {
    /// Register a method. A later registration under the same name wins.
    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&ViewModel, &Event) -> Result<()> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> ViewModel {
        ViewModel {
            inner: Arc::new(Inner {
                data: self.data,
                methods: self.methods,
                options: self.options,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::make_reactive;
    use serde_json::json;

    fn vm() -> ViewModel {
        let data = make_reactive(json!({ "count": 1, "user": { "name": "Ada" } })).unwrap();
        ViewModel::builder(data)
            .method("increment", |vm: &ViewModel, _: &Event| {
                let count = vm.get("count")?.as_f64().unwrap_or(0.0);
                vm.set("count", count + 1.0)
            })
            .build()
    }

    #[test]
    fn reads_and_writes_dotted_paths() {
        let vm = vm();
        assert_eq!(vm.get("user.name").unwrap(), Value::from("Ada"));
        vm.set("user.name", "Grace").unwrap();
        assert_eq!(vm.get("user.name").unwrap(), Value::from("Grace"));
    }

    #[test]
    fn methods_receive_the_view_model() {
        let vm = vm();
        vm.call("increment", &Event::new("click")).unwrap();
        vm.call("increment", &Event::new("click")).unwrap();
        assert_eq!(vm.get("count").unwrap(), Value::from(3));
    }

    #[test]
    fn unknown_method_is_an_error() {
        let vm = vm();
        assert!(!vm.has_method("missing"));
        assert!(matches!(
            vm.call("missing", &Event::new("click")),
            Err(Error::UnknownMethod { .. })
        ));
    }

    #[test]
    fn invalid_paths_are_rejected() {
        let vm = vm();
        assert!(matches!(vm.get("a..b"), Err(Error::InvalidPath(_))));
    }
}
