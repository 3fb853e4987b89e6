//! Watcher Implementation
//!
//! A Watcher is a subscriber bound to one expression path on a view-model.
//!
//! # How Watchers Work
//!
//! 1. On construction the watcher evaluates its expression with itself as
//!    the evaluation context. Every property read along the path registers
//!    the watcher with that property's registry. The result is cached; the
//!    callback is not called.
//!
//! 2. When a registry notifies the watcher, it re-evaluates the expression
//!    (registration is idempotent) and compares the fresh value with the
//!    cached one under the view-model's [`ChangeDetection`] policy.
//!
//! 3. Only if the value changed is the cache replaced and the callback
//!    invoked, once, with `(view_model, new, old)`.
//!
//! Two watchers on the same expression are independent subscribers.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::context::EvalContext;
use super::path::Path;
use super::subscriber::{Subscriber, SubscriberId};
use crate::config::ChangeDetection;
use crate::error::Result;
use crate::value::Value;
use crate::viewmodel::ViewModel;

/// Change callback: `(view_model, new_value, old_value)`.
pub type Callback = Box<dyn Fn(&ViewModel, &Value, &Value) -> Result<()> + Send + Sync>;

pub struct Watcher {
    id: SubscriberId,
    vm: ViewModel,
    path: Path,
    callback: Callback,
    value: Mutex<Value>,
    policy: ChangeDetection,
    this: Weak<Watcher>,
}

impl Watcher {
    /// Create a watcher and capture its initial dependencies.
    pub fn new<F>(vm: &ViewModel, expression: &str, callback: F) -> Result<Arc<Self>>
    where
        F: Fn(&ViewModel, &Value, &Value) -> Result<()> + Send + Sync + 'static,
    {
        let path = Path::parse(expression)?;
        Ok(Self::with_path(vm, path, Box::new(callback)))
    }

    pub(crate) fn with_path(vm: &ViewModel, path: Path, callback: Callback) -> Arc<Self> {
        let watcher = Arc::new_cyclic(|this| Self {
            id: SubscriberId::new(),
            vm: vm.clone(),
            path,
            callback,
            value: Mutex::new(Value::Undefined),
            policy: vm.options().change_detection,
            this: this.clone(),
        });

        let initial = watcher.get();
        *watcher.value.lock() = initial;
        watcher
    }

    /// Evaluate the expression, registering this watcher along the way.
    fn get(&self) -> Value {
        let this: Weak<dyn Subscriber> = self.this.clone();
        let cx = EvalContext::from_weak(self.id, this);
        self.vm.data().get_path(&self.path, &cx)
    }

    /// Re-evaluate and call back if the value changed.
    pub fn run(&self) -> Result<()> {
        let new = self.get();
        let old = {
            let mut cached = self.value.lock();
            if self.policy.same(&new, &cached) {
                return Ok(());
            }
            std::mem::replace(&mut *cached, new.clone())
        };

        tracing::trace!(
            watcher = self.id.raw(),
            expression = %self.path,
            old = %old,
            new = %new,
            "watcher value changed"
        );
        (self.callback)(&self.vm, &new, &old)
    }

    /// The last value observed by this watcher.
    pub fn value(&self) -> Value {
        self.value.lock().clone()
    }

    pub fn expression(&self) -> &Path {
        &self.path
    }

    pub fn view_model(&self) -> &ViewModel {
        &self.vm
    }
}

impl Subscriber for Watcher {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn update(&self) -> Result<()> {
        self.run()
    }
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("id", &self.id)
            .field("expression", &self.path)
            .field("value", &self.value())
            .finish()
    }
}
