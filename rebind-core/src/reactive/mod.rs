//! Reactive Primitives
//!
//! This module implements the dependency-tracking layer: reactive stores,
//! per-property dependency registries, and watchers.
//!
//! # Concepts
//!
//! ## Stores
//!
//! A [`Store`] wraps a plain data object. Each key becomes a reactive
//! property with its own [`Dep`]. Nested objects are stores as well.
//!
//! ## Dependency registries
//!
//! A [`Dep`] is the set of subscribers interested in one property. Reads
//! add to it; writes notify it.
//!
//! ## Watchers
//!
//! A [`Watcher`] binds one expression to a callback. It re-evaluates when any
//! property it read changes and calls back only when the value changed.
//!
//! # Implementation Notes
//!
//! Dependency capture is explicit: the evaluating subscriber travels down the
//! call stack inside an [`EvalContext`]. A read with a tracked context
//! registers the subscriber; a read with [`EvalContext::untracked`] does not.
//! There is no global "current watcher" slot to set and clear.

mod context;
mod dep;
mod path;
mod store;
mod subscriber;
mod watcher;

pub use context::EvalContext;
pub use dep::Dep;
pub use path::Path;
pub use store::{make_reactive, Store};
pub use subscriber::{Subscriber, SubscriberId};
pub use watcher::{Callback, Watcher};
