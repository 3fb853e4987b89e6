//! Evaluation Context
//!
//! The evaluation context names the subscriber whose expression is currently
//! being evaluated. Every tracked read takes the context as an argument, so
//! dependency capture follows the call stack instead of a shared mutable slot.
//!
//! # Invariants
//!
//! - A context carries at most one subscriber.
//! - A context exists only for the duration of one evaluation; nothing can
//!   leak into an unrelated evaluation because there is nothing global to
//!   forget to clear.

use std::sync::{Arc, Weak};

use super::subscriber::{Subscriber, SubscriberId};

/// Context passed down through an evaluation.
///
/// Reads performed with [`EvalContext::untracked`] never register anything.
#[derive(Clone, Default)]
pub struct EvalContext {
    subscriber: Option<Weak<dyn Subscriber>>,
    id: Option<SubscriberId>,
}

impl EvalContext {
    /// A context that registers `subscriber` with every registry it reads.
    pub fn tracked(subscriber: &Arc<dyn Subscriber>) -> Self {
        Self {
            id: Some(subscriber.id()),
            subscriber: Some(Arc::downgrade(subscriber)),
        }
    }

    /// Same as [`EvalContext::tracked`], from an already downgraded handle.
    pub fn from_weak(id: SubscriberId, subscriber: Weak<dyn Subscriber>) -> Self {
        Self {
            id: Some(id),
            subscriber: Some(subscriber),
        }
    }

    /// A context that tracks nothing.
    pub fn untracked() -> Self {
        Self::default()
    }

    /// Whether reads through this context capture dependencies.
    pub fn is_tracking(&self) -> bool {
        self.subscriber.is_some()
    }

    /// ID of the evaluating subscriber, if any.
    pub fn subscriber_id(&self) -> Option<SubscriberId> {
        self.id
    }

    pub(crate) fn subscriber(&self) -> Option<(SubscriberId, &Weak<dyn Subscriber>)> {
        self.id.zip(self.subscriber.as_ref())
    }
}

impl std::fmt::Debug for EvalContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvalContext")
            .field("subscriber", &self.id)
            .finish()
    }
}
