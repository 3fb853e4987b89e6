//! Subscriber types for the reactive system.
//!
//! A Subscriber is anything a dependency registry can notify: in practice a
//! [`Watcher`](super::Watcher), though tests and benches plug in their own.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;

/// Unique identifier for a subscriber.
///
/// Registries de-duplicate subscribers by this ID, so two distinct watchers
/// bound to the same expression stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// A party interested in changes to one or more reactive properties.
pub trait Subscriber: Send + Sync {
    /// Identity used for de-duplication inside a registry.
    fn id(&self) -> SubscriberId;

    /// Called synchronously when a property this subscriber read has changed.
    fn update(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriber_ids_are_unique() {
        let id1 = SubscriberId::new();
        let id2 = SubscriberId::new();
        let id3 = SubscriberId::new();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn subscriber_ids_increase() {
        let first = SubscriberId::new();
        let second = SubscriberId::new();
        assert!(second.raw() > first.raw());
    }
}
