//! Dependency registry.
//!
//! Every reactive property owns exactly one [`Dep`]. It remembers, in
//! registration order, the subscribers that read the property and notifies
//! them when the property is written.
//!
//! Subscribers are held weakly: the compiler owns its watchers, and once a
//! watcher is dropped the registry prunes it on the next notification.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use smallvec::SmallVec;

use super::subscriber::{Subscriber, SubscriberId};
use crate::error::Error;

type Entry = (SubscriberId, Weak<dyn Subscriber>);

/// Per-property set of subscribers.
#[derive(Default)]
pub struct Dep {
    subscribers: Mutex<SmallVec<[Entry; 4]>>,
}

impl Dep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber unless it is already present.
    ///
    /// Returns `true` if the subscriber was inserted.
    pub fn add(&self, subscriber: &Arc<dyn Subscriber>) -> bool {
        self.add_weak(subscriber.id(), Arc::downgrade(subscriber))
    }

    pub(crate) fn add_weak(&self, id: SubscriberId, subscriber: Weak<dyn Subscriber>) -> bool {
        let mut subscribers = self.subscribers.lock();
        if subscribers.iter().any(|(existing, _)| *existing == id) {
            return false;
        }
        subscribers.push((id, subscriber));
        true
    }

    /// Call `update()` on every live subscriber, in registration order.
    ///
    /// The list is snapshotted first; subscribers added during the pass are
    /// not visited until the next notification. A failing subscriber does not
    /// stop the pass; failures are returned to the caller.
    pub fn notify(&self) -> Vec<Error> {
        let snapshot: SmallVec<[Entry; 4]> = {
            let mut subscribers = self.subscribers.lock();
            subscribers.retain(|(_, weak)| weak.strong_count() > 0);
            subscribers.clone()
        };

        let mut failures = Vec::new();
        for (id, weak) in snapshot {
            let Some(subscriber) = weak.upgrade() else {
                continue;
            };
            if let Err(err) = subscriber.update() {
                tracing::error!(subscriber = id.raw(), error = %err, "subscriber update failed");
                failures.push(err);
            }
        }
        failures
    }

    /// Number of live subscribers.
    pub fn len(&self) -> usize {
        self.subscribers
            .lock()
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.subscribers.lock().iter().any(|(existing, _)| *existing == id)
    }
}

impl std::fmt::Debug for Dep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dep")
            .field("subscriber_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Recorder {
        id: SubscriberId,
        log: Arc<Mutex<Vec<SubscriberId>>>,
        fail: bool,
    }

    impl Subscriber for Recorder {
        fn id(&self) -> SubscriberId {
            self.id
        }

        fn update(&self) -> Result<()> {
            self.log.lock().push(self.id);
            if self.fail {
                Err(Error::listener("test", "boom"))
            } else {
                Ok(())
            }
        }
    }

    fn recorder(log: &Arc<Mutex<Vec<SubscriberId>>>, fail: bool) -> Arc<dyn Subscriber> {
        Arc::new(Recorder {
            id: SubscriberId::new(),
            log: log.clone(),
            fail,
        })
    }

    #[test]
    fn add_deduplicates_by_identity() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sub = recorder(&log, false);
        let dep = Dep::new();

        assert!(dep.add(&sub));
        assert!(!dep.add(&sub));
        assert_eq!(dep.len(), 1);

        assert!(dep.notify().is_empty());
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn notify_runs_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = recorder(&log, false);
        let second = recorder(&log, false);
        let dep = Dep::new();

        dep.add(&second);
        dep.add(&first);
        dep.notify();

        assert_eq!(*log.lock(), vec![second.id(), first.id()]);
    }

    #[test]
    fn failing_subscriber_does_not_stop_siblings() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let failing = recorder(&log, true);
        let healthy = recorder(&log, false);
        let dep = Dep::new();

        dep.add(&failing);
        dep.add(&healthy);

        let failures = dep.notify();
        assert_eq!(failures.len(), 1);
        assert_eq!(*log.lock(), vec![failing.id(), healthy.id()]);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let kept = recorder(&log, false);
        let dropped = recorder(&log, false);
        let dep = Dep::new();

        dep.add(&kept);
        dep.add(&dropped);
        drop(dropped);

        assert_eq!(dep.len(), 1);
        dep.notify();
        assert_eq!(*log.lock(), vec![kept.id()]);
    }

    struct Reentrant {
        id: SubscriberId,
        dep: Arc<Dep>,
        late: Arc<dyn Subscriber>,
        calls: AtomicUsize,
    }

    impl Subscriber for Reentrant {
        fn id(&self) -> SubscriberId {
            self.id
        }

        fn update(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.dep.add(&self.late);
            Ok(())
        }
    }

    #[test]
    fn subscribers_added_mid_pass_wait_for_next_notify() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let late = recorder(&log, false);
        let dep = Arc::new(Dep::new());
        let reentrant: Arc<dyn Subscriber> = Arc::new(Reentrant {
            id: SubscriberId::new(),
            dep: dep.clone(),
            late: late.clone(),
            calls: AtomicUsize::new(0),
        });

        dep.add(&reentrant);
        dep.notify();
        assert!(log.lock().is_empty());

        dep.notify();
        assert_eq!(*log.lock(), vec![late.id()]);
    }
}
