//! Reactive Store
//!
//! A Store is a proxy over a plain data object: an ordered map from key to
//! a reactive property, where each property is a value plus its own
//! [`Dep`]. All access goes through typed `get`/`set` calls.
//!
//! # How Stores Work
//!
//! 1. [`make_reactive`] walks a JSON object depth-first: nested objects are
//!    turned into stores before the parent property that holds them.
//!
//! 2. A tracked read ([`Store::get`]) registers the context's subscriber
//!    with the property's registry, at most once per registry.
//!
//! 3. A write ([`Store::set`]) stores the value verbatim and synchronously
//!    notifies every registered subscriber before returning.
//!
//! Reads of missing keys yield [`Value::Undefined`] and capture nothing.
//! Writing a missing key creates a new reactive property.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::context::EvalContext;
use super::dep::Dep;
use super::path::Path;
use crate::error::{Error, Result};
use crate::value::Value;

/// Turn a JSON value into a reactive store.
///
/// Anything other than a JSON object is left alone and yields `None`.
pub fn make_reactive(data: serde_json::Value) -> Option<Store> {
    match data {
        serde_json::Value::Object(map) => Some(Store::from_map(map)),
        _ => None,
    }
}

struct Property {
    value: Value,
    dep: Arc<Dep>,
}

/// A reactive object. Cloning yields another handle to the same object.
#[derive(Clone, Default)]
pub struct Store {
    properties: Arc<RwLock<IndexMap<String, Property>>>,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a JSON object map.
    pub fn from_map(map: serde_json::Map<String, serde_json::Value>) -> Self {
        map.into_iter()
            .map(|(key, json)| (key, Value::from_json(json)))
            .collect()
    }

    /// Read a property, registering the context's subscriber if it has one.
    pub fn get(&self, key: &str, cx: &EvalContext) -> Value {
        let (value, dep) = {
            let properties = self.properties.read();
            match properties.get(key) {
                Some(property) => (property.value.clone(), property.dep.clone()),
                None => return Value::Undefined,
            }
        };

        if let Some((id, subscriber)) = cx.subscriber() {
            dep.add_weak(id, subscriber.clone());
        }

        value
    }

    /// Read a property without capturing a dependency.
    pub fn get_untracked(&self, key: &str) -> Value {
        self.properties
            .read()
            .get(key)
            .map(|property| property.value.clone())
            .unwrap_or_default()
    }

    /// Store a value and notify the property's subscribers.
    ///
    /// Every subscriber is notified even if some fail; the failures are
    /// reported together once the pass is complete.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        tracing::debug!(key, value = %value, "property set");

        let dep = {
            let mut properties = self.properties.write();
            match properties.get_mut(key) {
                Some(property) => {
                    property.value = value;
                    property.dep.clone()
                }
                None => {
                    let dep = Arc::new(Dep::new());
                    properties.insert(
                        key.to_owned(),
                        Property {
                            value,
                            dep: dep.clone(),
                        },
                    );
                    dep
                }
            }
        };

        let failures = dep.notify();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Notify {
                key: key.to_owned(),
                failures,
            })
        }
    }

    /// Resolve a dotted path, tracking every segment read.
    ///
    /// A segment that lands on a non-object yields `Undefined`.
    pub fn get_path(&self, path: &Path, cx: &EvalContext) -> Value {
        let (parents, last) = path.split_last();
        let mut current = self.clone();
        for segment in parents {
            match current.get(segment, cx) {
                Value::Object(next) => current = next,
                _ => return Value::Undefined,
            }
        }
        current.get(last, cx)
    }

    /// Write through a dotted path. Every parent segment must be an object.
    pub fn set_path(&self, path: &Path, value: impl Into<Value>) -> Result<()> {
        let (parents, last) = path.split_last();
        let mut current = self.clone();
        for segment in parents {
            match current.get_untracked(segment) {
                Value::Object(next) => current = next,
                _ => {
                    return Err(Error::PathNotFound {
                        path: path.to_string(),
                    })
                }
            }
        }
        current.set(last, value)
    }

    /// Whether every segment of `path` exists.
    pub fn has_path(&self, path: &Path) -> bool {
        let (parents, last) = path.split_last();
        let mut current = self.clone();
        for segment in parents {
            match current.get_untracked(segment) {
                Value::Object(next) => current = next,
                _ => return false,
            }
        }
        current.contains_key(last)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.read().contains_key(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.properties.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.properties.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.read().is_empty()
    }

    /// The registry backing `key`, if the property exists.
    pub fn dep(&self, key: &str) -> Option<Arc<Dep>> {
        self.properties.read().get(key).map(|p| p.dep.clone())
    }

    /// Number of live subscribers registered on `key`.
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.dep(key).map(|dep| dep.len()).unwrap_or(0)
    }

    /// Whether two handles point at the same object.
    pub fn ptr_eq(&self, other: &Store) -> bool {
        Arc::ptr_eq(&self.properties, &other.properties)
    }

    /// Untracked snapshot as plain JSON.
    pub fn to_json(&self) -> serde_json::Value {
        let properties = self.properties.read();
        let map = properties
            .iter()
            .map(|(key, property)| (key.clone(), property.value.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl<K, V> FromIterator<(K, V)> for Store
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let properties = iter
            .into_iter()
            .map(|(key, value)| {
                (
                    key.into(),
                    Property {
                        value: value.into(),
                        dep: Arc::new(Dep::new()),
                    },
                )
            })
            .collect();
        Self {
            properties: Arc::new(RwLock::new(properties)),
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let properties = self.properties.read();
        f.debug_map()
            .entries(properties.iter().map(|(key, property)| (key, &property.value)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{Subscriber, SubscriberId};
    use parking_lot::Mutex;
    use serde_json::json;

    struct Counter {
        id: SubscriberId,
        calls: Mutex<usize>,
    }

    impl Counter {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                id: SubscriberId::new(),
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> usize {
            *self.calls.lock()
        }
    }

    impl Subscriber for Counter {
        fn id(&self) -> SubscriberId {
            self.id
        }

        fn update(&self) -> Result<()> {
            *self.calls.lock() += 1;
            Ok(())
        }
    }

    fn tracked(counter: &Arc<Counter>) -> EvalContext {
        let sub: Arc<dyn Subscriber> = counter.clone();
        EvalContext::tracked(&sub)
    }

    #[test]
    fn non_objects_are_not_made_reactive() {
        assert!(make_reactive(json!(3)).is_none());
        assert!(make_reactive(json!("text")).is_none());
        assert!(make_reactive(json!(null)).is_none());
        assert!(make_reactive(json!([1, 2])).is_none());
    }

    #[test]
    fn keys_keep_insertion_order() {
        let store: Store = [("b", 1), ("a", 2)].into_iter().collect();
        assert_eq!(store.keys(), vec!["b", "a"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn tracked_read_registers_once() {
        let store = make_reactive(json!({ "name": "Ada" })).unwrap();
        let counter = Counter::new();
        let cx = tracked(&counter);

        assert_eq!(store.get("name", &cx), Value::from("Ada"));
        store.get("name", &cx);
        store.get("name", &cx);

        assert_eq!(store.subscriber_count("name"), 1);
    }

    #[test]
    fn untracked_read_registers_nothing() {
        let store = make_reactive(json!({ "name": "Ada" })).unwrap();
        store.get("name", &EvalContext::untracked());
        assert_eq!(store.get_untracked("name"), Value::from("Ada"));
        assert_eq!(store.subscriber_count("name"), 0);
    }

    #[test]
    fn write_notifies_only_readers_of_that_key() {
        let store = make_reactive(json!({ "a": 1, "b": 2 })).unwrap();
        let reads_a = Counter::new();
        let reads_b = Counter::new();
        store.get("a", &tracked(&reads_a));
        store.get("b", &tracked(&reads_b));

        store.set("a", 10).unwrap();

        assert_eq!(reads_a.calls(), 1);
        assert_eq!(reads_b.calls(), 0);
        assert_eq!(store.get_untracked("a"), Value::from(10));
    }

    #[test]
    fn every_write_notifies_synchronously() {
        let store = make_reactive(json!({ "n": 0 })).unwrap();
        let counter = Counter::new();
        store.get("n", &tracked(&counter));

        for i in 1..=3 {
            store.set("n", i).unwrap();
            assert_eq!(counter.calls(), i as usize);
        }
    }

    #[test]
    fn missing_key_reads_undefined_and_set_creates_it() {
        let store = Store::new();
        let counter = Counter::new();
        assert!(store.get("ghost", &tracked(&counter)).is_undefined());
        assert!(!store.contains_key("ghost"));

        store.set("ghost", "boo").unwrap();
        assert_eq!(store.get_untracked("ghost"), Value::from("boo"));
        assert_eq!(counter.calls(), 0);
    }

    #[test]
    fn nested_objects_are_reactive_and_tracked_per_segment() {
        let store = make_reactive(json!({ "user": { "name": "Ada" } })).unwrap();
        let counter = Counter::new();
        let path = Path::parse("user.name").unwrap();

        assert_eq!(store.get_path(&path, &tracked(&counter)), Value::from("Ada"));
        assert_eq!(store.subscriber_count("user"), 1);

        store.set_path(&path, "Grace").unwrap();
        assert_eq!(counter.calls(), 1);
        assert_eq!(store.get_path(&path, &EvalContext::untracked()), Value::from("Grace"));
    }

    #[test]
    fn set_path_through_primitive_fails() {
        let store = make_reactive(json!({ "user": "Ada" })).unwrap();
        let path = Path::parse("user.name").unwrap();
        assert!(matches!(store.set_path(&path, 1), Err(Error::PathNotFound { .. })));
        assert!(!store.has_path(&path));
        assert!(store.get_path(&path, &EvalContext::untracked()).is_undefined());
    }

    #[test]
    fn snapshot_round_trips() {
        let data = json!({ "name": "Ada", "user": { "age": 36 } });
        assert_eq!(make_reactive(data.clone()).unwrap().to_json(), data);
    }
}
