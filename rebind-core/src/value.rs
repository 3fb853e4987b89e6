//! Dynamic values stored in reactive properties.
//!
//! A [`Value`] is what a reactive property holds. Objects are always reactive
//! ([`Store`] handles); arrays and primitives are stored verbatim.
//!
//! Two equality relations are provided because change detection can run in
//! either mode (see [`ChangeDetection`](crate::config::ChangeDetection)):
//!
//! - [`Value::strict_eq`]: type-sensitive structural equality. Objects compare
//!   by identity, `NaN` is never equal to anything.
//! - [`Value::loose_eq`]: coercing equality as performed by the reference
//!   binding engine, where `null == undefined` and numbers, strings and
//!   booleans compare after numeric conversion.

use std::fmt;

use crate::reactive::Store;

/// A dynamically typed value held by a reactive property.
#[derive(Clone, Default)]
pub enum Value {
    /// The value of a missing property.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Stored verbatim; array elements are not reactive.
    Array(Vec<Value>),
    /// A nested reactive object.
    Object(Store),
}

impl Value {
    /// Convert plain JSON into a value, making every object reactive.
    ///
    /// Nested objects are wrapped depth-first, so a child store exists before
    /// the parent property that holds it is installed.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Object(Store::from_map(map)),
        }
    }

    /// Snapshot this value back into plain JSON without tracking.
    ///
    /// `Undefined` and non-finite numbers become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER => {
                serde_json::Value::from(*n as i64)
            }
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(store) => store.to_json(),
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Store> {
        match self {
            Value::Object(store) => Some(store),
            _ => None,
        }
    }

    /// Render the value as text for a text node, attribute or input value.
    ///
    /// `Undefined` renders as the empty string.
    pub fn to_text(&self) -> String {
        match self {
            Value::Undefined => String::new(),
            Value::Null => "null".to_owned(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Undefined | Value::Null => String::new(),
                    other => other.to_text(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_owned(),
        }
    }

    /// Type-sensitive structural equality.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.strict_eq(y))
            }
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Coercing equality.
    pub fn loose_eq(&self, other: &Value) -> bool {
        use Value::*;

        match (self, other) {
            (Undefined | Null, Undefined | Null) => true,
            (Undefined | Null, _) | (_, Undefined | Null) => false,
            (Number(a), String(b)) => *a == text_to_number(b),
            (String(a), Number(b)) => text_to_number(a) == *b,
            (Bool(a), b) => Number(bool_to_number(*a)).loose_eq(b),
            (a, Bool(b)) => a.loose_eq(&Number(bool_to_number(*b))),
            (Object(a), Object(b)) => a.ptr_eq(b),
            // Arrays are copied on read, so identity degrades to contents.
            (Array(_), Array(_)) => self.strict_eq(other),
            (Array(_), Object(_)) | (Object(_), Array(_)) => false,
            (Array(_) | Object(_), primitive) => String(self.to_text()).loose_eq(primitive),
            (primitive, Array(_) | Object(_)) => primitive.loose_eq(&String(other.to_text())),
            _ => self.strict_eq(other),
        }
    }
}

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

fn bool_to_number(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn text_to_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_owned()
    } else if n == 0.0 {
        // Covers negative zero as well.
        "0".to_owned()
    } else {
        n.to_string()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_eq(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Array(items) => f.debug_list().entries(items).finish(),
            Value::Object(store) => fmt::Debug::fmt(store, f),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Store> for Value {
    fn from(store: Store) -> Self {
        Value::Object(store)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn undefined_renders_empty() {
        assert_eq!(Value::Undefined.to_text(), "");
        assert_eq!(Value::Null.to_text(), "null");
    }

    #[test]
    fn numbers_render_without_trailing_fraction() {
        assert_eq!(Value::from(3).to_text(), "3");
        assert_eq!(Value::from(2.5).to_text(), "2.5");
        assert_eq!(Value::from(-0.0).to_text(), "0");
        assert_eq!(Value::from(f64::NAN).to_text(), "NaN");
    }

    #[test]
    fn arrays_render_comma_joined() {
        let value = Value::from_json(json!([1, "a", null, true]));
        assert_eq!(value.to_text(), "1,a,,true");
    }

    #[test]
    fn json_objects_become_reactive() {
        let value = Value::from_json(json!({ "user": { "name": "Ada" } }));
        let store = value.as_object().expect("object");
        let user = store.get_untracked("user");
        let user = user.as_object().expect("nested object");
        assert_eq!(user.get_untracked("name"), Value::from("Ada"));
    }

    #[test]
    fn strict_equality_is_type_sensitive() {
        assert!(Value::from(0).strict_eq(&Value::from(0)));
        assert!(!Value::from(0).strict_eq(&Value::from("0")));
        assert!(!Value::Null.strict_eq(&Value::Undefined));
        assert!(!Value::from(f64::NAN).strict_eq(&Value::from(f64::NAN)));
    }

    #[test]
    fn loose_equality_coerces() {
        assert!(Value::from(0).loose_eq(&Value::from("0")));
        assert!(Value::from(1).loose_eq(&Value::from(true)));
        assert!(Value::from("").loose_eq(&Value::from(false)));
        assert!(Value::Null.loose_eq(&Value::Undefined));
        assert!(!Value::Null.loose_eq(&Value::from(0)));
        assert!(!Value::from("a").loose_eq(&Value::from("b")));
    }

    #[test]
    fn objects_compare_by_identity() {
        let a = Value::from_json(json!({ "x": 1 }));
        let b = Value::from_json(json!({ "x": 1 }));
        assert!(a.strict_eq(&a.clone()));
        assert!(!a.strict_eq(&b));
        assert!(!a.loose_eq(&b));
    }

    #[test]
    fn json_round_trip_snapshot() {
        let data = json!({ "name": "Ada", "tags": ["x"], "meta": { "age": 36, "score": 0.5 } });
        assert_eq!(Value::from_json(data.clone()).to_json(), data);
    }
}
