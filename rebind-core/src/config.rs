//! Engine configuration.
//!
//! Options travel with the [`ViewModel`](crate::ViewModel) and are read by
//! watchers (change detection) and by the compiler (directive handling).
//! They can be built in code or deserialized from JSON:
//!
//! ```rust
//! use rebind_core::config::{ChangeDetection, Options};
//!
//! let options = Options::from_json(r#"{ "change_detection": "loose" }"#).unwrap();
//! assert_eq!(options.change_detection, ChangeDetection::Loose);
//! assert!(!options.strict_directives);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::value::Value;

/// How a watcher decides that a freshly evaluated value differs from the
/// cached one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDetection {
    /// Type-sensitive structural equality: `0` and `"0"` differ.
    #[default]
    Strict,
    /// Coercing equality: `0` and `"0"` are the same value.
    Loose,
}

impl ChangeDetection {
    pub fn same(self, a: &Value, b: &Value) -> bool {
        match self {
            ChangeDetection::Strict => a.strict_eq(b),
            ChangeDetection::Loose => a.loose_eq(b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub change_detection: ChangeDetection,

    /// Turn unresolved methods and data paths into compile errors instead
    /// of diagnostics.
    pub strict_directives: bool,

    /// Also accept `v-on:`, `v-bind:` and `v-model` directive names.
    pub legacy_prefixes: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            change_detection: ChangeDetection::Strict,
            strict_directives: false,
            legacy_prefixes: false,
        }
    }
}

impl Options {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn defaults_are_strict_and_permissive() {
        let options = Options::default();
        assert_eq!(options.change_detection, ChangeDetection::Strict);
        assert!(!options.strict_directives);
        assert!(!options.legacy_prefixes);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let options = Options::from_json(r#"{ "legacy_prefixes": true }"#).unwrap();
        assert!(options.legacy_prefixes);
        assert_eq!(options.change_detection, ChangeDetection::Strict);
    }

    #[test]
    fn unknown_policy_is_a_config_error() {
        let err = Options::from_json(r#"{ "change_detection": "fuzzy" }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn policies_disagree_on_coerced_values() {
        let zero = Value::from(0);
        let text = Value::from("0");
        assert!(!ChangeDetection::Strict.same(&zero, &text));
        assert!(ChangeDetection::Loose.same(&zero, &text));
    }
}
