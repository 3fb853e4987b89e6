//! Error types shared across the engine.

use thiserror::Error;

use crate::dom::DomError;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced by the reactive layer, the compiler and the view-model.
#[derive(Debug, Error)]
pub enum Error {
    /// An expression path could not be parsed (e.g. `a..b` or an empty string).
    #[error("invalid expression path `{0}`")]
    InvalidPath(String),

    /// A write targeted a path whose parent is not a reactive object.
    #[error("path `{path}` does not resolve to a reactive object")]
    PathNotFound { path: String },

    /// An event directive referenced a method missing from the methods table.
    #[error("unknown method `{name}` referenced by `{directive}`")]
    UnknownMethod { name: String, directive: String },

    /// A directive referenced a data path that does not exist at compile time.
    #[error("unknown data path `{path}` referenced by `{directive}`")]
    UnknownPath { path: String, directive: String },

    /// One or more subscribers failed while a property change fanned out.
    ///
    /// Every subscriber was still notified; this only reports the failures.
    #[error("{} subscriber(s) failed after `{key}` changed", failures.len())]
    Notify { key: String, failures: Vec<Error> },

    /// A listener attached to a render-target node failed.
    #[error("listener for `{event}` failed: {message}")]
    Listener { event: String, message: String },

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// Build a listener failure from any displayable cause.
    pub fn listener(event: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Listener {
            event: event.into(),
            message: cause.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_error_reports_failure_count() {
        let err = Error::Notify {
            key: "name".into(),
            failures: vec![
                Error::InvalidPath("a..b".into()),
                Error::listener("input", "boom"),
            ],
        };
        assert_eq!(err.to_string(), "2 subscriber(s) failed after `name` changed");
    }

    #[test]
    fn dom_errors_convert() {
        let err: Error = DomError::NotAnElement { operation: "set_attribute" }.into();
        assert!(matches!(err, Error::Dom(_)));
    }
}
