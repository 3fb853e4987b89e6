//! Compile-time diagnostics.
//!
//! Problems in authored markup are reported as data instead of aborting the
//! compile (unless strict directives are enabled). Each diagnostic is also
//! logged at `warn` level when it is recorded.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// The root selector matched nothing; nothing was compiled.
    RootNotFound,
    /// An event directive named a method missing from the methods table.
    /// No listener was attached.
    MissingMethod,
    /// A directive or interpolation named a data path that does not exist.
    /// The binding was still created and renders as empty.
    MissingPath,
    /// A directive value or interpolation is not a valid expression path.
    /// No binding was created.
    InvalidExpression,
    /// A directive prefix without its argument, e.g. a bare `@`.
    MalformedDirective,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// The directive attribute or interpolation that caused it.
    pub source: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn new(kind: DiagnosticKind, source: Option<&str>, message: String) -> Self {
        Self {
            kind,
            source: source.map(str::to_owned),
            message,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{:?} at `{source}`: {}", self.kind, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_source_when_known() {
        let with = Diagnostic::new(
            DiagnosticKind::MissingMethod,
            Some("@click"),
            "no method `go`".into(),
        );
        assert_eq!(with.to_string(), "MissingMethod at `@click`: no method `go`");

        let without = Diagnostic::new(DiagnosticKind::RootNotFound, None, "no `#app`".into());
        assert_eq!(without.to_string(), "RootNotFound: no `#app`");
    }
}
