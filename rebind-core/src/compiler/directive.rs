//! Directive syntax.
//!
//! | Directive | Syntax                     |
//! |-----------|----------------------------|
//! | Event     | `on:<event>` or `@<event>` |
//! | Bind      | `bind:<attr>` or `:<attr>` |
//! | Model     | `model`                    |
//!
//! With legacy prefixes enabled, `v-on:<event>`, `v-bind:<attr>` and
//! `v-model` are recognized as well.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive<'a> {
    /// Attach a method as listener for the named event.
    On(&'a str),
    /// One-way data to attribute binding for the named attribute.
    Bind(&'a str),
    /// Two-way binding between data and the input value.
    Model,
    /// Recognized prefix with a missing argument, e.g. a bare `@`.
    Malformed,
}

const EVENT_PREFIXES: &[&str] = &["on:", "@"];
const BIND_PREFIXES: &[&str] = &["bind:", ":"];
const LEGACY_EVENT_PREFIX: &str = "v-on:";
const LEGACY_BIND_PREFIX: &str = "v-bind:";
const LEGACY_MODEL: &str = "v-model";

impl<'a> Directive<'a> {
    /// Classify an attribute name. Returns `None` for ordinary attributes.
    pub fn parse(name: &'a str, legacy: bool) -> Option<Self> {
        if name == "model" || (legacy && name == LEGACY_MODEL) {
            return Some(Directive::Model);
        }

        let argument = |prefixes: &[&str], legacy_prefix: &str| {
            prefixes
                .iter()
                .copied()
                .chain(legacy.then_some(legacy_prefix))
                .find_map(|prefix| name.strip_prefix(prefix))
        };

        if let Some(event) = argument(EVENT_PREFIXES, LEGACY_EVENT_PREFIX) {
            return Some(if event.is_empty() {
                Directive::Malformed
            } else {
                Directive::On(event)
            });
        }
        if let Some(attr) = argument(BIND_PREFIXES, LEGACY_BIND_PREFIX) {
            return Some(if attr.is_empty() {
                Directive::Malformed
            } else {
                Directive::Bind(attr)
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_event_directives() {
        assert_eq!(Directive::parse("on:click", false), Some(Directive::On("click")));
        assert_eq!(Directive::parse("@input", false), Some(Directive::On("input")));
    }

    #[test]
    fn recognizes_bind_directives() {
        assert_eq!(Directive::parse("bind:title", false), Some(Directive::Bind("title")));
        assert_eq!(Directive::parse(":href", false), Some(Directive::Bind("href")));
    }

    #[test]
    fn recognizes_model_without_argument() {
        assert_eq!(Directive::parse("model", false), Some(Directive::Model));
        assert_eq!(Directive::parse("model:x", false), None);
    }

    #[test]
    fn ordinary_attributes_are_not_directives() {
        for name in ["id", "class", "value", "online", "binding", "data-on"] {
            assert_eq!(Directive::parse(name, false), None, "{name}");
        }
    }

    #[test]
    fn empty_arguments_are_malformed() {
        assert_eq!(Directive::parse("@", false), Some(Directive::Malformed));
        assert_eq!(Directive::parse(":", false), Some(Directive::Malformed));
        assert_eq!(Directive::parse("on:", false), Some(Directive::Malformed));
    }

    #[test]
    fn legacy_prefixes_are_opt_in() {
        assert_eq!(Directive::parse("v-on:click", false), None);
        assert_eq!(Directive::parse("v-model", false), None);

        assert_eq!(Directive::parse("v-on:click", true), Some(Directive::On("click")));
        assert_eq!(Directive::parse("v-bind:title", true), Some(Directive::Bind("title")));
        assert_eq!(Directive::parse("v-model", true), Some(Directive::Model));
    }
}
