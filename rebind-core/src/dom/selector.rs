//! Simple selectors: `tag`, `#id`, `.class` and compounds like `div#app.main`.

use super::DomError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    pub fn parse(text: &str) -> Result<Self, DomError> {
        let text = text.trim();
        let invalid = || DomError::InvalidSelector(text.to_owned());
        if text.is_empty() || text.contains(char::is_whitespace) {
            return Err(invalid());
        }

        let mut selector = Selector::default();
        let mut rest = text;

        let tag_end = rest.find(['#', '.']).unwrap_or(rest.len());
        if tag_end > 0 {
            selector.tag = Some(rest[..tag_end].to_ascii_lowercase());
        }
        rest = &rest[tag_end..];

        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['#', '.']).unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty() {
                return Err(invalid());
            }
            match marker {
                '#' if selector.id.is_none() => selector.id = Some(name.to_owned()),
                '.' => selector.classes.push(name.to_owned()),
                _ => return Err(invalid()),
            }
            rest = &body[end..];
        }

        Ok(selector)
    }

    /// Whether an element with this tag and attribute lookup matches.
    pub fn matches<'a>(&self, tag: &str, attribute: impl Fn(&str) -> Option<&'a str>) -> bool {
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(expected) = &self.id {
            if attribute("id") != Some(expected.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class = attribute("class").unwrap_or_default();
            let has = |wanted: &String| class.split_whitespace().any(|c| c == wanted);
            if !self.classes.iter().all(has) {
                return false;
            }
        }
        true
    }
}
