//! Text interpolation markers: `{{ expression }}`.

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// The trimmed expression of the first `{{ ... }}` marker in `text`.
///
/// Only the first marker of a text node is considered. Whitespace inside
/// the braces, including newlines, is ignored.
pub fn first_expression(text: &str) -> Option<&str> {
    let start = text.find(OPEN)? + OPEN.len();
    let body = &text[start..];
    // The expression is at least one character long, so `{{}}}` yields `}`.
    let search_from = body.chars().next()?.len_utf8();
    let end = body[search_from..].find(CLOSE)? + search_from;
    Some(body[..end].trim())
}
