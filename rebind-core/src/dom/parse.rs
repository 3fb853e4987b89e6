//! A small, lenient markup parser for the in-memory document.
//!
//! Supported: elements with quoted, unquoted and bare attributes, void and
//! self-closing elements, text with the common character entities, and
//! comments (dropped). Unclosed elements are closed at end of input.
//! Attribute names are kept verbatim so directive names like `@click`,
//! `:title` or `on:input` survive untouched.

use super::node::{Node, VOID_ELEMENTS};
use super::{DomError, RenderNode};

pub(crate) fn parse_fragment(markup: &str) -> Result<Vec<Node>, DomError> {
    Parser { src: markup, pos: 0 }.run()
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn run(mut self) -> Result<Vec<Node>, DomError> {
        let top = Node::fragment();
        let mut open: Vec<Node> = vec![top.clone()];

        while self.pos < self.src.len() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                let end = rest
                    .find("-->")
                    .ok_or_else(|| self.error("unterminated comment"))?;
                self.pos += end + 3;
            } else if is_close_tag(rest) {
                self.pos += 2;
                let name = self.read_while(is_name_byte).to_ascii_lowercase();
                self.skip_whitespace();
                self.expect(b'>')?;
                let depth = open
                    .iter()
                    .rposition(|node| node.tag() == name)
                    .filter(|depth| *depth > 0)
                    .ok_or_else(|| self.error(format!("unexpected closing tag `{name}`")))?;
                open.truncate(depth);
            } else if is_open_tag(rest) {
                self.pos += 1;
                let (element, closed) = self.read_element()?;
                current(&open).append_child(&element)?;
                if !closed {
                    open.push(element);
                }
            } else {
                let end = next_markup(rest).unwrap_or(rest.len());
                let text = decode_entities(&rest[..end]);
                self.pos += end;
                current(&open).append_child(&Node::text(&text))?;
            }
        }

        Ok(top.child_nodes())
    }

    /// Parse a start tag; the cursor sits just after `<`.
    ///
    /// Returns the element and whether it is already closed.
    fn read_element(&mut self) -> Result<(Node, bool), DomError> {
        let tag = self.read_while(is_name_byte).to_owned();
        let element = Node::element(&tag);
        let mut closed = VOID_ELEMENTS.contains(&element.tag());

        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                return Err(self.error(format!("unterminated start tag `{tag}`")));
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                closed = true;
                break;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break;
            }

            let name = self.read_while(is_attribute_name_byte).to_owned();
            if name.is_empty() {
                // Stray byte such as a lone `/`.
                self.pos += 1;
                continue;
            }

            self.skip_whitespace();
            let value = if self.rest().starts_with('=') {
                self.pos += 1;
                self.skip_whitespace();
                self.read_attribute_value()?
            } else {
                String::new()
            };
            element.set_attribute(&name, &value)?;
        }

        if let Some(value) = element.get_attribute("value") {
            element.set_value(&value)?;
        }
        Ok((element, closed))
    }

    fn read_attribute_value(&mut self) -> Result<String, DomError> {
        let rest = self.rest();
        match rest.as_bytes().first() {
            Some(&quote) if quote == b'"' || quote == b'\'' => {
                let body = &rest[1..];
                let end = body
                    .find(quote as char)
                    .ok_or_else(|| self.error("unterminated attribute value"))?;
                let value = decode_entities(&body[..end]);
                self.pos += end + 2;
                Ok(value)
            }
            _ => {
                let raw = self.read_while(|b| !b.is_ascii_whitespace() && b != b'>');
                Ok(decode_entities(raw))
            }
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn read_while(&mut self, accept: impl Fn(u8) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.bytes().take_while(|b| accept(*b)).count();
        self.pos += len;
        &rest[..len]
    }

    fn skip_whitespace(&mut self) {
        self.read_while(|b| b.is_ascii_whitespace());
    }

    fn expect(&mut self, byte: u8) -> Result<(), DomError> {
        if self.rest().as_bytes().first() == Some(&byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected `{}`", byte as char)))
        }
    }

    fn error(&self, message: impl Into<String>) -> DomError {
        DomError::Parse {
            offset: self.pos,
            message: message.into(),
        }
    }
}

fn current(open: &[Node]) -> &Node {
    // The fragment at the bottom is never popped.
    &open[open.len() - 1]
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':')
}

fn is_attribute_name_byte(b: u8) -> bool {
    !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/' | b'"' | b'\'')
}

fn is_open_tag(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    bytes.first() == Some(&b'<') && bytes.get(1).is_some_and(u8::is_ascii_alphabetic)
}

fn is_close_tag(rest: &str) -> bool {
    rest.starts_with("</") && rest.as_bytes().get(2).is_some_and(u8::is_ascii_alphabetic)
}

/// Offset of the next tag or comment, skipping a `<` at offset 0 that
/// starts neither.
fn next_markup(rest: &str) -> Option<usize> {
    rest.match_indices('<').map(|(i, _)| i).find(|&i| {
        let tail = &rest[i..];
        tail.starts_with("<!--") || is_open_tag(tail) || is_close_tag(tail)
    })
}

fn decode_entities(text: &str) -> String {
    const ENTITIES: &[(&str, char)] = &[
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&#39;", '\''),
        ("&apos;", '\''),
        ("&nbsp;", '\u{a0}'),
    ];

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        rest = &rest[at..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, c)) => {
                out.push(*c);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
