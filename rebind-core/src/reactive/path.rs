//! Expression paths.
//!
//! A path is either a single key (`name`) or a dotted walk through nested
//! reactive objects (`user.profile.name`). Whitespace around the whole path
//! and around each segment is ignored, so `{{ user . name }}` works.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::error::Error;

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: SmallVec<[String; 2]>,
}

impl Path {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let segments = raw
            .trim()
            .split('.')
            .map(str::trim)
            .map(|segment| {
                if segment.is_empty() {
                    Err(Error::InvalidPath(raw.to_owned()))
                } else {
                    Ok(segment.to_owned())
                }
            })
            .collect::<Result<SmallVec<_>, _>>()?;

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Split into parent segments and the final key.
    pub fn split_last(&self) -> (&[String], &str) {
        match self.segments.split_last() {
            Some((last, parent)) => (parent, last.as_str()),
            // `parse` never yields an empty path.
            None => (&[], ""),
        }
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_key() {
        let path = Path::parse(" name ").unwrap();
        assert_eq!(path.segments(), ["name"]);
        assert_eq!(path.to_string(), "name");
    }

    #[test]
    fn parses_dotted_path_with_whitespace() {
        let path: Path = "user . name".parse().unwrap();
        assert_eq!(path.segments(), ["user", "name"]);
        assert_eq!(path.split_last(), (&["user".to_owned()][..], "name"));
    }

    #[test]
    fn rejects_empty_segments() {
        assert!(matches!(Path::parse(""), Err(Error::InvalidPath(_))));
        assert!(matches!(Path::parse("a..b"), Err(Error::InvalidPath(_))));
        assert!(matches!(Path::parse("a."), Err(Error::InvalidPath(_))));
    }
}
