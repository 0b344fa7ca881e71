use std::fmt::{self, Write};

/// A materialized JSON Pointer (RFC 6901) into a document or schema.
///
/// The root pointer is the empty string; every other pointer is a sequence
/// of `/`-prefixed reference tokens with `~` and `/` escaped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Location(String);

impl Location {
    pub fn new() -> Location {
        Location(String::new())
    }

    #[must_use]
    pub(crate) fn join(&self, segment: &str) -> Location {
        let mut inner = String::with_capacity(self.0.len() + segment.len() + 1);
        inner.push_str(&self.0);
        inner.push('/');
        write_escaped(&mut inner, segment);
        Location(inner)
    }

    #[must_use]
    pub(crate) fn join_index(&self, index: usize) -> Location {
        let mut buffer = itoa::Buffer::new();
        let segment = buffer.format(index);
        let mut inner = String::with_capacity(self.0.len() + segment.len() + 1);
        inner.push_str(&self.0);
        inner.push('/');
        inner.push_str(segment);
        Location(inner)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_char('/')
        } else {
            f.write_str(&self.0)
        }
    }
}

pub(crate) fn write_escaped(out: &mut String, segment: &str) {
    for ch in segment.chars() {
        match ch {
            '~' => out.push_str("~0"),
            '/' => out.push_str("~1"),
            _ => out.push(ch),
        }
    }
}

enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

/// A linked list of path segments living on the call stack.
///
/// Violation paths are materialized into [`Location`] only when a violation
/// is actually reported, so the happy path never allocates.
pub(crate) struct LazyLocation<'a, 'b> {
    segment: Option<Segment<'a>>,
    parent: Option<&'b LazyLocation<'a, 'b>>,
}

impl<'a, 'b> LazyLocation<'a, 'b> {
    pub(crate) fn new() -> Self {
        LazyLocation {
            segment: None,
            parent: None,
        }
    }

    pub(crate) fn push(&'b self, key: &'a str) -> Self {
        LazyLocation {
            segment: Some(Segment::Key(key)),
            parent: Some(self),
        }
    }

    pub(crate) fn push_index(&'b self, index: usize) -> Self {
        LazyLocation {
            segment: Some(Segment::Index(index)),
            parent: Some(self),
        }
    }
}

impl From<&LazyLocation<'_, '_>> for Location {
    fn from(location: &LazyLocation<'_, '_>) -> Location {
        let mut segments = Vec::new();
        let mut current = Some(location);
        while let Some(node) = current {
            if let Some(segment) = &node.segment {
                segments.push(segment);
            }
            current = node.parent;
        }
        let mut inner = String::new();
        let mut buffer = itoa::Buffer::new();
        for segment in segments.into_iter().rev() {
            inner.push('/');
            match segment {
                Segment::Key(key) => write_escaped(&mut inner, key),
                Segment::Index(index) => inner.push_str(buffer.format(*index)),
            }
        }
        Location(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::{LazyLocation, Location};

    #[test]
    fn join_escapes_tokens() {
        let location = Location::new().join("a/b").join("c~d");
        assert_eq!(location.as_str(), "/a~1b/c~0d");
    }

    #[test]
    fn root_displays_as_slash() {
        assert_eq!(Location::new().to_string(), "/");
        assert_eq!(Location::new().as_str(), "");
    }

    #[test]
    fn lazy_location_materializes_in_order() {
        let root = LazyLocation::new();
        let items = root.push("items");
        let first = items.push_index(0);
        let name = first.push("name");
        assert_eq!(Location::from(&name).as_str(), "/items/0/name");
        assert_eq!(Location::from(&root).as_str(), "");
    }
}
