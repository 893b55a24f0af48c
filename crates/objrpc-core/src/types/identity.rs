//! Object identity
//!
//! An identity names a remote object: a mandatory name plus an optional
//! category used for routing on servers with many objects (e.g. servant
//! locators). The empty name is legal in transit but never addresses an
//! object.

use super::strutil::escape_string;
use crate::wire;
use crate::Result;
use bytes::{Buf, BufMut};
use std::fmt;

/// Identity of a remote object: `(name, category)` pair
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity {
    /// Object name
    pub name: String,
    /// Object category; empty for uncategorized objects
    pub category: String,
}

impl Identity {
    /// Create an identity with an empty category
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: String::new(),
        }
    }

    /// Create an identity with a category
    pub fn with_category(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }

    /// Encode as two size-prefixed strings (name, then category)
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        wire::write_string(buf, &self.name);
        wire::write_string(buf, &self.category);
    }

    /// Decode from buffer
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        let name = wire::read_string(buf)?;
        let category = wire::read_string(buf)?;
        Ok(Self { name, category })
    }
}

impl fmt::Display for Identity {
    /// Writes `category/name` (or just `name` when the category is empty),
    /// escaping each part so that an embedded `/` cannot be mistaken for
    /// the separator.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.category.is_empty() {
            write!(f, "{}", escape_string(&self.name, "/"))
        } else {
            write!(
                f,
                "{}/{}",
                escape_string(&self.category, "/"),
                escape_string(&self.name, "/")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn test_display_plain() {
        assert_eq!(Identity::new("foo").to_string(), "foo");
        assert_eq!(
            Identity::with_category("obj", "cat").to_string(),
            "cat/obj"
        );
    }

    #[test]
    fn test_display_escapes_separator() {
        let ident = Identity::with_category("a/b", "c");
        assert_eq!(ident.to_string(), "c/a\\/b");
    }

    #[test]
    fn test_encode_decode() {
        let ident = Identity::with_category("hello", "greetings");
        let mut buf = BytesMut::new();
        ident.encode(&mut buf);

        let decoded = Identity::decode(&mut buf.freeze()).unwrap();
        assert_eq!(ident, decoded);
    }
}
