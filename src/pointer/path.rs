//! JSON pointer type and token escaping.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Returns true if the token contains a character that must be escaped
/// inside a pointer (`~` or `/`).
pub fn needs_escape(token: &str) -> bool {
    token.contains(['~', '/'])
}

/// Escapes a single reference token: `~` becomes `~0` and `/` becomes `~1`.
pub fn escape(token: &str) -> Cow<'_, str> {
    if !needs_escape(token) {
        return Cow::Borrowed(token);
    }
    Cow::Owned(token.replace('~', "~0").replace('/', "~1"))
}

/// Pointer is an encoded JSON pointer such as `/spec/selector/matchLabels`.
///
/// The empty pointer addresses the whole document. Every token appended
/// through [`Pointer::field`] is escaped, so a key containing `/` stays a
/// single path segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pointer {
    encoded: String,
}

impl Pointer {
    /// Creates the root pointer.
    pub fn root() -> Self {
        Pointer {
            encoded: String::new(),
        }
    }

    /// Creates a pointer from a list of unescaped field names.
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        fields
            .into_iter()
            .fold(Pointer::root(), |p, f| p.field(f.as_ref()))
    }

    /// Returns a new pointer with the given field name or map key appended.
    pub fn field(&self, name: &str) -> Self {
        let escaped = escape(name);
        let mut encoded = String::with_capacity(self.encoded.len() + escaped.len() + 1);
        encoded.push_str(&self.encoded);
        encoded.push('/');
        encoded.push_str(&escaped);
        Pointer { encoded }
    }

    /// Returns a new pointer with a list index appended.
    pub fn index(&self, i: usize) -> Self {
        Pointer {
            encoded: format!("{}/{}", self.encoded, i),
        }
    }

    /// Appends a pointer that is already encoded, such as one produced by a
    /// tree diff relative to this location.
    pub fn join_encoded(&self, relative: &str) -> Self {
        Pointer {
            encoded: format!("{}{}", self.encoded, relative),
        }
    }

    /// Returns the encoded pointer string.
    pub fn as_str(&self) -> &str {
        &self.encoded
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl From<Pointer> for String {
    fn from(p: Pointer) -> Self {
        p.encoded
    }
}
