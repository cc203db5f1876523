//! Navigation identity.

use std::fmt;
use std::ops::Deref;

/// A location the application can be at, e.g. `/flow/abc?step=2`.
///
/// Locations are compared by exact string equality only. Pattern matching
/// looks at [`path`](Self::path), which drops the query and fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location(String);

impl Location {
    /// Wrap a location string.
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    /// The full location string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path portion, without `?query` or `#fragment`.
    pub fn path(&self) -> &str {
        path_of(&self.0)
    }

    /// Consume into the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Path portion of a raw location string.
pub(crate) fn path_of(location: &str) -> &str {
    location
        .find(|c: char| c == '?' || c == '#')
        .map_or(location, |end| &location[..end])
}

impl Deref for Location {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Location {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Location {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&String> for Location {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

impl PartialEq<str> for Location {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Location {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
