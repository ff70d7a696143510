use std::{fmt, ops::Deref, sync::Arc};

use uuid::Uuid;

/// Unique identifier of a message, assigned once when an envelope is constructed.
///
/// Freshly generated ids are hyphenated UUIDv4 strings. Any other string can be
/// adopted as an id (e.g. when decoding a wire envelope produced elsewhere).
/// The value is immutable, so clones share the same allocation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MessageId(Arc<str>);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string().into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for MessageId {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.into())
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id.into())
    }
}
