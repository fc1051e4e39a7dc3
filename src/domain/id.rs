//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marketplace posting identifier - the deduplication key.
///
/// The inner String is private and never empty; all construction goes
/// through [`PostingId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostingId(String);

impl PostingId {
    /// Create a `PostingId`, rejecting empty or whitespace-only input.
    pub fn parse(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.len() == id.len() {
            Some(Self(id))
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Get the posting ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for PostingId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s).ok_or_else(|| "posting id must not be empty".to_string())
    }
}

impl From<PostingId> for String {
    fn from(id: PostingId) -> Self {
        id.0
    }
}

impl AsRef<str> for PostingId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_blank_ids() {
        assert!(PostingId::parse("").is_none());
        assert!(PostingId::parse("   ").is_none());
    }

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let id = PostingId::parse(" ~01abc ").unwrap();
        assert_eq!(id.as_str(), "~01abc");
    }

    #[test]
    fn deserialize_rejects_empty_string() {
        let result: Result<PostingId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());

        let id: PostingId = serde_json::from_str("\"1234\"").unwrap();
        assert_eq!(id.to_string(), "1234");
    }
}
