use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identifier of a stored blob (the sealed contents of a container).
///
/// Fresh identifiers are random UUIDs rendered as 32 lowercase hex digits
/// without hyphens. Identifiers migrated from the legacy one-file-per-blob
/// layout keep their original file name, so the only structural guarantee is
/// that an id is non-empty and usable as a flat file name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlobId(String);

impl BlobId {
    /// Generate a new random blob identifier (UUID v4, simple form).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Parse an identifier, rejecting empty strings and path separators.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TypeError::InvalidId("blob id is empty".into()));
        }
        if s.contains(['/', '\\']) || s == "." || s == ".." {
            return Err(TypeError::InvalidId(format!("blob id {s:?} is not a flat name")));
        }
        Ok(Self(s.to_string()))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 8 characters) for log lines.
    pub fn short_id(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Debug for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobId({})", self.short_id())
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BlobId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BlobId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BlobId> for String {
    fn from(id: BlobId) -> Self {
        id.0
    }
}

/// Identifier of a registered stamp design (auto-incremented by the registry).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StampId(i64);

impl StampId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Debug for StampId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StampId({})", self.0)
    }
}

impl fmt::Display for StampId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StampId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|e| TypeError::InvalidId(format!("stamp id {s:?}: {e}")))
    }
}

impl From<i64> for StampId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = BlobId::generate();
        let b = BlobId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn generated_id_is_32_hex_chars() {
        let id = BlobId::generate();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn parse_rejects_empty_and_paths() {
        assert!(BlobId::parse("").is_err());
        assert!(BlobId::parse("   ").is_err());
        assert!(BlobId::parse("../escape").is_err());
        assert!(BlobId::parse("a\\b").is_err());
        assert!(BlobId::parse("..").is_err());
    }

    #[test]
    fn parse_accepts_legacy_names() {
        let id = BlobId::parse("9f2c1e0a-legacy").unwrap();
        assert_eq!(id.as_str(), "9f2c1e0a-legacy");
    }

    #[test]
    fn short_id_is_8_chars() {
        let id = BlobId::generate();
        assert_eq!(id.short_id().len(), 8);
        let tiny = BlobId::parse("abc").unwrap();
        assert_eq!(tiny.short_id(), "abc");
    }

    #[test]
    fn blob_id_serde_roundtrip() {
        let id = BlobId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_str()));
        let parsed: BlobId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
        assert!(serde_json::from_str::<BlobId>("\"\"").is_err());
    }

    #[test]
    fn stamp_id_parse_and_display() {
        let id: StampId = "42".parse().unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");
        assert!("forty-two".parse::<StampId>().is_err());
    }

    #[test]
    fn stamp_ids_order_numerically() {
        assert!(StampId::new(2) < StampId::new(10));
    }
}
