//! Key paths for addressing within configuration documents
//!
//! Provides [`KeyPath`] for dot-delimited addressing of nested options.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Path within a configuration document
///
/// Each segment names one mapping key. A flat legacy key is a single-segment
/// path; nested options use one segment per level.
///
/// # Examples
/// - `["client", "token", "hmac_secret_key"]` → `client.token.hmac_secret_key`
/// - `["token_hmac_secret_key"]` → `token_hmac_secret_key`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    /// Create new path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Create path from a single key
    #[inline]
    #[must_use]
    pub fn single(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    /// Empty path (document root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is the root
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get parent path (if not root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Get last segment (if not root)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Get first segment (if not root)
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Append a segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }

    /// Append every segment of `suffix`, returning new path
    #[inline]
    #[must_use]
    pub fn join(&self, suffix: &Self) -> Self {
        let mut new = self.clone();
        new.0.extend(suffix.0.iter().cloned());
        new
    }

    /// Check if this path is a strict prefix of another
    ///
    /// `client.token` is an ancestor of `client.token.audience`, but not of
    /// itself.
    #[inline]
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.0.len() < other.0.len() && self.0 == other.0[..self.0.len()]
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for KeyPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for KeyPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }

        let segments = s
            .split('.')
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment(s.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

impl From<Vec<String>> for KeyPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl Serialize for KeyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeyPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors related to key paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Empty segment in path
    #[error("path '{0}' contains an empty segment")]
    EmptySegment(String),

    /// An intermediate node exists but is not a mapping
    #[error("cannot write '{path}': '{at}' holds a non-mapping value")]
    NotAMapping {
        /// Full path being written
        path: String,
        /// Prefix that blocked the write
        at: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_from_str_valid() {
        let path: KeyPath = "client.token.audience".parse().unwrap();
        assert_eq!(path.segments(), &["client", "token", "audience"]);
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn path_from_str_flat_key() {
        let path: KeyPath = "token_hmac_secret_key".parse().unwrap();
        assert_eq!(path, KeyPath::single("token_hmac_secret_key"));
    }

    #[test]
    fn path_from_str_empty_is_root() {
        let path: KeyPath = "".parse().unwrap();
        assert!(path.is_empty());
        assert!(path.parent().is_none());
    }

    #[test]
    fn path_from_str_empty_segment() {
        let result: Result<KeyPath, _> = "a..b".parse();
        assert!(matches!(result, Err(PathError::EmptySegment(_))));
    }

    #[test]
    fn path_allows_punctuation_in_segments() {
        let path: KeyPath = "headers.X-Request-Id".parse().unwrap();
        assert_eq!(path.last(), Some("X-Request-Id"));
    }

    #[test]
    fn path_parent_child_and_join() {
        let path: KeyPath = "a.b".parse().unwrap();
        assert_eq!(path.child("c").to_string(), "a.b.c");
        assert_eq!(path.parent().unwrap().to_string(), "a");
        assert_eq!(path.first(), Some("a"));

        let suffix: KeyPath = "http.static_headers".parse().unwrap();
        assert_eq!(path.join(&suffix).to_string(), "a.b.http.static_headers");
    }

    #[test]
    fn path_is_ancestor_of() {
        let parent: KeyPath = "client".parse().unwrap();
        let child: KeyPath = "client.token".parse().unwrap();
        assert!(parent.is_ancestor_of(&child));
        assert!(!child.is_ancestor_of(&parent));
        assert!(!parent.is_ancestor_of(&parent));
    }

    #[test]
    fn path_serde_as_string() {
        let path: KeyPath = "engine.redis.address".parse().unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"engine.redis.address\"");
        let back: KeyPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}
