//! Key-path mapping tables

use confmig_document::KeyPath;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered `source path -> destination path` pairs for one transition
///
/// Paths stay strings until used so that a single malformed entry turns into
/// a no-op instead of rejecting the whole table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingTable(IndexMap<String, String>);

impl MappingTable {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry
    ///
    /// A replaced entry keeps its original position.
    pub fn insert(&mut self, source: impl Into<String>, destination: impl Into<String>) {
        self.0.insert(source.into(), destination.into());
    }

    /// Append every entry of `other`, after the entries already present
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Destination for a source path
    #[must_use]
    pub fn get(&self, source: &str) -> Option<&str> {
        self.0.get(source).map(String::as_str)
    }

    /// Raw entries in table order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(s, d)| (s.as_str(), d.as_str()))
    }

    /// Parsed entries in table order, skipping malformed paths
    pub fn entries(&self) -> impl Iterator<Item = (KeyPath, KeyPath)> + '_ {
        self.0.iter().filter_map(|(source, destination)| {
            match (source.parse::<KeyPath>(), destination.parse::<KeyPath>()) {
                (Ok(s), Ok(d)) if !s.is_empty() && !d.is_empty() => Some((s, d)),
                _ => {
                    tracing::warn!(%source, %destination, "skipping malformed mapping entry");
                    None
                }
            }
        })
    }

    /// Parsed source paths in table order, skipping malformed ones
    pub fn sources(&self) -> impl Iterator<Item = KeyPath> + '_ {
        self.entries().map(|(source, _)| source)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>, D: Into<String>> FromIterator<(S, D)> for MappingTable {
    fn from_iter<I: IntoIterator<Item = (S, D)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(s, d)| (s.into(), d.into())).collect())
    }
}
