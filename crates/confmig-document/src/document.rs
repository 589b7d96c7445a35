//! Configuration documents
//!
//! A [`Document`] is a mapping node from string keys to
//! [`serde_json::Value`] children. Key order is preserved so migrated output
//! reads in the same order as the input.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::path::{KeyPath, PathError};

/// A configuration document (or one mapping entry nested inside it)
///
/// The engine is schema-agnostic at this level: any mapping is a valid
/// document. Absence means "key not present"; `null`, `false` and `0` are
/// all defined values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Create an empty document
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap a value if it is a mapping
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Get value at path
    ///
    /// Missing or non-mapping intermediate nodes mean the value is absent.
    #[must_use]
    pub fn get(&self, path: &KeyPath) -> Option<&Value> {
        let (last, parents) = path.segments().split_last()?;
        let mut current = &self.0;
        for segment in parents {
            match current.get(segment)? {
                Value::Object(map) => current = map,
                _ => return None,
            }
        }
        current.get(last)
    }

    /// Get a top-level value by key
    #[inline]
    #[must_use]
    pub fn get_key(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Check whether a value is present at path
    #[inline]
    #[must_use]
    pub fn is_defined(&self, path: &KeyPath) -> bool {
        self.get(path).is_some()
    }

    /// Write value at path, creating intermediate mappings as needed
    ///
    /// An existing value at the exact path is replaced; callers that must
    /// never overwrite check [`Document::is_defined`] first.
    ///
    /// # Errors
    /// Returns [`PathError::NotAMapping`] if an intermediate node holds a
    /// scalar or sequence. Nothing is written in that case.
    pub fn try_insert(&mut self, path: &KeyPath, value: Value) -> Result<(), PathError> {
        let Some((last, parents)) = path.segments().split_last() else {
            return Ok(());
        };

        let mut current = &mut self.0;
        for (depth, segment) in parents.iter().enumerate() {
            let node = current
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            match node {
                Value::Object(map) => current = map,
                _ => {
                    return Err(PathError::NotAMapping {
                        path: path.to_string(),
                        at: parents[..=depth].join("."),
                    })
                }
            }
        }

        current.insert(last.clone(), value);
        Ok(())
    }

    /// Remove value at path, keeping sibling order intact
    pub fn remove(&mut self, path: &KeyPath) -> Option<Value> {
        let (last, parents) = path.segments().split_last()?;
        let mut current = &mut self.0;
        for segment in parents {
            match current.get_mut(segment)? {
                Value::Object(map) => current = map,
                _ => return None,
            }
        }
        current.shift_remove(last)
    }

    /// Top-level keys in document order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of top-level keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if document has no keys
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying mapping
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Unwrap into the underlying mapping
    #[inline]
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Unwrap into a JSON value
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Self {
        document.into_value()
    }
}
