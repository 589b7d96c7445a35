//! Rule scopes
//!
//! Rules run against the whole document or against every entry of a repeated
//! sub-structure such as `channel.namespaces`, `proxies` or `consumers`.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use confmig_document::{Document, KeyPath, PathError, Value};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Where a rule was applied, for log messages only
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeLabel {
    /// Top-level configuration
    Config,
    /// One entry of a repeated sub-structure
    Entry {
        /// Singular kind named after the whole array path, e.g. `rpc namespace`
        kind: String,
        /// The entry's `name` field, if it is a string
        name: Option<String>,
        /// Position in the sequence
        index: usize,
    },
}

impl ScopeLabel {
    /// Label for the entry at `index` of the sequence stored under `array`
    #[must_use]
    pub fn entry(array: &KeyPath, index: usize, entry: &Document) -> Self {
        Self::Entry {
            kind: entry_kind(array),
            name: entry
                .get_key("name")
                .and_then(Value::as_str)
                .map(str::to_string),
            index,
        }
    }
}

impl Display for ScopeLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config => write!(f, "config"),
            Self::Entry {
                kind,
                name: Some(name),
                ..
            } => write!(f, "{kind} \"{name}\""),
            Self::Entry {
                kind,
                name: None,
                index,
            } => write!(f, "{kind} #{index}"),
        }
    }
}

/// `channel.namespaces` → `channel namespace`, `proxies` → `proxy`
fn entry_kind(array: &KeyPath) -> String {
    let Some((last, parents)) = array.segments().split_last() else {
        return "entry".to_string();
    };
    let mut words: Vec<String> = parents.to_vec();
    words.push(singular(last));
    words.join(" ")
}

fn singular(plural: &str) -> String {
    if let Some(stem) = plural.strip_suffix("ies") {
        format!("{stem}y")
    } else if let Some(stem) = plural.strip_suffix('s') {
        stem.to_string()
    } else {
        plural.to_string()
    }
}

/// Which mappings a rule is applied to
///
/// Written as `$` for the document root, or `path[*]` for every mapping entry
/// of the sequence at `path`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScopeSelector {
    /// The document root
    Root,
    /// Every mapping entry of the sequence at this path
    Each(KeyPath),
}

impl Display for ScopeSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "$"),
            Self::Each(path) => write!(f, "{path}[*]"),
        }
    }
}

impl FromStr for ScopeSelector {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "$" || s.is_empty() {
            return Ok(Self::Root);
        }
        match s.strip_suffix("[*]") {
            Some(path) => Ok(Self::Each(path.parse()?)),
            None => Ok(Self::Each(s.parse()?)),
        }
    }
}

impl Serialize for ScopeSelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ScopeSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
