//! Environment key-value sets
//!
//! The product can be configured entirely through process environment
//! variables. The logical option `a.b.c` is exposed as `PREFIX_A_B_C`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::path::KeyPath;

/// Default environment prefix of the configured product
pub const DEFAULT_ENV_PREFIX: &str = "CENTRIFUGO";

static ENV_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:export\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*)$").expect("valid env line regex")
});

/// Environment key for a logical option path
///
/// ```
/// # use confmig_document::{env_key, KeyPath};
/// let path: KeyPath = "client.token.hmac_secret_key".parse().unwrap();
/// assert_eq!(env_key("CENTRIFUGO", &path), "CENTRIFUGO_CLIENT_TOKEN_HMAC_SECRET_KEY");
/// ```
#[must_use]
pub fn env_key(prefix: &str, path: &KeyPath) -> String {
    format!("{}_{}", prefix, path.join_env())
}

impl KeyPath {
    fn join_env(&self) -> String {
        self.iter()
            .map(str::to_uppercase)
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// Ordered set of environment variables
///
/// Keys are unique; assigning an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSet {
    entries: Vec<(String, String)>,
}

impl EnvSet {
    /// Create an empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse newline-delimited `KEY="value"` text
    ///
    /// Blank lines, comments and malformed lines are skipped without error.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut set = Self::new();
        for (number, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match ENV_LINE.captures(line) {
                Some(caps) => set.insert(&caps[1], unquote(caps[2].trim())),
                None => tracing::debug!(line = number + 1, "ignoring malformed env line"),
            }
        }
        set
    }

    /// Set a variable
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Get a variable
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Check whether a variable is set
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate variables in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of variables
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if set is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as `KEY="value"` lines
    #[must_use]
    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{k}=\"{v}\""))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
