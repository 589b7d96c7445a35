//! Change log
//!
//! Every mutation a migration applies is recorded as one [`ChangeEntry`]. The
//! log is append-only and is rendered for the user as a JSON array of strings.

use std::fmt::{self, Display, Formatter};

use confmig_document::{KeyPath, Value};
use serde::{Serialize, Serializer};

use crate::scope::ScopeLabel;

/// One atomic change applied during a migration
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEntry {
    /// Value copied from a legacy path to its new path
    Migrated {
        /// Source path
        from: String,
        /// Destination path
        to: String,
    },

    /// Shared legacy proxy option copied into a per-kind proxy object
    Hoisted {
        /// Legacy flat option
        from: KeyPath,
        /// Nested destination
        to: KeyPath,
    },

    /// Option renamed within its scope
    Renamed {
        /// Enclosing scope
        scope: ScopeLabel,
        /// Old key
        from: KeyPath,
        /// New key
        to: KeyPath,
        /// Old and new value when the rename also converted the value
        converted: Option<(Value, Value)>,
    },

    /// Option deleted
    Removed {
        /// Enclosing scope
        scope: ScopeLabel,
        /// Deleted key
        key: KeyPath,
    },

    /// Previously implicit default written explicitly
    DefaultSet {
        /// Enclosing scope
        scope: ScopeLabel,
        /// Written key
        key: KeyPath,
        /// Written value
        value: Value,
    },

    /// Numeric seconds rewritten as a duration string
    DurationConverted {
        /// Enclosing scope
        scope: ScopeLabel,
        /// Converted key
        key: KeyPath,
        /// Original number
        from: Value,
        /// Duration string
        to: String,
    },

    /// Legacy host and port lists zipped into addresses
    RedisAddress {
        /// Enclosing scope
        scope: ScopeLabel,
        /// Legacy host option
        host: KeyPath,
        /// Legacy port option
        port: KeyPath,
        /// Destination key
        target: KeyPath,
        /// Resulting `host:port` addresses
        addresses: Vec<String>,
    },

    /// Proxy header allow-list synthesized from defaults
    ProxyHeaders {
        /// Enclosing scope
        scope: ScopeLabel,
        /// Destination key
        target: KeyPath,
        /// Headers written
        headers: Vec<String>,
    },

    /// Split permission granted because the old toggle was on
    Granted {
        /// Enclosing scope
        scope: ScopeLabel,
        /// Old toggle, if the grant was conditional on one
        toggle: Option<KeyPath>,
        /// Permission granted
        grant: KeyPath,
    },

    /// Legacy `true` toggle turned into a forced option
    Forced {
        /// Enclosing scope
        scope: ScopeLabel,
        /// Old toggle
        from: KeyPath,
        /// Forced option
        to: KeyPath,
    },

    /// Channel pattern split out of a namespace name
    PatternSplit {
        /// Enclosing scope
        scope: ScopeLabel,
        /// Original name, now the pattern
        pattern: String,
        /// Derived name
        name: String,
    },

    /// Environment variable renamed
    EnvMigrated {
        /// Legacy variable
        from: String,
        /// New variable
        to: String,
    },

    /// Environment flag synthesized from a legacy variable
    EnvFlag {
        /// Legacy variable that implied the flag
        from: String,
        /// Flag variable set to `true`
        to: String,
    },

    /// Option present in the source but not carried into the output
    NotMigrated {
        /// Path or variable name
        key: String,
    },
}

impl Display for ChangeEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Migrated { from, to } => {
                write!(f, "migrate value from \"{from}\" to path \"{to}\"")
            }
            Self::Hoisted { from, to } => write!(f, "hoist \"{from}\" to path \"{to}\""),
            Self::Renamed {
                scope,
                from,
                to,
                converted: None,
            } => write!(f, "{scope}: rename option \"{from}\" to \"{to}\""),
            Self::Renamed {
                scope,
                from,
                to,
                converted: Some((old, new)),
            } => write!(
                f,
                "{scope}: rename option \"{from}\" to \"{to}\" and convert {old} to {new}"
            ),
            Self::Removed { scope, key } => write!(f, "{scope}: remove option \"{key}\""),
            Self::DefaultSet { scope, key, value } => {
                write!(f, "{scope}: set \"{key}\" to {value}")
            }
            Self::DurationConverted {
                scope,
                key,
                from,
                to,
            } => write!(f, "{scope}: convert \"{key}\" from {from} to duration \"{to}\""),
            Self::RedisAddress {
                scope,
                host,
                port,
                target,
                addresses,
            } => write!(
                f,
                "{scope}: {host} and {port} converted to \"{target}\" [{}]",
                addresses.join(", ")
            ),
            Self::ProxyHeaders {
                scope,
                target,
                headers,
            } => write!(
                f,
                "{scope}: set \"{target}\" to proxy headers [{}]",
                headers.join(", ")
            ),
            Self::Granted {
                scope,
                toggle: Some(toggle),
                grant,
            } => write!(f, "{scope}: \"{toggle}\" enabled, set \"{grant}\" to true"),
            Self::Granted {
                scope,
                toggle: None,
                grant,
            } => write!(f, "{scope}: set \"{grant}\" to true"),
            Self::Forced { scope, from, to } => {
                write!(f, "{scope}: \"{from}\" was true, set \"{to}\" to true")
            }
            Self::PatternSplit {
                scope,
                pattern,
                name,
            } => write!(
                f,
                "{scope}: move \"{pattern}\" to pattern and rename to \"{name}\""
            ),
            Self::EnvMigrated { from, to } => write!(f, "migrate env \"{from}\" to \"{to}\""),
            Self::EnvFlag { from, to } => {
                write!(f, "set env \"{to}\" to \"true\" since \"{from}\" is set")
            }
            Self::NotMigrated { key } => {
                write!(f, "option \"{key}\" found in source config but not migrated")
            }
        }
    }
}

impl Serialize for ChangeEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Ordered, append-only record of changes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChangeLog(Vec<ChangeEntry>);

impl ChangeLog {
    /// Create an empty log
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry
    #[inline]
    pub fn push(&mut self, entry: ChangeEntry) {
        self.0.push(entry);
    }

    /// Append every entry of another log
    #[inline]
    pub fn extend(&mut self, other: ChangeLog) {
        self.0.extend(other.0);
    }

    /// Entries in order
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[ChangeEntry] {
        &self.0
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if nothing was logged
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rendered lines
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    /// Render as a pretty-printed JSON array of strings
    #[must_use]
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.lines()).unwrap_or_else(|_| String::from("[]"))
    }
}

impl From<Vec<ChangeEntry>> for ChangeLog {
    fn from(entries: Vec<ChangeEntry>) -> Self {
        Self(entries)
    }
}

impl IntoIterator for ChangeLog {
    type Item = ChangeEntry;
    type IntoIter = std::vec::IntoIter<ChangeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(s: &str) -> KeyPath {
        s.parse().unwrap()
    }

    #[test]
    fn migrated_line_format() {
        let entry = ChangeEntry::Migrated {
            from: "token_hmac_secret_key".into(),
            to: "client.token.hmac_secret_key".into(),
        };
        assert_eq!(
            entry.to_string(),
            "migrate value from \"token_hmac_secret_key\" to path \"client.token.hmac_secret_key\""
        );
    }

    #[test]
    fn rename_with_conversion_is_one_line() {
        let entry = ChangeEntry::Renamed {
            scope: ScopeLabel::Config,
            from: key("history_lifetime"),
            to: key("history_ttl"),
            converted: Some((json!(30), json!("30s"))),
        };
        assert_eq!(
            entry.to_string(),
            "config: rename option \"history_lifetime\" to \"history_ttl\" and convert 30 to \"30s\""
        );
    }

    #[test]
    fn not_migrated_line_format() {
        let entry = ChangeEntry::NotMigrated { key: "foo".into() };
        assert_eq!(entry.to_string(), "option \"foo\" found in source config but not migrated");
    }

    #[test]
    fn log_serializes_as_string_array() {
        let mut log = ChangeLog::new();
        log.push(ChangeEntry::Removed {
            scope: ScopeLabel::Config,
            key: key("redis_read_timeout"),
        });
        assert_eq!(
            serde_json::to_value(&log).unwrap(),
            json!(["config: remove option \"redis_read_timeout\""])
        );
        assert_eq!(log.to_json_pretty(), "[\n  \"config: remove option \\\"redis_read_timeout\\\"\"\n]");
    }

    #[test]
    fn extend_concatenates_in_order() {
        let mut a = ChangeLog::from(vec![ChangeEntry::NotMigrated { key: "a".into() }]);
        let b = ChangeLog::from(vec![ChangeEntry::NotMigrated { key: "b".into() }]);
        a.extend(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.lines()[1], "option \"b\" found in source config but not migrated");
    }
}
