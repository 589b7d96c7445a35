//! Structural normalizer rules
//!
//! Each rule takes ownership of one scope, returns the rewritten scope plus the
//! log entries describing what it did, and never touches anything else. The
//! caller threads scopes from one rule to the next and concatenates the logs.

use confmig_document::{Document, KeyPath, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::RuleError;
use crate::log::ChangeLog;
use crate::scope::{ScopeLabel, ScopeSelector};

mod basic;
mod namespace;
mod permissions;
mod proxy;
mod redis;

pub use basic::{remove, rename, seconds_to_duration, set_if_absent, to_duration, ValueConversion};
pub use namespace::{pattern_name, pattern_split};
pub use permissions::{capability, force, is_truthy, Capability};
pub use proxy::{hoist_proxy, proxy_header_defaults, ProxyHoist};
pub use redis::{redis_address, DEFAULT_REDIS_HOST, DEFAULT_REDIS_PORT};

/// Result of applying a rule to one scope
#[derive(Debug, Clone, PartialEq, Default)]
#[must_use]
pub struct Applied {
    /// The rewritten scope
    pub scope: Document,
    /// Changes made, in order
    pub log: ChangeLog,
    /// Source options this rule carried over, so they are not reported as lost
    pub consumed: Vec<KeyPath>,
}

impl Applied {
    /// Scope passed through untouched
    #[inline]
    pub fn unchanged(scope: Document) -> Self {
        Self {
            scope,
            log: ChangeLog::new(),
            consumed: Vec::new(),
        }
    }

    /// Scope with accompanying log
    #[inline]
    pub fn new(scope: Document, log: ChangeLog) -> Self {
        Self {
            scope,
            log,
            consumed: Vec::new(),
        }
    }
}

/// Read-only inputs some rules need besides their scope
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    /// The untouched source document
    pub source: &'a Document,
    /// Shared legacy proxy options and their path inside a proxy object
    pub hoist_fields: &'a IndexMap<String, KeyPath>,
}

impl<'a> Context<'a> {
    /// Create context
    #[inline]
    #[must_use]
    pub fn new(source: &'a Document, hoist_fields: &'a IndexMap<String, KeyPath>) -> Self {
        Self {
            source,
            hoist_fields,
        }
    }
}

/// A normalizer rule, as written in migration plan files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Rule {
    /// Move `from` to `to` when `to` is free
    Rename {
        /// Old key
        from: KeyPath,
        /// New key
        to: KeyPath,
        /// Conversion applied to the moved value
        #[serde(default)]
        convert: Option<ValueConversion>,
    },

    /// Delete an option
    Remove {
        /// Key to delete
        key: KeyPath,
    },

    /// Write a default when nothing is set
    SetIfAbsent {
        /// Key to write
        key: KeyPath,
        /// Default value
        value: Value,
    },

    /// Turn numeric seconds into a duration string
    ToDuration {
        /// Key to convert
        key: KeyPath,
    },

    /// Zip comma-separated host and port lists into addresses
    RedisAddress {
        /// Legacy host option
        #[serde(default = "redis_host_key")]
        host: KeyPath,
        /// Legacy port option
        #[serde(default = "redis_port_key")]
        port: KeyPath,
        /// Address list option
        #[serde(default = "redis_address_key")]
        target: KeyPath,
    },

    /// Synthesize the proxy header allow-list once any proxy is configured
    ProxyHeaderDefaults {
        /// Prefix that marks proxy options
        prefix: String,
        /// Allow-list option
        target: KeyPath,
        /// Headers that used to be proxied implicitly
        defaults: Vec<String>,
        /// Legacy option holding additional headers
        #[serde(default)]
        extra: Option<KeyPath>,
    },

    /// Copy flat legacy proxy options into a nested per-kind proxy object
    HoistProxy(ProxyHoist),

    /// Grant split permissions in place of an old combined toggle
    Capability(Capability),

    /// Replace a legacy `true` toggle with a forced option
    Force {
        /// Legacy toggle
        from: KeyPath,
        /// Forced option
        to: KeyPath,
    },

    /// Move a channel pattern out of the entry name
    PatternSplit {
        /// Field holding the name
        #[serde(default = "name_key")]
        field: KeyPath,
        /// Field receiving the pattern
        #[serde(default = "pattern_key")]
        pattern_field: KeyPath,
    },
}

fn redis_host_key() -> KeyPath {
    KeyPath::single("redis_host")
}

fn redis_port_key() -> KeyPath {
    KeyPath::single("redis_port")
}

fn redis_address_key() -> KeyPath {
    KeyPath::single("redis_address")
}

fn name_key() -> KeyPath {
    KeyPath::single("name")
}

fn pattern_key() -> KeyPath {
    KeyPath::single("pattern")
}

impl Rule {
    /// Short name, as written in plan files
    #[must_use]
    pub fn op(&self) -> &'static str {
        match self {
            Self::Rename { .. } => "rename",
            Self::Remove { .. } => "remove",
            Self::SetIfAbsent { .. } => "set_if_absent",
            Self::ToDuration { .. } => "to_duration",
            Self::RedisAddress { .. } => "redis_address",
            Self::ProxyHeaderDefaults { .. } => "proxy_header_defaults",
            Self::HoistProxy(_) => "hoist_proxy",
            Self::Capability(_) => "capability",
            Self::Force { .. } => "force",
            Self::PatternSplit { .. } => "pattern_split",
        }
    }

    /// Apply to one scope
    ///
    /// # Errors
    /// Returns [`RuleError::Ambiguous`] when the rule refuses to guess.
    pub fn apply(
        &self,
        scope: Document,
        label: &ScopeLabel,
        ctx: &Context<'_>,
    ) -> Result<Applied, RuleError> {
        let applied = match self {
            Self::Rename { from, to, convert } => rename(scope, label, from, to, *convert)?,
            Self::Remove { key } => remove(scope, label, key),
            Self::SetIfAbsent { key, value } => set_if_absent(scope, label, key, value),
            Self::ToDuration { key } => to_duration(scope, label, key),
            Self::RedisAddress { host, port, target } => {
                redis_address(scope, label, host, port, target)?
            }
            Self::ProxyHeaderDefaults {
                prefix,
                target,
                defaults,
                extra,
            } => proxy_header_defaults(scope, label, prefix, target, defaults, extra.as_ref()),
            Self::HoistProxy(hoist) => hoist_proxy(scope, label, hoist, ctx),
            Self::Capability(cap) => capability(scope, label, cap),
            Self::Force { from, to } => force(scope, label, from, to),
            Self::PatternSplit {
                field,
                pattern_field,
            } => pattern_split(scope, label, field, pattern_field),
        };
        Ok(applied)
    }
}

/// One rule bound to the scopes it runs on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Scopes, applied in order
    #[serde(default = "root_only")]
    pub scopes: Vec<ScopeSelector>,

    /// The rule
    #[serde(flatten)]
    pub rule: Rule,
}

fn root_only() -> Vec<ScopeSelector> {
    vec![ScopeSelector::Root]
}

impl Step {
    /// Rule applied to the document root only
    #[inline]
    #[must_use]
    pub fn root(rule: Rule) -> Self {
        Self {
            scopes: root_only(),
            rule,
        }
    }

    /// Rule applied to the given scopes
    #[inline]
    #[must_use]
    pub fn scoped(scopes: Vec<ScopeSelector>, rule: Rule) -> Self {
        Self { scopes, rule }
    }

    /// Apply to every selected scope of a document
    ///
    /// # Errors
    /// Propagates the first rule error; nothing is returned in that case.
    pub fn apply(&self, document: Document, ctx: &Context<'_>) -> Result<Applied, RuleError> {
        let mut document = document;
        let mut log = ChangeLog::new();
        let mut consumed = Vec::new();

        for selector in &self.scopes {
            let applied = match selector {
                ScopeSelector::Root => self.rule.apply(document, &ScopeLabel::Config, ctx)?,
                ScopeSelector::Each(path) => apply_each(&self.rule, document, path, ctx)?,
            };
            document = applied.scope;
            log.extend(applied.log);
            consumed.extend(applied.consumed);
        }

        Ok(Applied {
            scope: document,
            log,
            consumed,
        })
    }
}

fn apply_each(
    rule: &Rule,
    mut document: Document,
    path: &KeyPath,
    ctx: &Context<'_>,
) -> Result<Applied, RuleError> {
    let items = match document.get(path) {
        Some(Value::Array(items)) => items.clone(),
        _ => return Ok(Applied::unchanged(document)),
    };

    let mut log = ChangeLog::new();
    let mut consumed = Vec::new();
    let mut rewritten = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(map) => {
                let entry = Document::from(map);
                let label = ScopeLabel::entry(path, index, &entry);
                let applied = rule.apply(entry, &label, ctx)?;
                log.extend(applied.log);
                consumed.extend(applied.consumed);
                rewritten.push(applied.scope.into_value());
            }
            other => rewritten.push(other),
        }
    }

    if let Err(e) = document.try_insert(path, Value::Array(rewritten)) {
        tracing::warn!(error = %e, "could not write back rewritten entries");
    }
    Ok(Applied {
        scope: document,
        log,
        consumed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn step_applies_to_root_and_each_entry() {
        let step = Step::scoped(
            vec![
                ScopeSelector::Root,
                "namespaces[*]".parse().unwrap(),
            ],
            Rule::Rename {
                from: KeyPath::single("history_lifetime"),
                to: KeyPath::single("history_ttl"),
                convert: Some(ValueConversion::Duration),
            },
        );
        let source = doc(json!({
            "history_lifetime": 60,
            "namespaces": [
                {"name": "chat", "history_lifetime": 1.5},
                "not a mapping",
                {"name": "feed"}
            ]
        }));
        let fields = IndexMap::new();
        let ctx = Context::new(&source, &fields);

        let applied = step.apply(source.clone(), &ctx).unwrap();
        assert_eq!(
            applied.scope.into_value(),
            json!({
                "namespaces": [
                    {"name": "chat", "history_ttl": "1500ms"},
                    "not a mapping",
                    {"name": "feed"}
                ],
                "history_ttl": "60s"
            })
        );
        assert_eq!(
            applied.log.lines(),
            vec![
                "config: rename option \"history_lifetime\" to \"history_ttl\" and convert 60 to \"60s\"",
                "namespace \"chat\": rename option \"history_lifetime\" to \"history_ttl\" and convert 1.5 to \"1500ms\"",
            ]
        );
    }

    #[test]
    fn step_missing_array_is_noop() {
        let step = Step::scoped(
            vec!["channel.namespaces[*]".parse().unwrap()],
            Rule::Remove {
                key: KeyPath::single("x"),
            },
        );
        let source = doc(json!({"x": 1}));
        let fields = IndexMap::new();
        let applied = step.apply(source.clone(), &Context::new(&source, &fields)).unwrap();
        assert_eq!(applied.scope, source);
        assert!(applied.log.is_empty());
    }

    #[test]
    fn steps_deserialize_from_toml() {
        #[derive(Deserialize)]
        struct Program {
            steps: Vec<Step>,
        }

        let program: Program = toml::from_str(
            r#"
            [[steps]]
            op = "rename"
            from = "secret"
            to = "token_hmac_secret_key"

            [[steps]]
            op = "set_if_absent"
            key = "allowed_origins"
            value = []

            [[steps]]
            op = "capability"
            scopes = ["$", "namespaces[*]"]
            toggle = "presence"
            unless = "presence_disable_for_client"
            grants = ["allow_presence_for_subscriber"]

            [[steps]]
            op = "redis_address"
            "#,
        )
        .unwrap();

        assert_eq!(program.steps.len(), 4);
        assert_eq!(program.steps[0].rule.op(), "rename");
        assert_eq!(program.steps[0].scopes, vec![ScopeSelector::Root]);
        assert_eq!(
            program.steps[1].rule,
            Rule::SetIfAbsent {
                key: KeyPath::single("allowed_origins"),
                value: json!([])
            }
        );
        assert_eq!(program.steps[2].scopes.len(), 2);
        assert_eq!(
            program.steps[3].rule,
            Rule::RedisAddress {
                host: KeyPath::single("redis_host"),
                port: KeyPath::single("redis_port"),
                target: KeyPath::single("redis_address"),
            }
        );
    }
}
