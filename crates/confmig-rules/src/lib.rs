//! confmig Normalizer Rules
//!
//! Structural rewrites that a plain path table cannot express: renames with
//! value conversion, defaults, duration strings, Redis address lists, proxy
//! header allow-lists, per-kind proxy objects, split permissions and channel
//! patterns.
//!
//! # Core Concepts
//!
//! - [`Rule`]: One normalizer, deserializable from plan files
//! - [`Step`]: A rule bound to the scopes it runs on
//! - [`Applied`]: Rewritten scope plus the [`ChangeLog`] describing it
//! - [`ScopeSelector`]: `$` for the root, `path[*]` for each entry of a list
//!
//! Rules never mutate shared state. Each one takes a scope by value and
//! hands back the new scope, so a failed conversion leaves the caller's
//! input exactly as it was.
//!
//! # Example
//!
//! ```rust
//! use confmig_document::{Document, KeyPath};
//! use confmig_rules::{Context, Rule, Step, ValueConversion};
//! use indexmap::IndexMap;
//!
//! let source = Document::from_value(serde_json::json!({"history_lifetime": 30})).unwrap();
//! let step = Step::root(Rule::Rename {
//!     from: KeyPath::single("history_lifetime"),
//!     to: KeyPath::single("history_ttl"),
//!     convert: Some(ValueConversion::Duration),
//! });
//!
//! let fields = IndexMap::new();
//! let applied = step.apply(source.clone(), &Context::new(&source, &fields)).unwrap();
//! assert_eq!(applied.scope.get_key("history_ttl"), Some(&serde_json::json!("30s")));
//! assert_eq!(applied.log.len(), 1);
//! ```

#![warn(unreachable_pub)]

mod error;
mod log;
mod scope;

pub mod rules;

pub use error::RuleError;
pub use log::{ChangeEntry, ChangeLog};
pub use rules::{
    Applied, Capability, Context, ProxyHoist, Rule, Step, ValueConversion, DEFAULT_REDIS_HOST,
    DEFAULT_REDIS_PORT,
};
pub use scope::{ScopeLabel, ScopeSelector};
