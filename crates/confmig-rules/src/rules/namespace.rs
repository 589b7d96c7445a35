//! Channel pattern split
//!
//! Namespaces used to be named after the channel pattern they matched
//! (`name = "/users/:id"`). The pattern now has its own field and the name
//! must be a plain identifier.

use confmig_document::{Document, KeyPath, Value};

use super::Applied;
use crate::log::{ChangeEntry, ChangeLog};
use crate::scope::ScopeLabel;

/// Identifier derived from a channel pattern
///
/// `"/users/:id"` becomes `"users:id"`: the leading slash is dropped, a slash
/// before a parameter collapses into the colon, and remaining slashes become
/// underscores.
#[must_use]
pub fn pattern_name(pattern: &str) -> String {
    pattern
        .strip_prefix('/')
        .unwrap_or(pattern)
        .replace("/:", ":")
        .replace('/', "_")
}

/// Move a pattern-shaped name into `pattern_field` and derive a plain name
///
/// Applies only when the name starts with `/` and no pattern is set yet, so a
/// second run changes nothing.
pub fn pattern_split(mut scope: Document, label: &ScopeLabel, field: &KeyPath, pattern_field: &KeyPath) -> Applied {
    if scope.is_defined(pattern_field) {
        return Applied::unchanged(scope);
    }
    let Some(Value::String(pattern)) = scope.get(field).cloned() else {
        return Applied::unchanged(scope);
    };
    if !pattern.starts_with('/') {
        return Applied::unchanged(scope);
    }

    let name = pattern_name(&pattern);
    if let Err(e) = scope.try_insert(pattern_field, Value::String(pattern.clone())) {
        tracing::warn!(scope = %label, error = %e, "pattern split skipped");
        return Applied::unchanged(scope);
    }
    if let Err(e) = scope.try_insert(field, Value::String(name.clone())) {
        tracing::warn!(scope = %label, error = %e, "pattern name not rewritten");
    }

    let mut log = ChangeLog::new();
    log.push(ChangeEntry::PatternSplit {
        scope: label.clone(),
        pattern,
        name,
    });
    Applied::new(scope, log)
}
