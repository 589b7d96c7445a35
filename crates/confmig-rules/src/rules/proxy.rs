//! Proxy option rules
//!
//! Two generations of change: first the implicit "forward every header"
//! behavior became an explicit allow-list, then the flat `proxy_*` options
//! moved into one nested object per proxy kind.

use confmig_document::{Document, KeyPath, Value};
use serde::{Deserialize, Serialize};

use super::{Applied, Context};
use crate::log::{ChangeEntry, ChangeLog};
use crate::scope::ScopeLabel;

/// Write the proxy header allow-list if any proxy option is configured
///
/// The list is `defaults` followed by the headers of the legacy `extra`
/// option, without duplicates. `extra` is then removed.
pub fn proxy_header_defaults(
    mut scope: Document,
    label: &ScopeLabel,
    prefix: &str,
    target: &KeyPath,
    defaults: &[String],
    extra: Option<&KeyPath>,
) -> Applied {
    if scope.is_defined(target) || !scope.keys().any(|k| k.starts_with(prefix)) {
        return Applied::unchanged(scope);
    }

    let mut headers: Vec<String> = defaults.to_vec();
    if let Some(Value::Array(items)) = extra.and_then(|e| scope.get(e)) {
        for header in items.iter().filter_map(Value::as_str) {
            if !headers.iter().any(|h| h.eq_ignore_ascii_case(header)) {
                headers.push(header.to_string());
            }
        }
    }

    let list = Value::Array(headers.iter().cloned().map(Value::String).collect());
    if let Err(e) = scope.try_insert(target, list) {
        tracing::warn!(scope = %label, error = %e, "proxy header defaults skipped");
        return Applied::unchanged(scope);
    }

    let mut log = ChangeLog::new();
    log.push(ChangeEntry::ProxyHeaders {
        scope: label.clone(),
        target: target.clone(),
        headers,
    });
    if let Some(extra) = extra {
        if scope.remove(extra).is_some() {
            log.push(ChangeEntry::Removed {
                scope: label.clone(),
                key: extra.clone(),
            });
        }
    }
    Applied::new(scope, log)
}

/// One proxy kind whose flat legacy options move into a nested object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyHoist {
    /// Kind name as used in legacy keys (`connect`, `sub_refresh`, ...)
    pub kind: String,
    /// Nested destination object
    pub target: KeyPath,
    /// Flags set to `true` when the proxy was configured
    #[serde(default)]
    pub enable: Vec<KeyPath>,
}

impl ProxyHoist {
    /// Legacy endpoint option; its presence means the proxy was in use
    #[must_use]
    pub fn endpoint_key(&self) -> KeyPath {
        KeyPath::single(format!("proxy_{}_endpoint", self.kind))
    }

    /// Legacy timeout option
    #[must_use]
    pub fn timeout_key(&self) -> KeyPath {
        KeyPath::single(format!("proxy_{}_timeout", self.kind))
    }
}

/// Copy the flat legacy options of one proxy kind into `hoist.target`
///
/// Reads from the untouched source document, writes into `scope` without
/// overwriting anything, and reports the legacy keys it carried over.
pub fn hoist_proxy(mut scope: Document, label: &ScopeLabel, hoist: &ProxyHoist, ctx: &Context<'_>) -> Applied {
    let endpoint = hoist.endpoint_key();
    if !ctx.source.is_defined(&endpoint) {
        return Applied::unchanged(scope);
    }

    let mut moves: Vec<(KeyPath, KeyPath)> = vec![
        (endpoint, hoist.target.child("endpoint")),
        (hoist.timeout_key(), hoist.target.child("timeout")),
    ];
    moves.extend(
        ctx.hoist_fields
            .iter()
            .map(|(legacy, sub)| (KeyPath::single(legacy.clone()), hoist.target.join(sub))),
    );

    let mut log = ChangeLog::new();
    let mut consumed = Vec::new();
    for (from, to) in moves {
        let Some(value) = ctx.source.get(&from) else {
            continue;
        };
        consumed.push(from.clone());
        if scope.is_defined(&to) {
            continue;
        }
        match scope.try_insert(&to, value.clone()) {
            Ok(()) => log.push(ChangeEntry::Hoisted { from, to }),
            Err(e) => tracing::warn!(scope = %label, error = %e, "hoist skipped"),
        }
    }

    for flag in &hoist.enable {
        if scope.is_defined(flag) || scope.try_insert(flag, Value::Bool(true)).is_err() {
            continue;
        }
        log.push(ChangeEntry::DefaultSet {
            scope: label.clone(),
            key: flag.clone(),
            value: Value::Bool(true),
        });
    }

    tracing::debug!(kind = %hoist.kind, changes = log.len(), "hoisted proxy options");
    Applied {
        scope,
        log,
        consumed,
    }
}
