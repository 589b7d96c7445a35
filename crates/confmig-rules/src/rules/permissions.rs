//! Capability toggles to split permission options
//!
//! Older schemas expressed channel features as single booleans (`presence`,
//! `publish`, `position`, ...). Newer schemas split each into explicit
//! per-audience permissions, and some defaults flipped from allow to deny.

use confmig_document::{Document, KeyPath, Value};
use serde::{Deserialize, Serialize};

use super::Applied;
use crate::log::{ChangeEntry, ChangeLog};
use crate::scope::ScopeLabel;

/// Grant permissions when a legacy toggle (and its guards) allow it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// Legacy toggle; when absent the grant is unconditional
    #[serde(default)]
    pub toggle: Option<KeyPath>,
    /// Option that must also be truthy
    #[serde(default)]
    pub when: Option<KeyPath>,
    /// Option that must not be truthy
    #[serde(default)]
    pub unless: Option<KeyPath>,
    /// Permissions set to `true`
    pub grants: Vec<KeyPath>,
}

/// Truthiness of a legacy toggle value
///
/// `true`, non-zero numbers, non-empty strings and non-empty collections.
#[must_use]
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Grant each permission of `cap` that is not already set
pub fn capability(mut scope: Document, label: &ScopeLabel, cap: &Capability) -> Applied {
    let toggled = cap.toggle.as_ref().map_or(true, |t| is_truthy(scope.get(t)));
    let required = cap.when.as_ref().map_or(true, |w| is_truthy(scope.get(w)));
    let vetoed = cap.unless.as_ref().is_some_and(|u| is_truthy(scope.get(u)));
    if !toggled || !required || vetoed {
        return Applied::unchanged(scope);
    }

    let mut log = ChangeLog::new();
    for grant in &cap.grants {
        if scope.is_defined(grant) {
            continue;
        }
        if let Err(e) = scope.try_insert(grant, Value::Bool(true)) {
            tracing::warn!(scope = %label, error = %e, "grant skipped");
            continue;
        }
        log.push(ChangeEntry::Granted {
            scope: label.clone(),
            toggle: cap.toggle.clone(),
            grant: grant.clone(),
        });
    }
    Applied::new(scope, log)
}

/// Turn `from: true` into `to: true` and drop `from`
///
/// The new schema has no "off" form distinct from absence, so any other
/// value of `from` is simply removed.
pub fn force(mut scope: Document, label: &ScopeLabel, from: &KeyPath, to: &KeyPath) -> Applied {
    let Some(value) = scope.remove(from) else {
        return Applied::unchanged(scope);
    };

    let mut log = ChangeLog::new();
    if value == Value::Bool(true) && !scope.is_defined(to) && scope.try_insert(to, Value::Bool(true)).is_ok() {
        log.push(ChangeEntry::Forced {
            scope: label.clone(),
            from: from.clone(),
            to: to.clone(),
        });
    } else {
        log.push(ChangeEntry::Removed {
            scope: label.clone(),
            key: from.clone(),
        });
    }
    Applied::new(scope, log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    fn key(s: &str) -> KeyPath {
        s.parse().unwrap()
    }

    fn presence() -> Capability {
        Capability {
            toggle: Some(key("presence")),
            when: None,
            unless: Some(key("presence_disable_for_client")),
            grants: vec![
                key("allow_presence_for_subscriber"),
                key("allow_presence_for_anonymous"),
            ],
        }
    }

    #[test]
    fn truthiness() {
        assert!(is_truthy(Some(&json!(true))));
        assert!(is_truthy(Some(&json!(10))));
        assert!(is_truthy(Some(&json!("x"))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(Some(&json!([]))));
        assert!(!is_truthy(Some(&Value::Null)));
        assert!(!is_truthy(None));
    }

    #[test]
    fn presence_grants_subscriber_and_anonymous() {
        let applied = capability(doc(json!({"presence": true})), &ScopeLabel::Config, &presence());
        assert_eq!(
            applied.scope.into_value(),
            json!({
                "presence": true,
                "allow_presence_for_subscriber": true,
                "allow_presence_for_anonymous": true
            })
        );
        assert_eq!(applied.log.len(), 2);
        assert_eq!(
            applied.log.lines()[0],
            "config: \"presence\" enabled, set \"allow_presence_for_subscriber\" to true"
        );
    }

    #[test]
    fn presence_disabled_for_client_grants_nothing() {
        let before = doc(json!({"presence": true, "presence_disable_for_client": true}));
        let applied = capability(before.clone(), &ScopeLabel::Config, &presence());
        assert_eq!(applied.scope, before);
        assert!(applied.log.is_empty());
    }

    #[test]
    fn existing_grant_is_not_overwritten() {
        let applied = capability(
            doc(json!({"presence": true, "allow_presence_for_anonymous": false})),
            &ScopeLabel::Config,
            &presence(),
        );
        assert_eq!(applied.scope.get(&key("allow_presence_for_anonymous")), Some(&json!(false)));
        assert_eq!(applied.log.len(), 1);
    }

    #[test]
    fn unconditional_grant_vetoed_by_protected() {
        let cap = Capability {
            toggle: None,
            when: None,
            unless: Some(key("protected")),
            grants: vec![key("allow_subscribe_for_client")],
        };
        let applied = capability(Document::new(), &ScopeLabel::Config, &cap);
        assert_eq!(applied.scope.into_value(), json!({"allow_subscribe_for_client": true}));
        assert_eq!(applied.log.lines(), vec!["config: set \"allow_subscribe_for_client\" to true"]);

        let applied = capability(doc(json!({"protected": true})), &ScopeLabel::Config, &cap);
        assert!(applied.log.is_empty());
    }

    #[test]
    fn when_guard_must_hold() {
        let cap = Capability {
            toggle: Some(key("publish")),
            when: Some(key("subscribe_to_publish")),
            unless: None,
            grants: vec![key("allow_publish_for_subscriber")],
        };
        let applied = capability(doc(json!({"publish": true})), &ScopeLabel::Config, &cap);
        assert!(applied.log.is_empty());

        let applied = capability(
            doc(json!({"publish": true, "subscribe_to_publish": true})),
            &ScopeLabel::Config,
            &cap,
        );
        assert_eq!(applied.log.len(), 1);
    }

    #[test]
    fn force_true_becomes_forced_option() {
        let applied = force(
            doc(json!({"position": true})),
            &ScopeLabel::Config,
            &key("position"),
            &key("force_positioning"),
        );
        assert_eq!(applied.scope.into_value(), json!({"force_positioning": true}));
        assert_eq!(
            applied.log.lines(),
            vec!["config: \"position\" was true, set \"force_positioning\" to true"]
        );
    }

    #[test]
    fn force_false_is_dropped() {
        let applied = force(
            doc(json!({"recover": false})),
            &ScopeLabel::Config,
            &key("recover"),
            &key("force_recovery"),
        );
        assert!(applied.scope.is_empty());
        assert_eq!(applied.log.lines(), vec!["config: remove option \"recover\""]);
    }

    #[test]
    fn force_absent_is_noop() {
        let applied = force(Document::new(), &ScopeLabel::Config, &key("recover"), &key("force_recovery"));
        assert!(applied.log.is_empty());
    }
}
