//! Rename, remove, set-if-absent and duration rules

use confmig_document::{Document, KeyPath, Value};
use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::Applied;
use crate::error::RuleError;
use crate::log::{ChangeEntry, ChangeLog};
use crate::scope::ScopeLabel;

/// Conversion applied to a value while it is renamed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueConversion {
    /// Numeric seconds to a duration string
    Duration,
    /// Boolean inversion (`disabled` → `enabled`)
    Negate,
}

impl ValueConversion {
    /// Convert a value, or `None` if the conversion does not apply to it
    #[must_use]
    pub fn convert(self, value: &Value) -> Option<Value> {
        match (self, value) {
            (Self::Duration, Value::Number(n)) => seconds_to_duration(n).map(Value::String),
            (Self::Negate, Value::Bool(b)) => Some(Value::Bool(!b)),
            _ => None,
        }
    }
}

/// Render numeric seconds as a duration string
///
/// Integral values keep second precision (`10` → `"10s"`). Fractional values
/// are scaled to milliseconds (`2.5` → `"2500ms"`); float noise below a
/// millionth of a millisecond is rounded away.
#[must_use]
pub fn seconds_to_duration(n: &Number) -> Option<String> {
    if let Some(i) = n.as_i64() {
        return Some(format!("{i}s"));
    }
    if let Some(u) = n.as_u64() {
        return Some(format!("{u}s"));
    }
    let f = n.as_f64()?;
    if !f.is_finite() {
        return None;
    }
    if f.fract() == 0.0 {
        return Some(format!("{f:.0}s"));
    }
    let ms = f * 1000.0;
    let rounded = ms.round();
    if (ms - rounded).abs() < 1e-6 {
        Some(format!("{rounded:.0}ms"))
    } else {
        Some(format!("{ms}ms"))
    }
}

/// Move `from` to `to`
///
/// Fires only when `to` is undefined and `from` is defined, so an already
/// populated destination is never overwritten and `from` is then left alone.
/// A value the duration conversion does not apply to moves unchanged.
///
/// # Errors
/// Returns [`RuleError::Ambiguous`] when a negating rename meets a value that
/// is not a boolean.
pub fn rename(
    mut scope: Document,
    label: &ScopeLabel,
    from: &KeyPath,
    to: &KeyPath,
    convert: Option<ValueConversion>,
) -> Result<Applied, RuleError> {
    if scope.is_defined(to) {
        return Ok(Applied::unchanged(scope));
    }
    let Some(value) = scope.get(from).cloned() else {
        return Ok(Applied::unchanged(scope));
    };

    let converted = convert.and_then(|c| c.convert(&value));
    if convert == Some(ValueConversion::Negate) && converted.is_none() {
        return Err(RuleError::ambiguous(
            label.clone(),
            from.to_string(),
            format!("\"{from}\" is {value}, not a boolean, and cannot become \"{to}\""),
        ));
    }
    let written = converted.clone().unwrap_or_else(|| value.clone());
    if let Err(e) = scope.try_insert(to, written) {
        tracing::warn!(scope = %label, error = %e, "rename skipped");
        return Ok(Applied::unchanged(scope));
    }
    scope.remove(from);

    tracing::debug!(scope = %label, %from, %to, "renamed option");
    let mut log = ChangeLog::new();
    log.push(ChangeEntry::Renamed {
        scope: label.clone(),
        from: from.clone(),
        to: to.clone(),
        converted: converted.map(|new| (value, new)),
    });
    Ok(Applied::new(scope, log))
}

/// Delete `key` if present
pub fn remove(mut scope: Document, label: &ScopeLabel, key: &KeyPath) -> Applied {
    if scope.remove(key).is_none() {
        return Applied::unchanged(scope);
    }
    let mut log = ChangeLog::new();
    log.push(ChangeEntry::Removed {
        scope: label.clone(),
        key: key.clone(),
    });
    Applied::new(scope, log)
}

/// Write `value` at `key` if nothing is there yet
pub fn set_if_absent(mut scope: Document, label: &ScopeLabel, key: &KeyPath, value: &Value) -> Applied {
    if scope.is_defined(key) {
        return Applied::unchanged(scope);
    }
    if let Err(e) = scope.try_insert(key, value.clone()) {
        tracing::warn!(scope = %label, error = %e, "default skipped");
        return Applied::unchanged(scope);
    }
    let mut log = ChangeLog::new();
    log.push(ChangeEntry::DefaultSet {
        scope: label.clone(),
        key: key.clone(),
        value: value.clone(),
    });
    Applied::new(scope, log)
}

/// Rewrite a numeric `key` as a duration string
///
/// Strings (already durations) and other types are left untouched.
pub fn to_duration(mut scope: Document, label: &ScopeLabel, key: &KeyPath) -> Applied {
    let Some(Value::Number(n)) = scope.get(key) else {
        return Applied::unchanged(scope);
    };
    let from = Value::Number(n.clone());
    let Some(duration) = seconds_to_duration(n) else {
        return Applied::unchanged(scope);
    };
    if let Err(e) = scope.try_insert(key, Value::String(duration.clone())) {
        tracing::warn!(scope = %label, error = %e, "duration conversion skipped");
        return Applied::unchanged(scope);
    }
    let mut log = ChangeLog::new();
    log.push(ChangeEntry::DurationConverted {
        scope: label.clone(),
        key: key.clone(),
        from,
        to: duration,
    });
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

    fn duration(v: Value) -> Option<String> {
        match v {
            Value::Number(n) => seconds_to_duration(&n),
            _ => None,
        }
    }

    #[test]
    fn durations() {
        assert_eq!(duration(json!(10)).as_deref(), Some("10s"));
        assert_eq!(duration(json!(0)).as_deref(), Some("0s"));
        assert_eq!(duration(json!(2.5)).as_deref(), Some("2500ms"));
        assert_eq!(duration(json!(1.1)).as_deref(), Some("1100ms"));
        assert_eq!(duration(json!(0.25)).as_deref(), Some("250ms"));
        assert_eq!(duration(json!(10.0)).as_deref(), Some("10s"));
        assert_eq!(duration(json!(0.0625)).as_deref(), Some("62.5ms"));
    }

    #[test]
    fn rename_moves_value() {
        let applied = rename(
            doc(json!({"secret": "k"})),
            &ScopeLabel::Config,
            &key("secret"),
            &key("token_hmac_secret_key"),
            None,
        )
        .unwrap();
        assert_eq!(applied.scope.into_value(), json!({"token_hmac_secret_key": "k"}));
        assert_eq!(
            applied.log.lines(),
            vec!["config: rename option \"secret\" to \"token_hmac_secret_key\""]
        );
    }

    #[test]
    fn rename_never_overwrites() {
        let before = doc(json!({"secret": "old", "token_hmac_secret_key": "new"}));
        let applied = rename(
            before.clone(),
            &ScopeLabel::Config,
            &key("secret"),
            &key("token_hmac_secret_key"),
            None,
        )
        .unwrap();
        assert_eq!(applied.scope, before);
        assert!(applied.log.is_empty());
    }

    #[test]
    fn rename_into_nested_path() {
        let applied = rename(
            doc(json!({"static_http_headers": {"X-A": "1"}})),
            &ScopeLabel::Config,
            &key("static_http_headers"),
            &key("http.static_headers"),
            None,
        )
        .unwrap();
        assert_eq!(
            applied.scope.into_value(),
            json!({"http": {"static_headers": {"X-A": "1"}}})
        );
    }

    #[test]
    fn rename_with_negation() {
        let applied = rename(
            doc(json!({"disabled": true})),
            &ScopeLabel::Config,
            &key("disabled"),
            &key("enabled"),
            Some(ValueConversion::Negate),
        )
        .unwrap();
        assert_eq!(applied.scope.into_value(), json!({"enabled": false}));
    }

    #[test]
    fn rename_with_negation_rejects_non_booleans() {
        for value in [json!("true"), json!(null), json!(0)] {
            let err = rename(
                doc(json!({"disabled": value})),
                &ScopeLabel::Entry {
                    kind: "consumer".to_string(),
                    name: Some("kafka".to_string()),
                    index: 0,
                },
                &key("disabled"),
                &key("enabled"),
                Some(ValueConversion::Negate),
            )
            .unwrap_err();
            assert!(matches!(err, RuleError::Ambiguous { ref option, .. } if option == "disabled"));
            assert!(err.to_string().starts_with("consumer \"kafka\": \"disabled\" is "));
        }
    }

    #[test]
    fn rename_duration_keeps_string_values() {
        let applied = rename(
            doc(json!({"history_lifetime": "1m"})),
            &ScopeLabel::Config,
            &key("history_lifetime"),
            &key("history_ttl"),
            Some(ValueConversion::Duration),
        )
        .unwrap();
        assert_eq!(applied.scope.into_value(), json!({"history_ttl": "1m"}));
        assert_eq!(
            applied.log.lines(),
            vec!["config: rename option \"history_lifetime\" to \"history_ttl\""]
        );
    }

    #[test]
    fn rename_blocked_by_scalar_parent_is_noop() {
        let before = doc(json!({"tls_key": "k", "http": true}));
        let applied = rename(
            before.clone(),
            &ScopeLabel::Config,
            &key("tls_key"),
            &key("http.tls.key"),
            None,
        )
        .unwrap();
        assert_eq!(applied.scope, before);
        assert!(applied.log.is_empty());
    }

    #[test]
    fn remove_logs_only_when_present() {
        let applied = remove(doc(json!({"a": 1})), &ScopeLabel::Config, &key("b"));
        assert!(applied.log.is_empty());

        let applied = remove(doc(json!({"a": 1})), &ScopeLabel::Config, &key("a"));
        assert!(applied.scope.is_empty());
        assert_eq!(applied.log.lines(), vec!["config: remove option \"a\""]);
    }

    #[test]
    fn set_if_absent_respects_falsy_values() {
        let applied = set_if_absent(
            doc(json!({"allowed_origins": null})),
            &ScopeLabel::Config,
            &key("allowed_origins"),
            &json!([]),
        );
        assert_eq!(applied.scope.into_value(), json!({"allowed_origins": null}));
        assert!(applied.log.is_empty());

        let applied = set_if_absent(Document::new(), &ScopeLabel::Config, &key("allowed_origins"), &json!([]));
        assert_eq!(applied.scope.into_value(), json!({"allowed_origins": []}));
        assert_eq!(applied.log.lines(), vec!["config: set \"allowed_origins\" to []"]);
    }

    #[test]
    fn to_duration_converts_numbers_only() {
        let applied = to_duration(
            doc(json!({"a": 25, "b": "25s", "c": true})),
            &ScopeLabel::Config,
            &key("a"),
        );
        assert_eq!(applied.scope.get(&key("a")), Some(&json!("25s")));
        assert_eq!(
            applied.log.lines(),
            vec!["config: convert \"a\" from 25 to duration \"25s\""]
        );

        for k in ["b", "c", "missing"] {
            let applied = to_duration(doc(json!({"b": "25s", "c": true})), &ScopeLabel::Config, &key(k));
            assert!(applied.log.is_empty());
        }
    }
}
