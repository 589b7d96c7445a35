//! Redis host/port normalization
//!
//! Old configurations listed shards as two parallel comma-separated options,
//! `redis_host = "a,b"` and `redis_port = "6379,6380"`. The new schema takes a
//! single list of `host:port` addresses.

use confmig_document::{Document, KeyPath, Value};

use super::Applied;
use crate::error::RuleError;
use crate::log::{ChangeEntry, ChangeLog};
use crate::scope::ScopeLabel;

/// Host assumed when only ports are configured
pub const DEFAULT_REDIS_HOST: &str = "127.0.0.1";

/// Port assumed when only hosts are configured
pub const DEFAULT_REDIS_PORT: &str = "6379";

fn split_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Number(n) => vec![n.to_string()],
        Value::Array(items) => items.iter().flat_map(split_list).collect(),
        _ => Vec::new(),
    }
}

/// Zip `host` and `port` lists into `target`
///
/// Skipped when neither legacy option is set or `target` is already defined.
///
/// # Errors
/// Returns [`RuleError::Ambiguous`] if the lists differ in length.
pub fn redis_address(
    mut scope: Document,
    label: &ScopeLabel,
    host: &KeyPath,
    port: &KeyPath,
    target: &KeyPath,
) -> Result<Applied, RuleError> {
    let host_value = scope.get(host);
    let port_value = scope.get(port);
    if (host_value.is_none() && port_value.is_none()) || scope.is_defined(target) {
        return Ok(Applied::unchanged(scope));
    }

    let hosts = host_value.map_or_else(|| vec![DEFAULT_REDIS_HOST.to_string()], split_list);
    let ports = port_value.map_or_else(|| vec![DEFAULT_REDIS_PORT.to_string()], split_list);
    if hosts.len() != ports.len() || hosts.is_empty() {
        return Err(RuleError::ambiguous(
            label.clone(),
            host.to_string(),
            format!(
                "\"{host}\" lists {} host(s) but \"{port}\" lists {} port(s)",
                hosts.len(),
                ports.len()
            ),
        ));
    }

    let addresses: Vec<String> = hosts
        .iter()
        .zip(&ports)
        .map(|(h, p)| format!("{h}:{p}"))
        .collect();

    let list = Value::Array(addresses.iter().cloned().map(Value::String).collect());
    if let Err(e) = scope.try_insert(target, list) {
        tracing::warn!(scope = %label, error = %e, "redis address conversion skipped");
        return Ok(Applied::unchanged(scope));
    }
    scope.remove(host);
    scope.remove(port);

    let mut log = ChangeLog::new();
    log.push(ChangeEntry::RedisAddress {
        scope: label.clone(),
        host: host.clone(),
        port: port.clone(),
        target: target.clone(),
        addresses,
    });
    Ok(Applied::new(scope, log))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(value: Value) -> Result<Applied, RuleError> {
        redis_address(
            Document::from_value(value).unwrap(),
            &ScopeLabel::Config,
            &KeyPath::single("redis_host"),
            &KeyPath::single("redis_port"),
            &KeyPath::single("redis_address"),
        )
    }

    #[test]
    fn zips_parallel_lists() {
        let applied = run(json!({"redis_host": "a,b", "redis_port": "1,2"})).unwrap();
        assert_eq!(applied.scope.into_value(), json!({"redis_address": ["a:1", "b:2"]}));
        assert_eq!(
            applied.log.lines(),
            vec!["config: redis_host and redis_port converted to \"redis_address\" [a:1, b:2]"]
        );
    }

    #[test]
    fn numeric_port_and_default_host() {
        let applied = run(json!({"redis_port": 6380})).unwrap();
        assert_eq!(applied.scope.into_value(), json!({"redis_address": ["127.0.0.1:6380"]}));

        let applied = run(json!({"redis_host": "redis.local"})).unwrap();
        assert_eq!(applied.scope.into_value(), json!({"redis_address": ["redis.local:6379"]}));
    }

    #[test]
    fn mismatched_lengths_are_ambiguous() {
        let err = run(json!({"redis_host": "a,b", "redis_port": "1"})).unwrap_err();
        assert!(matches!(err, RuleError::Ambiguous { .. }));
        assert!(err.to_string().contains("too difficult to automatically convert"));
    }

    #[test]
    fn existing_address_wins() {
        let before = json!({"redis_host": "a", "redis_address": "b:1"});
        let applied = run(before.clone()).unwrap();
        assert_eq!(applied.scope.into_value(), before);
        assert!(applied.log.is_empty());
    }

    #[test]
    fn nothing_configured_is_noop() {
        let applied = run(json!({"engine": "redis"})).unwrap();
        assert!(applied.log.is_empty());
    }
}
