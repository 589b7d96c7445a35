//! Testing utilities for confmig workspace
//!
//! Shared fixtures and log assertions.

#![allow(missing_docs)]

use confmig_document::{Document, KeyPath, Value};
use confmig_rules::ChangeLog;
use serde_json::json;

/// Build a document from a JSON literal; panics on a non-object root
pub fn doc(value: Value) -> Document {
    Document::from_value(value).expect("fixture root must be an object")
}

pub fn path(s: &str) -> KeyPath {
    s.parse().expect("fixture path must be valid")
}

/// A v2 file using most of what v2 to v3 rewrites
pub fn v2_config() -> Document {
    doc(json!({
        "secret": "s3cr3t",
        "history_lifetime": 60,
        "history_size": 10,
        "history_recover": true,
        "client_presence_ping_interval": 25,
        "client_expired_close_delay": 2.5,
        "redis_host": "10.0.0.1,10.0.0.2",
        "redis_port": "6379,6380",
        "proxy_connect_endpoint": "http://app:8000/centrifugo/connect",
        "proxy_extra_http_headers": ["X-Tenant"],
        "namespaces": [
            {"name": "chat", "history_lifetime": 300, "history_size": 50, "history_recover": true},
            {"name": "public", "presence": true}
        ]
    }))
}

/// A v3 file exercising the capability toggles
pub fn v3_config() -> Document {
    doc(json!({
        "token_hmac_secret_key": "k",
        "client_anonymous": true,
        "presence": true,
        "anonymous": true,
        "publish": true,
        "history_size": 10,
        "history_ttl": "300s",
        "namespaces": [
            {"name": "chat", "publish": true, "subscribe_to_publish": true, "position": true, "recover": true},
            {"name": "secure", "protected": true, "presence": true, "presence_disable_for_client": true, "recover": false}
        ]
    }))
}

/// A v5 file with flat options, legacy proxies, namespaces and consumers
pub fn v5_config() -> Document {
    doc(json!({
        "port": 8000,
        "log_level": "info",
        "token_hmac_secret_key": "k",
        "allowed_origins": ["https://example.com"],
        "admin": false,
        "engine": "redis",
        "redis_address": ["127.0.0.1:6379"],
        "presence": true,
        "history_size": 0,
        "proxy_connect_endpoint": "http://app:8000/centrifugo/connect",
        "proxy_connect_timeout": "1s",
        "proxy_rpc_endpoint": "grpc://app:9000",
        "proxy_http_headers": ["Cookie", "Authorization"],
        "proxy_grpc_metadata": ["authorization"],
        "granular_proxy_mode": false,
        "namespaces": [
            {"name": "/users/:id", "presence": true, "proxy_subscribe": true},
            {"name": "chat", "history_size": 10}
        ],
        "consumers": [
            {"name": "outbox", "type": "postgresql", "disabled": true},
            {"name": "events", "type": "kafka"}
        ]
    }))
}

/// v5 env text matching part of [`v5_config`]
pub const V5_ENV: &str = "CENTRIFUGO_PORT=\"8000\"
CENTRIFUGO_LOG_LEVEL=info
CENTRIFUGO_TOKEN_HMAC_SECRET_KEY='k'
CENTRIFUGO_PROXY_CONNECT_ENDPOINT=\"http://app:8000/centrifugo/connect\"
CENTRIFUGO_BROKER=\"nats\"
not an assignment
CENTRIFUGO_GRANULAR_PROXY_MODE=\"false\"
";

/// Assert that some log line contains `needle`
pub fn assert_logged(log: &ChangeLog, needle: &str) {
    let lines = log.lines();
    assert!(
        lines.iter().any(|line| line.contains(needle)),
        "no log line contains {needle:?}; log was:\n{}",
        lines.join("\n")
    );
}

/// Assert that `key` was reported as not migrated
pub fn assert_not_migrated(log: &ChangeLog, key: &str) {
    assert_logged(log, &format!("option \"{key}\" found in source config but not migrated"));
}

/// Assert that nothing was reported as not migrated
pub fn assert_all_migrated(log: &ChangeLog) {
    let missed: Vec<String> = log
        .lines()
        .into_iter()
        .filter(|line| line.ends_with("but not migrated"))
        .collect();
    assert!(missed.is_empty(), "unexpected unmapped options:\n{}", missed.join("\n"));
}
