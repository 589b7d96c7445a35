//! Environment-variable converter
//!
//! The env form of a configuration is flat: each mapping entry is applied by
//! deriving the legacy and new variable names from its two paths. Output
//! follows mapping-table order, not input order.

use std::collections::HashSet;

use confmig_document::{env_key, EnvSet, KeyPath};
use confmig_rules::{ChangeEntry, ChangeLog};
use indexmap::IndexMap;

use crate::settings::Settings;
use crate::table::MappingTable;

/// Output of an env conversion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Converted {
    /// Converted variables
    pub env: EnvSet,
    /// Changes made
    pub log: ChangeLog,
}

impl Converted {
    /// Converted variables as `KEY="value"` lines
    #[must_use]
    pub fn text(&self) -> String {
        self.env.to_text()
    }
}

/// Table-driven env converter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConverter {
    prefix: String,
    report_unmapped: bool,
}

impl Default for EnvConverter {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl EnvConverter {
    /// Create converter for a product prefix
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            report_unmapped: true,
        }
    }

    /// Create converter from tool settings
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.env_prefix.clone()).with_unmapped_report(settings.report_unmapped_env)
    }

    /// With reporting of variables no mapping consumed
    #[inline]
    #[must_use]
    pub fn with_unmapped_report(mut self, enabled: bool) -> Self {
        self.report_unmapped = enabled;
        self
    }

    /// Environment prefix
    #[inline]
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Convert env text through a mapping table
    #[must_use]
    pub fn convert(&self, text: &str, table: &MappingTable) -> Converted {
        self.convert_with_flags(text, table, &IndexMap::new())
    }

    /// Convert env text through a mapping table, then synthesize flags
    ///
    /// `flags` maps a legacy path to a flag path; when the legacy variable is
    /// set, the flag variable is written as `"true"` unless the table already
    /// produced it.
    #[must_use]
    pub fn convert_with_flags(&self, text: &str, table: &MappingTable, flags: &IndexMap<String, String>) -> Converted {
        let input = EnvSet::parse(text);
        let mut env = EnvSet::new();
        let mut log = ChangeLog::new();
        let mut consumed: HashSet<String> = HashSet::new();

        for (from, to) in table.entries() {
            let old = env_key(&self.prefix, &from);
            let Some(value) = input.get(&old) else {
                continue;
            };
            consumed.insert(old.clone());
            let new = env_key(&self.prefix, &to);
            if env.contains(&new) {
                tracing::debug!(%old, %new, "env destination already set, keeping first value");
                continue;
            }
            env.insert(new.clone(), value);
            log.push(ChangeEntry::EnvMigrated { from: old, to: new });
        }

        for (legacy, flag) in flags {
            let (Ok(legacy), Ok(flag)) = (legacy.parse::<KeyPath>(), flag.parse::<KeyPath>()) else {
                tracing::warn!(%legacy, %flag, "skipping malformed env flag entry");
                continue;
            };
            let old = env_key(&self.prefix, &legacy);
            if !input.contains(&old) {
                continue;
            }
            consumed.insert(old.clone());
            let new = env_key(&self.prefix, &flag);
            if env.contains(&new) {
                continue;
            }
            env.insert(new.clone(), "true");
            log.push(ChangeEntry::EnvFlag { from: old, to: new });
        }

        if self.report_unmapped {
            for (key, _) in input.iter().filter(|(key, _)| !consumed.contains(*key)) {
                log.push(ChangeEntry::NotMigrated { key: key.to_string() });
            }
        }

        tracing::debug!(input = input.len(), output = env.len(), "converted env");
        Converted { env, log }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(entries: &[(&str, &str)]) -> MappingTable {
        entries.iter().copied().collect()
    }

    #[test]
    fn output_follows_table_order() {
        let text = "CENTRIFUGO_PORT=\"8000\"\nCENTRIFUGO_TOKEN_HMAC_SECRET_KEY='k'\n";
        let converted = EnvConverter::default().convert(
            text,
            &table(&[
                ("token_hmac_secret_key", "client.token.hmac_secret_key"),
                ("port", "http_server.port"),
            ]),
        );
        assert_eq!(
            converted.text(),
            "CENTRIFUGO_CLIENT_TOKEN_HMAC_SECRET_KEY=\"k\"\nCENTRIFUGO_HTTP_SERVER_PORT=\"8000\""
        );
        assert_eq!(
            converted.log.lines(),
            vec![
                "migrate env \"CENTRIFUGO_TOKEN_HMAC_SECRET_KEY\" to \"CENTRIFUGO_CLIENT_TOKEN_HMAC_SECRET_KEY\"",
                "migrate env \"CENTRIFUGO_PORT\" to \"CENTRIFUGO_HTTP_SERVER_PORT\"",
            ]
        );
    }

    #[test]
    fn malformed_lines_and_absent_keys_are_silent() {
        let text = "garbage line\n\n# comment\nCENTRIFUGO_PORT=8000";
        let converted = EnvConverter::default().convert(
            text,
            &table(&[("address", "http_server.address"), ("port", "http_server.port")]),
        );
        assert_eq!(converted.text(), "CENTRIFUGO_HTTP_SERVER_PORT=\"8000\"");
        assert_eq!(converted.log.len(), 1);
    }

    #[test]
    fn unconsumed_variables_are_reported() {
        let text = "CENTRIFUGO_PORT=8000\nCENTRIFUGO_MYSTERY=1";
        let t = table(&[("port", "http_server.port")]);

        let converted = EnvConverter::default().convert(text, &t);
        assert_eq!(
            converted.log.lines()[1],
            "option \"CENTRIFUGO_MYSTERY\" found in source config but not migrated"
        );

        let converted = EnvConverter::default().with_unmapped_report(false).convert(text, &t);
        assert_eq!(converted.log.len(), 1);
    }

    #[test]
    fn flags_follow_legacy_presence() {
        let mut flags = IndexMap::new();
        flags.insert(
            "proxy_connect_endpoint".to_string(),
            "client.proxy.connect.enabled".to_string(),
        );
        let text = "CENTRIFUGO_PROXY_CONNECT_ENDPOINT=http://app/connect";
        let converted = EnvConverter::default().convert_with_flags(
            text,
            &table(&[("proxy_connect_endpoint", "client.proxy.connect.endpoint")]),
            &flags,
        );
        assert_eq!(
            converted.text(),
            "CENTRIFUGO_CLIENT_PROXY_CONNECT_ENDPOINT=\"http://app/connect\"\nCENTRIFUGO_CLIENT_PROXY_CONNECT_ENABLED=\"true\""
        );
        assert_eq!(
            converted.log.lines()[1],
            "set env \"CENTRIFUGO_CLIENT_PROXY_CONNECT_ENABLED\" to \"true\" since \"CENTRIFUGO_PROXY_CONNECT_ENDPOINT\" is set"
        );
    }

    #[test]
    fn custom_prefix() {
        let converted = EnvConverter::new("APP").convert("APP_PORT=1", &table(&[("port", "http_server.port")]));
        assert_eq!(converted.text(), "APP_HTTP_SERVER_PORT=\"1\"");
    }
}
