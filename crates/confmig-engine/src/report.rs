//! Unmapped-key reporter

use confmig_document::{Document, KeyPath, Map, Value};
use confmig_rules::{ChangeEntry, ChangeLog};

/// Reports source options that nothing carried into the output
///
/// In recursive mode a mapping is descended whenever some covered path lies
/// strictly beneath it, and its uncovered children are reported by full
/// path. Otherwise only top-level keys are checked, and a top-level key
/// counts as covered if any covered path starts with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnmappedKeyReporter {
    recursive: bool,
}

impl Default for UnmappedKeyReporter {
    fn default() -> Self {
        Self { recursive: true }
    }
}

impl UnmappedKeyReporter {
    /// Create recursive reporter
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level-only reporter
    #[inline]
    #[must_use]
    pub fn top_level() -> Self {
        Self { recursive: false }
    }

    /// With recursion switched on or off
    #[inline]
    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Check whether nested options are inspected
    #[inline]
    #[must_use]
    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// One "not migrated" entry per uncovered source option, in document order
    pub fn report(&self, source: &Document, covered: &[KeyPath]) -> ChangeLog {
        let mut log = ChangeLog::new();
        if self.recursive {
            walk(source.as_map(), &KeyPath::root(), covered, &mut log);
        } else {
            for key in source.keys() {
                if !covered.iter().any(|c| c.first() == Some(key)) {
                    log.push(ChangeEntry::NotMigrated { key: key.to_string() });
                }
            }
        }
        if !log.is_empty() {
            tracing::info!(count = log.len(), "source options not migrated");
        }
        log
    }
}

fn walk(map: &Map<String, Value>, prefix: &KeyPath, covered: &[KeyPath], log: &mut ChangeLog) {
    for (key, value) in map {
        let path = prefix.child(key.as_str());
        if covered.contains(&path) {
            continue;
        }
        match value {
            Value::Object(children) if covered.iter().any(|c| path.is_ancestor_of(c)) => {
                walk(children, &path, covered, log);
            }
            _ => log.push(ChangeEntry::NotMigrated {
                key: path.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    fn paths(list: &[&str]) -> Vec<KeyPath> {
        list.iter().map(|p| p.parse().unwrap()).collect()
    }

    #[test]
    fn flat_reports_match_top_level_mode() {
        let source = doc(json!({"port": 1, "unknown": 2, "other": {"x": 1}}));
        let covered = paths(&["port"]);
        let recursive = UnmappedKeyReporter::new().report(&source, &covered);
        let top = UnmappedKeyReporter::top_level().report(&source, &covered);
        assert_eq!(recursive, top);
        assert_eq!(
            recursive.lines(),
            vec![
                "option \"unknown\" found in source config but not migrated",
                "option \"other\" found in source config but not migrated",
            ]
        );
    }

    #[test]
    fn nested_unmapped_children_are_reported() {
        let source = doc(json!({
            "push_notifications": {"enabled": true, "fcm_credentials": "x", "legacy_queue": "q"}
        }));
        let covered = paths(&["push_notifications.enabled", "push_notifications.fcm_credentials"]);

        let log = UnmappedKeyReporter::new().report(&source, &covered);
        assert_eq!(
            log.lines(),
            vec!["option \"push_notifications.legacy_queue\" found in source config but not migrated"]
        );

        let log = UnmappedKeyReporter::top_level().report(&source, &covered);
        assert!(log.is_empty());
    }

    #[test]
    fn whole_subtree_mapping_covers_children() {
        let source = doc(json!({"namespaces": [{"name": "a"}], "consumers": {"a": 1}}));
        let covered = paths(&["namespaces", "consumers"]);
        assert!(UnmappedKeyReporter::new().report(&source, &covered).is_empty());
    }
}
