//! Path rewriter
//!
//! Copies every mapped value from the source document into a fresh output
//! document. The source is never modified.

use confmig_document::Document;
use confmig_rules::{ChangeEntry, ChangeLog};

use crate::report::UnmappedKeyReporter;
use crate::table::MappingTable;

/// Output of a rewrite
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rewritten {
    /// The new document
    pub document: Document,
    /// One entry per migrated value, then any unmapped-key entries
    pub log: ChangeLog,
}

/// Table-driven document rewriter
#[derive(Debug, Clone, Copy, Default)]
pub struct PathRewriter {
    reporter: UnmappedKeyReporter,
}

impl PathRewriter {
    /// Create rewriter with the default unmapped-key reporter
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a specific unmapped-key reporter
    #[inline]
    #[must_use]
    pub fn with_reporter(mut self, reporter: UnmappedKeyReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Migrate mapped values, then report source keys the table does not cover
    pub fn rewrite(&self, source: &Document, table: &MappingTable) -> Rewritten {
        let mut rewritten = Self::migrate(source, table);
        let mapped: Vec<_> = table.sources().collect();
        rewritten.log.extend(self.reporter.report(source, &mapped));
        rewritten
    }

    /// Migrate mapped values only
    ///
    /// Entries whose source path is absent are skipped silently. `false`,
    /// `0` and `null` are values like any other. A destination that is
    /// already populated by an earlier entry keeps its value.
    #[must_use]
    pub fn migrate(source: &Document, table: &MappingTable) -> Rewritten {
        let mut document = Document::new();
        let mut log = ChangeLog::new();

        for (from, to) in table.entries() {
            let Some(value) = source.get(&from) else {
                continue;
            };
            if document.is_defined(&to) {
                tracing::debug!(%from, %to, "destination already set, keeping first value");
                continue;
            }
            match document.try_insert(&to, value.clone()) {
                Ok(()) => log.push(ChangeEntry::Migrated {
                    from: from.to_string(),
                    to: to.to_string(),
                }),
                Err(e) => tracing::warn!(%from, %to, error = %e, "mapping entry skipped"),
            }
        }

        Rewritten { document, log }
    }
}
