//! Plan execution
//!
//! Runs one plan against one input:
//! 1. Table-driven plans rewrite mapped values into an empty document;
//!    table-less plans start from a copy of the input
//! 2. Normalizer steps run in plan order
//! 3. Source options nothing carried over are reported
//!
//! The input is only ever read. A rule error aborts the run and nothing is
//! returned but the error.

use confmig_document::{Document, DocumentFormat, KeyPath, ParseError};
use confmig_rules::{ChangeLog, Context};

use crate::env::EnvConverter;
use crate::error::{MigrateError, Result};
use crate::plan::{Plan, PlanKind, Transition};
use crate::rewriter::PathRewriter;
use crate::settings::Settings;

/// A migrated document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Migration {
    /// The new document
    pub document: Document,
    /// Changes made, in order
    pub log: ChangeLog,
}

/// A finished text-to-text conversion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversion {
    /// Converted document or env text
    pub output: String,
    /// Changes made, in order
    pub log: ChangeLog,
}

/// Runs migration plans
#[derive(Debug, Clone, Default)]
pub struct Migrator {
    settings: Settings,
}

impl Migrator {
    /// Create migrator
    #[inline]
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Active settings
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Migrate a parsed document
    ///
    /// # Errors
    /// Returns [`MigrateError::WrongKind`] for env plans and
    /// [`MigrateError::Rule`] if a step refuses to guess.
    pub fn migrate_document(&self, source: &Document, plan: &Plan) -> Result<Migration> {
        if plan.kind != PlanKind::Document {
            return Err(MigrateError::WrongKind {
                plan: plan.name.clone(),
                expected: plan.kind,
                actual: PlanKind::Document,
            });
        }

        let (mut document, mut log) = if plan.is_table_driven() {
            let rewritten = PathRewriter::migrate(source, &plan.mappings);
            (rewritten.document, rewritten.log)
        } else {
            (source.clone(), ChangeLog::new())
        };

        let ctx = Context::new(source, &plan.hoist_fields);
        let mut consumed: Vec<KeyPath> = Vec::new();
        for step in &plan.steps {
            let applied = step.apply(document, &ctx).map_err(|e| {
                tracing::warn!(plan = %plan.name, op = step.rule.op(), error = %e, "conversion aborted");
                e
            })?;
            document = applied.scope;
            log.extend(applied.log);
            consumed.extend(applied.consumed);
        }

        if plan.is_table_driven() {
            let mut covered: Vec<KeyPath> = plan.mappings.sources().collect();
            covered.append(&mut consumed);
            log.extend(self.settings.reporter().report(source, &covered));
        }

        tracing::info!(plan = %plan.name, changes = log.len(), "migrated document");
        Ok(Migration { document, log })
    }

    /// Convert env text
    ///
    /// # Errors
    /// Returns [`MigrateError::WrongKind`] for document plans and
    /// [`ParseError::Empty`] for blank input.
    pub fn migrate_env(&self, text: &str, plan: &Plan) -> Result<Conversion> {
        if plan.kind != PlanKind::Env {
            return Err(MigrateError::WrongKind {
                plan: plan.name.clone(),
                expected: plan.kind,
                actual: PlanKind::Env,
            });
        }
        if text.trim().is_empty() {
            return Err(ParseError::Empty.into());
        }

        let converted = EnvConverter::from_settings(&self.settings).convert_with_flags(text, &plan.mappings, &plan.env_flags);
        tracing::info!(plan = %plan.name, changes = converted.log.len(), "migrated env");
        Ok(Conversion {
            output: converted.text(),
            log: converted.log,
        })
    }

    /// Parse, migrate and render text with a plan
    ///
    /// `format` is ignored for env plans.
    ///
    /// # Errors
    /// Any parse, rule or serialization error; no output is produced then.
    pub fn convert_with_plan(&self, text: &str, format: DocumentFormat, plan: &Plan) -> Result<Conversion> {
        if plan.kind == PlanKind::Env {
            return self.migrate_env(text, plan);
        }

        let source = format.parse(text)?;
        let migration = self.migrate_document(&source, plan)?;
        let output = format.render(&migration.document, self.settings.indent)?;
        Ok(Conversion {
            output,
            log: migration.log,
        })
    }

    /// Parse, migrate and render text with a built-in transition
    ///
    /// # Errors
    /// As [`Migrator::convert_with_plan`].
    pub fn convert(&self, text: &str, format: DocumentFormat, transition: Transition) -> Result<Conversion> {
        let plan = transition.plan()?;
        self.convert_with_plan(text, format, &plan)
    }
}
