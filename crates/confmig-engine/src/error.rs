//! Error types for the migration engine
//!
//! Covers:
//! - Plan files that cannot be read or parsed
//! - Settings files that cannot be read or parsed
//! - Input text that cannot be read as the declared format
//! - Rules that refuse to guess
//! - Output that cannot be written back in the requested format

use std::path::PathBuf;

use confmig_document::{ParseError, SerializeError};
use confmig_rules::RuleError;

use crate::plan::PlanKind;

/// Errors loading migration plans
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Plan text is not valid TOML for the plan schema
    #[error("invalid plan '{name}': {message}")]
    Invalid {
        /// Plan name or file path
        name: String,
        /// Deserializer message
        message: String,
    },

    /// Transition name is not one of the built-in plans
    #[error("unknown transition '{0}' (expected one of v2-v3, v3-v4, v5-v6, v5-v6-env)")]
    UnknownTransition(String),

    /// A plan inherits mappings from a plan that inherits in turn
    #[error("plan '{0}' inherits from a plan that itself inherits mappings")]
    NestedInheritance(String),

    /// File could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl PlanError {
    /// Create invalid-plan error
    pub fn invalid(name: impl Into<String>, message: impl ToString) -> Self {
        Self::Invalid {
            name: name.into(),
            message: message.to_string(),
        }
    }
}

/// Errors loading tool settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Settings text is not valid TOML for the settings schema
    #[error("invalid settings file {path}: {message}")]
    Invalid {
        /// File path
        path: PathBuf,
        /// Deserializer message
        message: String,
    },

    /// File could not be read
    #[error("cannot read settings file {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Errors aborting a conversion
///
/// Nothing is emitted when a conversion fails; the caller keeps whatever
/// output it had before.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Input could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A rule met an ambiguous input
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// Output could not be rendered
    #[error(transparent)]
    Serialize(#[from] SerializeError),

    /// Plan could not be loaded
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// Plan applies to the other kind of input
    #[error("plan '{plan}' converts {expected} input, not {actual}")]
    WrongKind {
        /// Plan name
        plan: String,
        /// Input kind the plan expects
        expected: PlanKind,
        /// Input kind supplied
        actual: PlanKind,
    },
}

impl MigrateError {
    /// Check if the error is the ambiguity signal rather than bad input
    #[inline]
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Rule(RuleError::Ambiguous { .. }))
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, MigrateError>;
