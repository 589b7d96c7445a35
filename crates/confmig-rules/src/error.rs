//! Error types for normalizer rules

use crate::scope::ScopeLabel;

/// Errors raised by normalizer rules
///
/// Nearly every rule is total. The exceptions are cases where any automatic
/// answer could be wrong, which abort the whole conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    /// The input is ambiguous and the rule refuses to guess
    #[error("{scope}: {detail}; too difficult to automatically convert, please migrate \"{option}\" manually")]
    Ambiguous {
        /// Enclosing scope
        scope: ScopeLabel,
        /// Option that could not be converted
        option: String,
        /// What made it ambiguous
        detail: String,
    },
}

impl RuleError {
    /// Create ambiguity error
    pub fn ambiguous(scope: ScopeLabel, option: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Ambiguous {
            scope,
            option: option.into(),
            detail: detail.into(),
        }
    }
}
