//! Error types for document parsing and serialization

use crate::formats::DocumentFormat;

/// Errors while reading user-supplied text into a document
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Nothing to convert
    #[error("input is empty")]
    Empty,

    /// Text is not valid in the declared format
    #[error("invalid {format}: {message}")]
    Syntax {
        /// Format the text was read as
        format: DocumentFormat,
        /// Parser message
        message: String,
    },

    /// Text parsed but the root is a scalar or sequence
    #[error("{format} root must be a mapping of options")]
    NotAMapping {
        /// Format the text was read as
        format: DocumentFormat,
    },

    /// File extension does not name a known format
    #[error("unknown document format: '{0}'")]
    UnknownFormat(String),
}

impl ParseError {
    /// Create syntax error for format
    pub fn syntax(format: DocumentFormat, message: impl ToString) -> Self {
        Self::Syntax {
            format,
            message: message.to_string(),
        }
    }
}

/// Errors while rendering a document back to text
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// Format-specific failure (TOML cannot hold `null`, for example)
    #[error("cannot write {format}: {message}")]
    Format {
        /// Target format
        format: DocumentFormat,
        /// Serializer message
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let err = ParseError::syntax(DocumentFormat::Json, "expected value at line 1");
        assert_eq!(err.to_string(), "invalid JSON: expected value at line 1");
        assert_eq!(ParseError::Empty.to_string(), "input is empty");
    }

    #[test]
    fn not_a_mapping_display() {
        let err = ParseError::NotAMapping {
            format: DocumentFormat::Yaml,
        };
        assert_eq!(err.to_string(), "YAML root must be a mapping of options");
    }
}
