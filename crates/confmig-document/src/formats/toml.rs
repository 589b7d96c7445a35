//! TOML configuration parser

use serde_json::Value;

use super::{DocumentFormat, DocumentParser, Indent};
use crate::document::Document;
use crate::error::{ParseError, SerializeError};

/// TOML parser
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlParser;

impl DocumentParser for TomlParser {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Toml
    }

    fn parse_value(&self, text: &str) -> Result<Value, ParseError> {
        ::toml::from_str(text).map_err(|e| ParseError::syntax(DocumentFormat::Toml, e))
    }

    fn render(&self, document: &Document, _indent: Indent) -> Result<String, SerializeError> {
        ::toml::to_string_pretty(document).map_err(|e| SerializeError::Format {
            format: DocumentFormat::Toml,
            message: e.to_string(),
        })
    }

    fn extensions(&self) -> &[&str] {
        &["toml"]
    }
}
