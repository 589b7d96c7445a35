//! JSON configuration parser

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use super::{DocumentFormat, DocumentParser, Indent};
use crate::document::Document;
use crate::error::{ParseError, SerializeError};

/// JSON parser
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl DocumentParser for JsonParser {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Json
    }

    fn parse_value(&self, text: &str) -> Result<Value, ParseError> {
        serde_json::from_str(text).map_err(|e| ParseError::syntax(DocumentFormat::Json, e))
    }

    fn render(&self, document: &Document, indent: Indent) -> Result<String, SerializeError> {
        let indent = indent.as_bytes();
        let mut out = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&indent));
        document
            .serialize(&mut serializer)
            .map_err(|e| SerializeError::Format {
                format: DocumentFormat::Json,
                message: e.to_string(),
            })?;
        String::from_utf8(out).map_err(|e| SerializeError::Format {
            format: DocumentFormat::Json,
            message: e.to_string(),
        })
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }
}
