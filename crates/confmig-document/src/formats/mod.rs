//! Document parsers for different text formats
//!
//! The product reads its configuration from JSON, YAML or TOML files:
//! - JSON via serde_json (key order preserved)
//! - YAML via serde_yaml
//! - TOML via toml

use std::fmt::{self, Display, Formatter};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;
use crate::error::{ParseError, SerializeError};

mod json;
mod toml;
mod yaml;

pub use self::json::JsonParser;
pub use self::toml::TomlParser;
pub use self::yaml::YamlParser;

/// Structured text format of a configuration document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// JSON object
    Json,
    /// YAML mapping
    Yaml,
    /// TOML table
    Toml,
}

impl DocumentFormat {
    /// All supported formats
    pub const ALL: [Self; 3] = [Self::Json, Self::Yaml, Self::Toml];

    /// Detect format from a file path's extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ALL
            .into_iter()
            .find(|format| parser_for(*format).extensions().contains(&ext))
    }

    /// Parse text in this format
    ///
    /// # Errors
    /// See [`DocumentParser::parse`].
    #[inline]
    pub fn parse(self, text: &str) -> Result<Document, ParseError> {
        parser_for(self).parse(text)
    }

    /// Render a document in this format
    ///
    /// # Errors
    /// Returns error if the document cannot be represented in this format.
    #[inline]
    pub fn render(self, document: &Document, indent: Indent) -> Result<String, SerializeError> {
        parser_for(self).render(document, indent)
    }
}

impl Display for DocumentFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "JSON"),
            Self::Yaml => write!(f, "YAML"),
            Self::Toml => write!(f, "TOML"),
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            other => Err(ParseError::UnknownFormat(other.to_string())),
        }
    }
}

/// Indentation of pretty-printed JSON output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indent {
    /// Indent with the given number of spaces
    Spaces(u8),
    /// Indent with one tab per level
    Tab,
}

impl Indent {
    /// Bytes written per indentation level
    #[must_use]
    pub fn as_bytes(self) -> Vec<u8> {
        match self {
            Self::Spaces(n) => vec![b' '; usize::from(n)],
            Self::Tab => vec![b'\t'],
        }
    }
}

impl Default for Indent {
    fn default() -> Self {
        Self::Spaces(2)
    }
}

/// Parser trait for converting text into documents
///
/// Implement this trait to add support for new file formats.
pub trait DocumentParser: Send + Sync + 'static {
    /// Format handled by this parser
    fn format(&self) -> DocumentFormat;

    /// Parse text into a JSON value tree
    ///
    /// # Errors
    /// Returns [`ParseError::Syntax`] for malformed text.
    fn parse_value(&self, text: &str) -> Result<Value, ParseError>;

    /// Render a document as text
    ///
    /// # Errors
    /// Returns error if the document cannot be represented in this format.
    fn render(&self, document: &Document, indent: Indent) -> Result<String, SerializeError>;

    /// Supported file extensions (without dot)
    fn extensions(&self) -> &[&str];

    /// Parse text into a document
    ///
    /// # Errors
    /// Returns error if the text is empty, malformed, or not a mapping.
    fn parse(&self, text: &str) -> Result<Document, ParseError> {
        if text.trim().is_empty() {
            return Err(ParseError::Empty);
        }
        let value = self.parse_value(text)?;
        Document::from_value(value).ok_or(ParseError::NotAMapping {
            format: self.format(),
        })
    }
}

/// Built-in parser for a format
#[must_use]
pub fn parser_for(format: DocumentFormat) -> &'static dyn DocumentParser {
    match format {
        DocumentFormat::Json => &JsonParser,
        DocumentFormat::Yaml => &YamlParser,
        DocumentFormat::Toml => &TomlParser,
    }
}
