//! YAML configuration parser

use serde_json::Value;

use super::{DocumentFormat, DocumentParser, Indent};
use crate::document::Document;
use crate::error::{ParseError, SerializeError};

/// YAML parser
///
/// Mapping keys must be strings; anchors and aliases are resolved on read.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

impl DocumentParser for YamlParser {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Yaml
    }

    fn parse_value(&self, text: &str) -> Result<Value, ParseError> {
        serde_yaml::from_str(text).map_err(|e| ParseError::syntax(DocumentFormat::Yaml, e))
    }

    fn render(&self, document: &Document, _indent: Indent) -> Result<String, SerializeError> {
        serde_yaml::to_string(document).map_err(|e| SerializeError::Format {
            format: DocumentFormat::Yaml,
            message: e.to_string(),
        })
    }

    fn extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn yaml_parser_valid() {
        let doc = YamlParser
            .parse("token_hmac_secret_key: secret\nnamespaces:\n  - name: chat\n    presence: true\n")
            .unwrap();
        assert_eq!(doc.get_key("token_hmac_secret_key"), Some(&json!("secret")));
        assert_eq!(
            doc.get_key("namespaces"),
            Some(&json!([{"name": "chat", "presence": true}]))
        );
    }

    #[test]
    fn yaml_parser_rejects_scalar_root() {
        let result = YamlParser.parse("just a string");
        assert!(matches!(result, Err(ParseError::NotAMapping { .. })));
    }

    #[test]
    fn yaml_render_round_trip() {
        let doc = YamlParser.parse("a: 1\nb:\n  c: true\n").unwrap();
        let text = YamlParser.render(&doc, Indent::default()).unwrap();
        assert_eq!(YamlParser.parse(&text).unwrap(), doc);
    }
}
