//! Mapping key conventions
//!
//! Input and output of a model is an ordered mapping in the shape an
//! XML-to-mapping tokenizer produces:
//! - attributes are keys with the attribute prefix (`@id`)
//! - the text of an element that carries attributes sits under the text key (`#text`)
//! - namespace declarations are attributes named `xmlns` / `xmlns:prefix`
//! - every other key is a child element

mod base;

pub use base::{Context, ConversionMode, ConverterConfig};

use crate::error::Result;
use crate::names::split_qname;
use crate::namespaces::{NamespaceContext, XSI_NAMESPACE};
use crate::values::OrderedMap;

/// Role of a key in an ordered mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind<'k> {
    /// Child element
    Element(&'k str),
    /// Attribute (name without prefix)
    Attribute(&'k str),
    /// Text content
    Text,
    /// Namespace declaration (declared prefix, empty for the default namespace)
    Declaration(&'k str),
}

/// Classify a mapping key under the given configuration
pub fn classify_key<'k>(config: &ConverterConfig, key: &'k str) -> Result<KeyKind<'k>> {
    if key == config.text_key() {
        return Ok(KeyKind::Text);
    }
    match config.attribute_name(key) {
        Some(name) => {
            if config.process_namespaces() {
                if let Some(prefix) = NamespaceContext::declaration_prefix(name)? {
                    return Ok(KeyKind::Declaration(prefix));
                }
            }
            Ok(KeyKind::Attribute(name))
        }
        None => Ok(KeyKind::Element(key)),
    }
}

/// Collect the namespace declarations of one mapping level as `(prefix, uri)`
pub fn collect_declarations(config: &ConverterConfig, map: &OrderedMap) -> Result<Vec<(String, String)>> {
    let mut declarations = Vec::new();
    if !config.process_namespaces() {
        return Ok(declarations);
    }
    for (key, value) in map {
        if let KeyKind::Declaration(prefix) = classify_key(config, key)? {
            if let Some(uri) = value.as_str() {
                declarations.push((prefix.to_string(), uri.to_string()));
            }
        }
    }
    Ok(declarations)
}

/// Check if an attribute is an `xsi:schemaLocation`-style hint that the
/// configuration asks to drop
pub fn is_schema_location(ctx: &Context, attribute: &str) -> bool {
    if !ctx.config().strip_schema_location() {
        return false;
    }
    match split_qname(attribute) {
        (Some(prefix), "schemaLocation" | "noNamespaceSchemaLocation") => {
            ctx.namespaces().get_namespace(prefix) == Some(XSI_NAMESPACE)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::Value;

    #[test]
    fn test_classify_key() {
        let config = ConverterConfig::default();
        assert_eq!(classify_key(&config, "name").unwrap(), KeyKind::Element("name"));
        assert_eq!(classify_key(&config, "@id").unwrap(), KeyKind::Attribute("id"));
        assert_eq!(classify_key(&config, "#text").unwrap(), KeyKind::Text);
        assert_eq!(classify_key(&config, "@xmlns").unwrap(), KeyKind::Declaration(""));
        assert_eq!(
            classify_key(&config, "@xmlns:spirit").unwrap(),
            KeyKind::Declaration("spirit")
        );
    }

    #[test]
    fn test_classify_key_without_namespaces() {
        let config = ConverterConfig::default().with_process_namespaces(false);
        assert_eq!(
            classify_key(&config, "@xmlns:spirit").unwrap(),
            KeyKind::Attribute("xmlns:spirit")
        );
    }

    #[test]
    fn test_collect_declarations() {
        let config = ConverterConfig::default();
        let map = match Value::map([
            ("@xmlns:xsi", Value::from(XSI_NAMESPACE)),
            ("@xmlns", Value::from("urn:default")),
            ("@id", Value::from("x")),
        ]) {
            Value::Map(m) => m,
            _ => unreachable!(),
        };

        let declarations = collect_declarations(&config, &map).unwrap();
        assert_eq!(
            declarations,
            vec![
                ("xsi".to_string(), XSI_NAMESPACE.to_string()),
                (String::new(), "urn:default".to_string()),
            ]
        );
    }

    #[test]
    fn test_is_schema_location() {
        let ctx = Context::new().declaring(&[("xsi".to_string(), XSI_NAMESPACE.to_string())]);
        assert!(is_schema_location(&ctx, "xsi:schemaLocation"));
        assert!(!is_schema_location(&ctx, "schemaLocation"));
        assert!(!is_schema_location(&Context::new(), "xsi:schemaLocation"));
    }
}
