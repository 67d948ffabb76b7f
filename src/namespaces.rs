//! XML namespace handling
//!
//! Tracks the `xmlns` declarations seen while converting a document so
//! that fields of namespaced models can be looked up (and written) under
//! the prefix the document chose for their namespace.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// XML Schema instance namespace
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// XML Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// Namespace context for resolving prefixes in both directions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI
    prefixes: HashMap<Prefix, NamespaceUri>,
    /// Default namespace (no prefix)
    default_namespace: Option<NamespaceUri>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace prefix mapping; an empty prefix sets the default namespace
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        let prefix = prefix.into();
        if prefix.is_empty() {
            self.default_namespace = Some(namespace.into());
        } else {
            self.prefixes.insert(prefix, namespace.into());
        }
    }

    /// Set the default namespace
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        self.default_namespace = Some(namespace.into());
    }

    /// Get the namespace for a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the default namespace
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Find the prefix bound to a namespace URI
    ///
    /// Returns `Some("")` when the URI is the default namespace. When several
    /// prefixes map to the same URI the alphabetically first one is used.
    pub fn prefix_for(&self, namespace: &str) -> Option<&str> {
        if self.default_namespace.as_deref() == Some(namespace) {
            return Some("");
        }
        self.prefixes
            .iter()
            .filter(|(_, uri)| uri.as_str() == namespace)
            .map(|(prefix, _)| prefix.as_str())
            .min()
    }

    /// Key prefix (`"p:"`) for names in `namespace`, empty when unprefixed
    pub fn qualifier(&self, namespace: Option<&str>) -> String {
        match namespace.and_then(|ns| self.prefix_for(ns)) {
            Some(prefix) if !prefix.is_empty() => format!("{}:", prefix),
            _ => String::new(),
        }
    }

    /// Resolve a prefix from a declaration key such as `xmlns:spirit`
    ///
    /// `xmlns` alone declares the default namespace and yields `""`.
    pub fn declaration_prefix(name: &str) -> Result<Option<&str>> {
        if name == "xmlns" {
            return Ok(Some(""));
        }
        match name.strip_prefix("xmlns:") {
            Some("") => Err(Error::Value(format!("Empty namespace prefix in '{}'", name))),
            Some(prefix) => Ok(Some(prefix)),
            None => Ok(None),
        }
    }

    /// Check whether no namespace is declared
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.default_namespace.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_context() {
        let mut ctx = NamespaceContext::new();
        ctx.add_prefix("spirit", "http://www.spiritconsortium.org/XMLSchema/SPIRIT/1685-2009");
        ctx.set_default_namespace("http://example.com");

        assert_eq!(
            ctx.get_namespace("spirit"),
            Some("http://www.spiritconsortium.org/XMLSchema/SPIRIT/1685-2009")
        );
        assert_eq!(ctx.get_default_namespace(), Some("http://example.com"));
        assert!(!ctx.is_empty());
    }

    #[test]
    fn test_prefix_for() {
        let mut ctx = NamespaceContext::new();
        ctx.add_prefix("b", "urn:x");
        ctx.add_prefix("a", "urn:x");
        ctx.add_prefix("", "urn:default");

        assert_eq!(ctx.prefix_for("urn:x"), Some("a"));
        assert_eq!(ctx.prefix_for("urn:default"), Some(""));
        assert_eq!(ctx.prefix_for("urn:missing"), None);
    }

    #[test]
    fn test_qualifier() {
        let mut ctx = NamespaceContext::new();
        ctx.add_prefix("spirit", "urn:spirit");
        ctx.set_default_namespace("urn:default");

        assert_eq!(ctx.qualifier(Some("urn:spirit")), "spirit:");
        assert_eq!(ctx.qualifier(Some("urn:default")), "");
        assert_eq!(ctx.qualifier(None), "");
    }

    #[test]
    fn test_declaration_prefix() {
        assert_eq!(NamespaceContext::declaration_prefix("xmlns").unwrap(), Some(""));
        assert_eq!(
            NamespaceContext::declaration_prefix("xmlns:xsi").unwrap(),
            Some("xsi")
        );
        assert_eq!(NamespaceContext::declaration_prefix("id").unwrap(), None);
        assert!(NamespaceContext::declaration_prefix("xmlns:").is_err());
    }
}
