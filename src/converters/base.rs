//! Base converter configuration and per-call context
//!
//! This module provides the key conventions used to tell attributes, text
//! and child elements apart in an ordered mapping, and the context threaded
//! through every conversion.

use crate::error::{Error, Result};
use crate::namespaces::NamespaceContext;
use std::fmt;

/// How construction reacts to a value that cannot be converted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionMode {
    /// The first conversion error is returned to the caller
    Strict,
    /// Conversion errors are kept on the instance and reported by `validate`
    #[default]
    Lax,
}

impl ConversionMode {
    /// Parse conversion mode from string
    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "strict" => Ok(ConversionMode::Strict),
            "lax" => Ok(ConversionMode::Lax),
            _ => Err(Error::Value(format!(
                "Invalid conversion mode: '{}'. Must be 'strict' or 'lax'",
                s
            ))),
        }
    }

    /// Get the mode as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionMode::Strict => "strict",
            ConversionMode::Lax => "lax",
        }
    }

    /// Check for strict mode
    pub fn is_strict(&self) -> bool {
        *self == ConversionMode::Strict
    }
}

impl fmt::Display for ConversionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration for the mapping key conventions
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterConfig {
    /// Prefix for attribute names
    attr_prefix: String,
    /// Key used for the text content of an element with attributes
    text_key: String,
    /// Whether `xmlns` declarations are collected
    process_namespaces: bool,
    /// Whether `xsi:schemaLocation` style attributes are dropped
    strip_schema_location: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            attr_prefix: "@".to_string(),
            text_key: "#text".to_string(),
            process_namespaces: true,
            strip_schema_location: true,
        }
    }
}

impl ConverterConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the attribute prefix
    pub fn attr_prefix(&self) -> &str {
        &self.attr_prefix
    }

    /// Get the text key
    pub fn text_key(&self) -> &str {
        &self.text_key
    }

    /// Check if namespaces are processed
    pub fn process_namespaces(&self) -> bool {
        self.process_namespaces
    }

    /// Check if schema location attributes are dropped
    pub fn strip_schema_location(&self) -> bool {
        self.strip_schema_location
    }

    /// Set attribute prefix
    pub fn with_attr_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.attr_prefix = prefix.into();
        self
    }

    /// Set text key
    pub fn with_text_key(mut self, key: impl Into<String>) -> Self {
        self.text_key = key.into();
        self
    }

    /// Set namespace processing
    pub fn with_process_namespaces(mut self, process: bool) -> Self {
        self.process_namespaces = process;
        self
    }

    /// Set schema location stripping
    pub fn with_strip_schema_location(mut self, strip: bool) -> Self {
        self.strip_schema_location = strip;
        self
    }

    /// Check if a mapping key names an attribute
    pub fn is_attribute_key(&self, key: &str) -> bool {
        !self.attr_prefix.is_empty() && key.starts_with(self.attr_prefix.as_str())
    }

    /// Attribute name without the prefix
    pub fn attribute_name<'k>(&self, key: &'k str) -> Option<&'k str> {
        if self.attr_prefix.is_empty() {
            return None;
        }
        key.strip_prefix(self.attr_prefix.as_str())
    }

    /// Build the mapping key of an attribute
    pub fn attribute_key(&self, name: &str) -> String {
        format!("{}{}", self.attr_prefix, name)
    }
}

/// Context threaded through conversions in both directions
#[derive(Debug, Clone, Default)]
pub struct Context {
    mode: ConversionMode,
    config: ConverterConfig,
    namespaces: NamespaceContext,
    role: Option<String>,
}

impl Context {
    /// Create a lax context with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a strict context with default configuration
    pub fn strict() -> Self {
        Self::default().with_mode(ConversionMode::Strict)
    }

    /// Set the conversion mode
    pub fn with_mode(mut self, mode: ConversionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the converter configuration
    pub fn with_config(mut self, config: ConverterConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the known namespace declarations
    pub fn with_namespaces(mut self, namespaces: NamespaceContext) -> Self {
        self.namespaces = namespaces;
        self
    }

    /// Set the output role used to filter fields
    pub fn with_role(mut self, role: Option<&str>) -> Self {
        self.role = role.map(str::to_string);
        self
    }

    /// Get the conversion mode
    pub fn mode(&self) -> ConversionMode {
        self.mode
    }

    /// Get the converter configuration
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Get the namespace declarations in scope
    pub fn namespaces(&self) -> &NamespaceContext {
        &self.namespaces
    }

    /// Get the output role
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// Same context in strict mode
    pub fn as_strict(&self) -> Self {
        self.clone().with_mode(ConversionMode::Strict)
    }

    /// Child context extended with namespace declarations `(prefix, uri)`
    pub fn declaring(&self, declarations: &[(String, String)]) -> Self {
        if declarations.is_empty() {
            return self.clone();
        }
        let mut child = self.clone();
        for (prefix, uri) in declarations {
            child.namespaces.add_prefix(prefix.as_str(), uri.as_str());
        }
        child
    }
}
