//! Error types for xmodels
//!
//! This module defines all error types used throughout the library.
//! Conversion failures and aggregate validation failures are kept apart:
//! a value can convert cleanly and still fail validation.

use crate::error_map::ErrorMap;
use std::fmt;
use thiserror::Error;

/// Result type alias using xmodels Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xmodels operations
#[derive(Error, Debug)]
pub enum Error {
    /// A primitive value could not be converted to a field's native type
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Aggregate validation failure of a model instance
    #[error("validation error: {0}")]
    Validation(#[from] ModelValidationError),

    /// Invalid schema definition (detected when a model is built)
    #[error("schema error: {0}")]
    Schema(String),

    /// Key error (unknown field name)
    #[error("key error: {0}")]
    Key(String),

    /// Value error (invalid argument)
    #[error("value error: {0}")]
    Value(String),

    /// JSON reading or writing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A primitive value that cannot be parsed into a field's native type
///
/// The `path` is relative to whatever raised or re-raised the error and is
/// prefixed as the error travels outward through nested models.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionError {
    /// Error message
    pub message: String,
    /// Relative path of the offending value (empty for the value itself)
    pub path: String,
    /// Rendering of the offending primitive value
    pub value: Option<String>,
}

impl ConversionError {
    /// Create a new conversion error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: String::new(),
            value: None,
        }
    }

    /// Set the path where conversion failed
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the offending value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Prefix the path with an outer segment (a field name or `[index]`)
    pub fn prefixed(mut self, segment: &str) -> Self {
        self.path = join_path(segment, &self.path);
        self
    }

    /// Message and offending value, without the path
    pub fn summary(&self) -> String {
        match self.value {
            Some(ref value) => format!("{}, value: {}", self.message, value),
            None => self.message.clone(),
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())?;

        if !self.path.is_empty() {
            write!(f, " (at {})", self.path)?;
        }

        Ok(())
    }
}

impl std::error::Error for ConversionError {}

/// Aggregate error raised by `Instance::validate`
#[derive(Debug, Clone, PartialEq)]
pub struct ModelValidationError {
    /// Name of the validated model
    pub model: String,
    /// All violations keyed by field path
    pub errors: ErrorMap,
}

impl ModelValidationError {
    /// Create a new aggregate error
    pub fn new(model: impl Into<String>, errors: ErrorMap) -> Self {
        Self {
            model: model.into(),
            errors,
        }
    }

    /// The path to messages mapping
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }
}

impl fmt::Display for ModelValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed validation with {} invalid path(s)",
            self.model,
            self.errors.len()
        )?;

        for (path, messages) in self.errors.iter() {
            write!(f, "\n  {}: {}", path, messages.join("; "))?;
        }

        Ok(())
    }
}

impl std::error::Error for ModelValidationError {}

/// Join an outer path segment with a relative inner path
///
/// Index segments attach without a separator: `items` + `[2].name`
/// gives `items[2].name`.
pub fn join_path(outer: &str, inner: &str) -> String {
    if outer.is_empty() {
        inner.to_string()
    } else if inner.is_empty() {
        outer.to_string()
    } else if inner.starts_with('[') {
        format!("{}{}", outer, inner)
    } else {
        format!("{}.{}", outer, inner)
    }
}
