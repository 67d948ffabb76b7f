//! Base validator types
//!
//! Validity status of an instance and the [`Facet`] trait implemented by
//! every constraint a field can carry.

use crate::values::Native;
use std::fmt;

/// Validity status of a model instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidityStatus {
    /// Last validation found no violation
    Valid,
    /// Last validation found violations
    Invalid,
    /// Not validated since construction or the last mutation
    #[default]
    NotKnown,
}

impl ValidityStatus {
    /// Get the status as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidityStatus::Valid => "valid",
            ValidityStatus::Invalid => "invalid",
            ValidityStatus::NotKnown => "notKnown",
        }
    }
}

impl fmt::Display for ValidityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A constraint on converted values
///
/// A facet only inspects the native types it knows about and ignores the
/// others; whether a facet fits a field is decided when the field is built.
pub trait Facet: fmt::Debug + Send + Sync {
    /// Facet name, used in schema errors
    fn name(&self) -> &'static str;

    /// Check a value, returning the violation message if it fails
    fn check(&self, value: &Native) -> Option<String>;
}
