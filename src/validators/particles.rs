//! Occurrence bounds of content-model particles
//!
//! A particle says how many times an element may appear: `min` and `max`
//! occurrences, `max = None` meaning unbounded.

use crate::error::{Error, Result};
use std::fmt;

/// Occurrence bounds for a particle (minOccurs, maxOccurs)
/// None for max means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    /// Minimum number of occurrences (default 1)
    pub min: u32,
    /// Maximum number of occurrences (None = unbounded, default 1)
    pub max: Option<u32>,
}

impl Occurs {
    /// Create new occurrence bounds
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Default occurrence (1, 1)
    pub fn once() -> Self {
        Self { min: 1, max: Some(1) }
    }

    /// Optional occurrence (0, 1)
    pub fn optional() -> Self {
        Self { min: 0, max: Some(1) }
    }

    /// Zero or more (0, unbounded)
    pub fn zero_or_more() -> Self {
        Self { min: 0, max: None }
    }

    /// One or more (1, unbounded)
    pub fn one_or_more() -> Self {
        Self { min: 1, max: None }
    }

    /// Check if this particle can be absent (min == 0)
    pub fn is_emptiable(&self) -> bool {
        self.min == 0
    }

    /// Check if this particle is required (min >= 1)
    pub fn is_required(&self) -> bool {
        self.min >= 1
    }

    /// Check if particle can have multiple occurrences
    pub fn is_multiple(&self) -> bool {
        self.max.map_or(true, |max| max > 1)
    }

    /// Check if occurrence count is under the minimum
    pub fn is_missing(&self, count: usize) -> bool {
        count < self.min as usize
    }

    /// Check if occurrence count exceeds the maximum
    pub fn is_exceeded(&self, count: usize) -> bool {
        match self.max {
            Some(max) => count > max as usize,
            None => false,
        }
    }

    /// Violation message for an occurrence count outside the bounds
    pub fn check(&self, count: usize) -> Option<String> {
        if self.is_missing(count) {
            Some(format!("expected at least {} occurrences", self.min))
        } else if let (true, Some(max)) = (self.is_exceeded(count), self.max) {
            Some(format!("expected at most {} occurrences", max))
        } else {
            None
        }
    }

    /// Check that the bounds are consistent
    pub fn validate(&self) -> Result<()> {
        match self.max {
            Some(max) if self.min > max => Err(Error::Schema(format!(
                "minOccurs ({}) must be lesser or equal than maxOccurs ({})",
                self.min, max
            ))),
            _ => Ok(()),
        }
    }
}

impl Default for Occurs {
    fn default() -> Self {
        Self::once()
    }
}

impl fmt::Display for Occurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..unbounded", self.min),
        }
    }
}
