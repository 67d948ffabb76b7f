//! Constraining facets
//!
//! Facets narrow the value space of a field after conversion succeeded:
//! numeric bounds, text length, patterns, enumerations and the XML lexical
//! classes. Each facet yields at most one message per checked value.

use super::base::Facet;
use crate::error::{Error, Result};
use crate::names;
use crate::values::Native;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;

/// Numeric bounds for validation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericBound {
    /// Integer bound
    Integer(i64),
    /// Decimal bound
    Decimal(Decimal),
    /// Float bound
    Float(f64),
}

impl NumericBound {
    /// Order a numeric value relative to this bound
    ///
    /// Returns `None` for non-numeric values and for NaN.
    pub fn compare(&self, value: &Native) -> Option<Ordering> {
        match (value, self) {
            (Native::Int(v), NumericBound::Integer(b)) => Some(v.cmp(b)),
            (Native::Int(v), NumericBound::Decimal(b)) => Some(Decimal::from(*v).cmp(b)),
            (Native::Decimal(v), NumericBound::Integer(b)) => Some(v.cmp(&Decimal::from(*b))),
            (Native::Decimal(v), NumericBound::Decimal(b)) => Some(v.cmp(b)),
            (Native::Int(_) | Native::Decimal(_) | Native::Float(_), _) => {
                let v = as_f64(value)?;
                v.partial_cmp(&self.as_f64()?)
            }
            _ => None,
        }
    }

    /// Bound as a float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumericBound::Integer(b) => Some(*b as f64),
            NumericBound::Decimal(b) => b.to_f64(),
            NumericBound::Float(b) => Some(*b),
        }
    }
}

fn as_f64(value: &Native) -> Option<f64> {
    match value {
        Native::Int(v) => Some(*v as f64),
        Native::Float(v) => Some(*v),
        Native::Decimal(v) => v.to_f64(),
        _ => None,
    }
}

impl fmt::Display for NumericBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericBound::Integer(v) => write!(f, "{}", v),
            NumericBound::Decimal(v) => write!(f, "{}", v),
            NumericBound::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for NumericBound {
    fn from(v: i64) -> Self {
        NumericBound::Integer(v)
    }
}

impl From<i32> for NumericBound {
    fn from(v: i32) -> Self {
        NumericBound::Integer(v as i64)
    }
}

impl From<f64> for NumericBound {
    fn from(v: f64) -> Self {
        NumericBound::Float(v)
    }
}

impl From<Decimal> for NumericBound {
    fn from(v: Decimal) -> Self {
        NumericBound::Decimal(v)
    }
}

/// Side and strictness of a bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    /// value >= bound
    MinInclusive,
    /// value > bound
    MinExclusive,
    /// value <= bound
    MaxInclusive,
    /// value < bound
    MaxExclusive,
}

impl BoundKind {
    fn operator(&self) -> &'static str {
        match self {
            BoundKind::MinInclusive => ">=",
            BoundKind::MinExclusive => ">",
            BoundKind::MaxInclusive => "<=",
            BoundKind::MaxExclusive => "<",
        }
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            BoundKind::MinInclusive => ordering != Ordering::Less,
            BoundKind::MinExclusive => ordering == Ordering::Greater,
            BoundKind::MaxInclusive => ordering != Ordering::Greater,
            BoundKind::MaxExclusive => ordering == Ordering::Less,
        }
    }

    /// Check for a lower bound
    pub fn is_min(&self) -> bool {
        matches!(self, BoundKind::MinInclusive | BoundKind::MinExclusive)
    }
}

/// A numeric bound facet (minInclusive, minExclusive, maxInclusive, maxExclusive)
#[derive(Debug, Clone)]
pub struct BoundFacet {
    /// Which side and how strict
    pub kind: BoundKind,
    /// Bound value
    pub value: NumericBound,
}

impl BoundFacet {
    /// Create a new bound facet
    pub fn new(kind: BoundKind, value: impl Into<NumericBound>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Violation message for this bound
    pub fn message(&self) -> String {
        format!("must be {} {}", self.kind.operator(), self.value)
    }
}

impl Facet for BoundFacet {
    fn name(&self) -> &'static str {
        match self.kind {
            BoundKind::MinInclusive => "minInclusive",
            BoundKind::MinExclusive => "minExclusive",
            BoundKind::MaxInclusive => "maxInclusive",
            BoundKind::MaxExclusive => "maxExclusive",
        }
    }

    fn check(&self, value: &Native) -> Option<String> {
        match self.value.compare(value) {
            Some(ordering) if self.kind.accepts(ordering) => None,
            Some(_) => Some(self.message()),
            // NaN never satisfies a bound
            None if matches!(value, Native::Float(v) if v.is_nan()) => Some(self.message()),
            None => None,
        }
    }
}

/// Minimum length facet (in characters)
#[derive(Debug, Clone)]
pub struct MinLengthFacet {
    /// Minimum length
    pub value: usize,
}

impl MinLengthFacet {
    /// Create a new minimum length facet
    pub fn new(value: usize) -> Self {
        Self { value }
    }
}

impl Facet for MinLengthFacet {
    fn name(&self) -> &'static str {
        "minLength"
    }

    fn check(&self, value: &Native) -> Option<String> {
        let text = value.as_str()?;
        if text.chars().count() < self.value {
            Some(format!("must be at least {} characters", self.value))
        } else {
            None
        }
    }
}

/// Maximum length facet (in characters)
#[derive(Debug, Clone)]
pub struct MaxLengthFacet {
    /// Maximum length
    pub value: usize,
}

impl MaxLengthFacet {
    /// Create a new maximum length facet
    pub fn new(value: usize) -> Self {
        Self { value }
    }
}

impl Facet for MaxLengthFacet {
    fn name(&self) -> &'static str {
        "maxLength"
    }

    fn check(&self, value: &Native) -> Option<String> {
        let text = value.as_str()?;
        if text.chars().count() > self.value {
            Some(format!("must be at most {} characters", self.value))
        } else {
            None
        }
    }
}

/// Pattern facet: the whole text must match the expression
#[derive(Debug, Clone)]
pub struct PatternFacet {
    /// Regular expression pattern as written
    pub pattern: String,
    /// Compiled regex, anchored at both ends
    regex: Regex,
}

impl PatternFacet {
    /// Create a new pattern facet
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))
            .map_err(|e| Error::Schema(format!("Invalid pattern '{}': {}", pattern, e)))?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Check if a text fully matches
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl Facet for PatternFacet {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn check(&self, value: &Native) -> Option<String> {
        let text = value.as_str()?;
        if self.is_match(text) {
            None
        } else {
            Some(format!("must match pattern '{}'", self.pattern))
        }
    }
}

/// Enumeration facet restricts values to a fixed set
#[derive(Debug, Clone)]
pub struct EnumerationFacet {
    /// Allowed values
    pub values: Vec<Native>,
    /// Rendering of the allowed values for messages
    labels: Vec<String>,
}

impl EnumerationFacet {
    /// Create a new enumeration facet
    pub fn new(values: Vec<Native>, labels: Vec<String>) -> Self {
        Self { values, labels }
    }

    /// Rendering of the allowed values
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl Facet for EnumerationFacet {
    fn name(&self) -> &'static str {
        "enumeration"
    }

    fn check(&self, value: &Native) -> Option<String> {
        if self.values.contains(value) {
            None
        } else {
            Some(format!("must be one of: {}", self.labels.join(", ")))
        }
    }
}

/// XML lexical classes a text field can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lexical {
    /// Collapsed whitespace
    Token,
    /// XML Name
    Name,
    /// Non-colonized name
    NCName,
    /// Language identifier
    Language,
    /// Name token
    NMToken,
    /// E-mail address
    Email,
}

impl Lexical {
    /// Check if a text belongs to the class
    pub fn is_valid(&self, value: &str) -> bool {
        match self {
            Lexical::Token => names::is_collapsed(value),
            Lexical::Name => names::is_valid_name(value),
            Lexical::NCName => names::is_valid_ncname(value),
            Lexical::Language => names::is_valid_language(value),
            Lexical::NMToken => names::is_valid_nmtoken(value),
            Lexical::Email => names::is_valid_email(value),
        }
    }

    /// Violation message
    pub fn message(&self) -> &'static str {
        match self {
            Lexical::Token => "whitespace must be collapsed",
            Lexical::Name => "not a valid XML name",
            Lexical::NCName => "not a valid NCName",
            Lexical::Language => "not a valid language identifier",
            Lexical::NMToken => "not a valid NMTOKEN",
            Lexical::Email => "not a valid e-mail address",
        }
    }
}

/// Facet restricting text to an XML lexical class
#[derive(Debug, Clone)]
pub struct LexicalFacet {
    /// Lexical class
    pub lexical: Lexical,
    /// Accept the empty string
    pub allow_empty: bool,
}

impl LexicalFacet {
    /// Create a new lexical facet
    pub fn new(lexical: Lexical) -> Self {
        Self {
            lexical,
            allow_empty: false,
        }
    }

    /// Accept the empty string as well
    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }
}

impl Facet for LexicalFacet {
    fn name(&self) -> &'static str {
        "lexical"
    }

    fn check(&self, value: &Native) -> Option<String> {
        let text = value.as_str()?;
        if (self.allow_empty && text.is_empty()) || self.lexical.is_valid(text) {
            None
        } else {
            Some(self.lexical.message().to_string())
        }
    }
}
