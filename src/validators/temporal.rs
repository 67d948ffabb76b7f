//! Date and time formats
//!
//! Temporal fields parse against an ordered list of `chrono` format
//! patterns (first full match wins) and render with a canonical pattern.
//! Date-times carrying an offset are normalized to UTC.

use crate::error::ConversionError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

type Result<T> = std::result::Result<T, ConversionError>;

/// Default parse patterns for date-times
pub const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Canonical date-time pattern
pub const DATETIME_CANONICAL: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Default parse patterns for dates
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Canonical date pattern
pub const DATE_CANONICAL: &str = "%Y-%m-%d";

/// Default parse patterns for times
pub const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// Canonical time pattern
pub const TIME_CANONICAL: &str = "%H:%M:%S%.f";

/// Kind of temporal value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalKind {
    /// Date and time
    DateTime,
    /// Calendar date
    Date,
    /// Time of day
    Time,
}

impl TemporalKind {
    /// Name used in messages
    pub fn as_str(&self) -> &'static str {
        match self {
            TemporalKind::DateTime => "datetime",
            TemporalKind::Date => "date",
            TemporalKind::Time => "time",
        }
    }
}

/// Parse patterns and canonical output pattern of a temporal field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalFormats {
    /// Tried in order when parsing
    parse: Vec<String>,
    /// Used when rendering
    canonical: String,
}

impl TemporalFormats {
    /// Create formats from parse patterns and a canonical pattern
    pub fn new<I, S>(parse: I, canonical: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parse: parse.into_iter().map(Into::into).collect(),
            canonical: canonical.into(),
        }
    }

    /// Default formats for a temporal kind
    pub fn defaults(kind: TemporalKind) -> Self {
        match kind {
            TemporalKind::DateTime => Self::new(DATETIME_FORMATS.iter().copied(), DATETIME_CANONICAL),
            TemporalKind::Date => Self::new(DATE_FORMATS.iter().copied(), DATE_CANONICAL),
            TemporalKind::Time => Self::new(TIME_FORMATS.iter().copied(), TIME_CANONICAL),
        }
    }

    /// Replace the parse patterns
    pub fn with_parse<I, S>(mut self, parse: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parse = parse.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the canonical pattern
    pub fn with_canonical(mut self, canonical: impl Into<String>) -> Self {
        self.canonical = canonical.into();
        self
    }

    /// Parse patterns in order
    pub fn parse_patterns(&self) -> &[String] {
        &self.parse
    }

    /// Canonical pattern
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    fn failure(&self, kind: TemporalKind, value: &str) -> ConversionError {
        ConversionError::new(format!(
            "could not parse {} with formats: {}",
            kind.as_str(),
            self.parse.join(", ")
        ))
        .with_value(format!("{:?}", value))
    }

    /// Parse a date-time
    pub fn parse_datetime(&self, value: &str) -> Result<NaiveDateTime> {
        let value = value.trim();
        for pattern in &self.parse {
            let parsed = if has_offset(pattern) {
                DateTime::parse_from_str(value, pattern).map(|dt| dt.naive_utc())
            } else {
                NaiveDateTime::parse_from_str(value, pattern)
            };
            if let Ok(dt) = parsed {
                return Ok(dt);
            }
        }
        Err(self.failure(TemporalKind::DateTime, value))
    }

    /// Parse a date
    pub fn parse_date(&self, value: &str) -> Result<NaiveDate> {
        let value = value.trim();
        self.parse
            .iter()
            .find_map(|pattern| NaiveDate::parse_from_str(value, pattern).ok())
            .ok_or_else(|| self.failure(TemporalKind::Date, value))
    }

    /// Parse a time of day
    pub fn parse_time(&self, value: &str) -> Result<NaiveTime> {
        let value = value.trim();
        self.parse
            .iter()
            .find_map(|pattern| NaiveTime::parse_from_str(value, pattern).ok())
            .ok_or_else(|| self.failure(TemporalKind::Time, value))
    }

    /// Render a date-time with the canonical pattern
    pub fn format_datetime(&self, value: &NaiveDateTime) -> String {
        value.format(&self.canonical).to_string()
    }

    /// Render a date with the canonical pattern
    pub fn format_date(&self, value: &NaiveDate) -> String {
        value.format(&self.canonical).to_string()
    }

    /// Render a time with the canonical pattern
    pub fn format_time(&self, value: &NaiveTime) -> String {
        value.format(&self.canonical).to_string()
    }
}

fn has_offset(pattern: &str) -> bool {
    ["%z", "%:z", "%#z", "%::z"].iter().any(|spec| pattern.contains(spec))
}
