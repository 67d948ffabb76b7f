//! Lexical conversion helpers
//!
//! Parsing and rendering of the scalar primitive forms: booleans,
//! integers, floats, decimals and base64 binary.

use crate::error::ConversionError;
use base64::Engine;
use rust_decimal::Decimal;

type Result<T> = std::result::Result<T, ConversionError>;

// =============================================================================
// Boolean Conversions
// =============================================================================

/// Convert a boolean literal (`true`/`false`/`1`/`0`, any case, trimmed)
pub fn boolean_to_rust(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConversionError::new("could not convert to boolean").with_value(format!("{:?}", value))),
    }
}

// =============================================================================
// Integer Conversions
// =============================================================================

/// Convert an integer literal
pub fn int_to_rust(value: &str) -> Result<i64> {
    value.trim().parse::<i64>().map_err(|_| {
        ConversionError::new("could not convert to integer").with_value(format!("{:?}", value))
    })
}

/// Convert a float without fractional part to an integer
pub fn integral_float_to_rust(value: f64) -> Result<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Ok(value as i64)
    } else {
        Err(ConversionError::new("could not convert to integer").with_value(value.to_string()))
    }
}

// =============================================================================
// Float Conversions
// =============================================================================

/// Convert a float literal (`NaN`, `INF` and `-INF` included)
pub fn float_to_rust(value: &str) -> Result<f64> {
    match value.trim() {
        "NaN" => Ok(f64::NAN),
        "INF" => Ok(f64::INFINITY),
        "-INF" => Ok(f64::NEG_INFINITY),
        trimmed => trimmed.parse::<f64>().map_err(|_| {
            ConversionError::new("could not convert to float").with_value(format!("{:?}", value))
        }),
    }
}

/// Convert a float to its literal
pub fn rust_to_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "INF".to_string()
    } else if value == f64::NEG_INFINITY {
        "-INF".to_string()
    } else {
        value.to_string()
    }
}

/// Render a float with a fixed number of decimals
pub fn rust_to_fixed_float(value: f64, precision: usize) -> String {
    if value.is_finite() {
        format!("{:.*}", precision, value)
    } else {
        rust_to_float(value)
    }
}

// =============================================================================
// Decimal Conversions
// =============================================================================

/// Convert a decimal literal
pub fn decimal_to_rust(value: &str) -> Result<Decimal> {
    value.trim().parse::<Decimal>().map_err(|_| {
        ConversionError::new("could not convert to decimal").with_value(format!("{:?}", value))
    })
}

// =============================================================================
// Binary Conversions
// =============================================================================

/// Decode base64 text; embedded whitespace is ignored
pub fn base64_to_rust(value: &str) -> Result<Vec<u8>> {
    let cleaned: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Ok(Vec::new());
    }

    base64::engine::general_purpose::STANDARD
        .decode(&cleaned)
        .map_err(|_| ConversionError::new("not a valid base64 encoding").with_value(format!("{:?}", value)))
}

/// Encode bytes as base64 text
pub fn rust_to_base64(value: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(value)
}
