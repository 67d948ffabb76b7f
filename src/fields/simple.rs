//! Scalar field kinds
//!
//! Conversion rules between primitive scalars and the native value of
//! each scalar kind. Composite kinds are delegated to `composite`.

use super::{composite, FieldKind};
use crate::converters::Context;
use crate::error::ConversionError;
use crate::validators::helpers::{
    base64_to_rust, boolean_to_rust, decimal_to_rust, float_to_rust, int_to_rust,
    integral_float_to_rust, rust_to_base64, rust_to_fixed_float, rust_to_float,
};
use crate::validators::TemporalKind;
use crate::values::{Native, Value};
use rust_decimal::Decimal;
use url::Url;

type Result<T> = std::result::Result<T, ConversionError>;

fn unconvertible(target: &str, value: &Value) -> ConversionError {
    ConversionError::new(format!("could not convert to {}", target)).with_value(value.to_string())
}

fn expect_str(value: &Value) -> Result<&str> {
    value
        .as_str()
        .ok_or_else(|| ConversionError::new("expecting a string").with_value(value.to_string()))
}

fn to_boolean(value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Str(s) => boolean_to_rust(s),
        Value::Int(i) => Ok(*i > 0),
        Value::Float(f) => Ok(*f > 0.0),
        other => Err(unconvertible("boolean", other)),
    }
}

fn to_integer(value: &Value) -> Result<i64> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Str(s) => int_to_rust(s),
        Value::Float(f) => integral_float_to_rust(*f),
        other => Err(unconvertible("integer", other)),
    }
}

fn to_float(value: &Value) -> Result<f64> {
    match value {
        Value::Float(f) => Ok(*f),
        Value::Int(i) => Ok(*i as f64),
        Value::Str(s) => float_to_rust(s),
        other => Err(unconvertible("float", other)),
    }
}

fn to_decimal(value: &Value) -> Result<Decimal> {
    match value {
        Value::Str(s) => decimal_to_rust(s),
        Value::Int(i) => Ok(Decimal::from(*i)),
        Value::Float(f) => Decimal::try_from(*f).map_err(|_| unconvertible("decimal", value)),
        other => Err(unconvertible("decimal", other)),
    }
}

impl FieldKind {
    /// Convert a non-null primitive value
    pub(super) fn convert(&self, value: &Value, ctx: &Context) -> Result<Native> {
        match self {
            FieldKind::Boolean => to_boolean(value).map(Native::Bool),
            FieldKind::Integer => to_integer(value).map(Native::Int),
            FieldKind::Float { .. } => to_float(value).map(Native::Float),
            FieldKind::Decimal => to_decimal(value).map(Native::Decimal),
            FieldKind::Text { strip, .. } => {
                let text = expect_str(value)?;
                let text = if *strip { text.trim() } else { text };
                Ok(Native::Text(text.to_string()))
            }
            FieldKind::Enumeration {
                options,
                case_sensitive,
            } => {
                let text = expect_str(value)?.trim();
                let canonical = if *case_sensitive {
                    None
                } else {
                    options.iter().find(|o| o.eq_ignore_ascii_case(text))
                };
                Ok(Native::Text(
                    canonical.cloned().unwrap_or_else(|| text.to_string()),
                ))
            }
            FieldKind::Temporal { kind, formats } => {
                let text = expect_str(value)?;
                match kind {
                    TemporalKind::DateTime => formats.parse_datetime(text).map(Native::DateTime),
                    TemporalKind::Date => formats.parse_date(text).map(Native::Date),
                    TemporalKind::Time => formats.parse_time(text).map(Native::Time),
                }
            }
            FieldKind::Url => {
                let text = expect_str(value)?;
                Url::parse(text.trim()).map(Native::Url).map_err(|e| {
                    ConversionError::new(format!("not a valid URL: {}", e))
                        .with_value(value.to_string())
                })
            }
            FieldKind::Base64 => base64_to_rust(expect_str(value)?).map(Native::Bytes),
            FieldKind::Model(model) => {
                composite::to_instance(model, value, ctx).map(|i| Native::Instance(Box::new(i)))
            }
            FieldKind::Models(model) => {
                composite::to_instances(model, value, ctx).map(Native::Instances)
            }
            FieldKind::Choice(members) => composite::to_items(members, value, ctx).map(Native::Items),
        }
    }

    /// Render a native value already known to have this kind's type
    pub(super) fn render(&self, value: &Native, ctx: &Context) -> Result<Value> {
        let rendered = match (self, value) {
            (FieldKind::Boolean, Native::Bool(b)) => Value::Bool(*b),
            (FieldKind::Integer, Native::Int(i)) => Value::Int(*i),
            (FieldKind::Float { precision }, Native::Float(f)) => match precision {
                Some(decimals) => Value::Str(rust_to_fixed_float(*f, *decimals)),
                None if f.is_finite() => Value::Float(*f),
                None => Value::Str(rust_to_float(*f)),
            },
            (FieldKind::Decimal, Native::Decimal(d)) => Value::Str(d.to_string()),
            (FieldKind::Text { .. } | FieldKind::Enumeration { .. }, Native::Text(s)) => {
                Value::Str(s.clone())
            }
            (FieldKind::Temporal { formats, .. }, Native::DateTime(dt)) => {
                Value::Str(formats.format_datetime(dt))
            }
            (FieldKind::Temporal { formats, .. }, Native::Date(d)) => {
                Value::Str(formats.format_date(d))
            }
            (FieldKind::Temporal { formats, .. }, Native::Time(t)) => {
                Value::Str(formats.format_time(t))
            }
            (FieldKind::Url, Native::Url(url)) => Value::Str(url.to_string()),
            (FieldKind::Base64, Native::Bytes(bytes)) => Value::Str(rust_to_base64(bytes)),
            (FieldKind::Model(_), Native::Instance(instance)) => {
                composite::from_instance(instance, ctx)?
            }
            (FieldKind::Models(_), Native::Instances(instances)) => {
                composite::from_instances(instances, ctx)?
            }
            (FieldKind::Choice(members), Native::Items(items)) => {
                composite::from_items(members, items, ctx)?
            }
            (kind, value) => {
                return Err(ConversionError::new(format!(
                    "expected {} value, got {}",
                    kind.type_name(),
                    value.type_name()
                )))
            }
        };
        Ok(rendered)
    }
}
