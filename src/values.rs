//! Primitive and native value representations
//!
//! [`Value`] is the wire-level shape: what an XML-to-mapping tokenizer or a
//! JSON reader produces and what an encoder consumes. Maps are ordered.
//! [`Native`] is the typed in-memory value a field converts to.

use crate::error::Result;
use crate::models::Instance;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Ordered mapping of keys to primitive values
pub type OrderedMap = IndexMap<String, Value>;

/// A primitive (wire-level) value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null / absent
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// String
    Str(String),
    /// Ordered sequence
    Seq(Vec<Value>),
    /// Ordered mapping
    Map(OrderedMap),
}

impl Value {
    /// Build a map value from key/value pairs, keeping their order
    pub fn map<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Parse JSON text, keeping object key order
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Render as JSON text, keeping map key order
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check for null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as an ordered map
    pub fn as_map(&self) -> Option<&OrderedMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Borrow as a sequence
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(s) => Some(s),
            _ => None,
        }
    }

    /// Check for a scalar (not a sequence or mapping)
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Seq(_) | Value::Map(_))
    }

    /// Short type name for messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Seq(_) => "sequence",
            Value::Map(_) => "mapping",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Seq(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", key, item)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Seq(items)
    }
}

impl From<OrderedMap> for Value {
    fn from(map: OrderedMap) -> Self {
        Value::Map(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

/// One element of a choice collection: the member that accepted it and
/// the converted value
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceItem {
    /// Name of the accepting choice member
    pub member: String,
    /// Converted value
    pub value: Native,
}

impl ChoiceItem {
    /// Create a new choice item
    pub fn new(member: impl Into<String>, value: Native) -> Self {
        Self {
            member: member.into(),
            value,
        }
    }
}

/// A typed in-memory value
///
/// Equality treats every float NaN as equal to itself.
#[derive(Debug, Clone)]
pub enum Native {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Arbitrary precision decimal
    Decimal(Decimal),
    /// Text
    Text(String),
    /// Date and time without offset
    DateTime(NaiveDateTime),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// Absolute URL
    Url(Url),
    /// Binary data
    Bytes(Vec<u8>),
    /// Nested model instance (exclusively owned)
    Instance(Box<Instance>),
    /// Ordered collection of nested model instances
    Instances(Vec<Instance>),
    /// Ordered collection of choice members
    Items(Vec<ChoiceItem>),
}

impl PartialEq for Native {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Native::Bool(a), Native::Bool(b)) => a == b,
            (Native::Int(a), Native::Int(b)) => a == b,
            (Native::Float(a), Native::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Native::Decimal(a), Native::Decimal(b)) => a == b,
            (Native::Text(a), Native::Text(b)) => a == b,
            (Native::DateTime(a), Native::DateTime(b)) => a == b,
            (Native::Date(a), Native::Date(b)) => a == b,
            (Native::Time(a), Native::Time(b)) => a == b,
            (Native::Url(a), Native::Url(b)) => a == b,
            (Native::Bytes(a), Native::Bytes(b)) => a == b,
            (Native::Instance(a), Native::Instance(b)) => a == b,
            (Native::Instances(a), Native::Instances(b)) => a == b,
            (Native::Items(a), Native::Items(b)) => a == b,
            _ => false,
        }
    }
}

impl Native {
    /// Short type name for messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Native::Bool(_) => "boolean",
            Native::Int(_) => "integer",
            Native::Float(_) => "float",
            Native::Decimal(_) => "decimal",
            Native::Text(_) => "text",
            Native::DateTime(_) => "datetime",
            Native::Date(_) => "date",
            Native::Time(_) => "time",
            Native::Url(_) => "url",
            Native::Bytes(_) => "bytes",
            Native::Instance(_) => "model instance",
            Native::Instances(_) => "model collection",
            Native::Items(_) => "choice collection",
        }
    }

    /// Get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Native::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Native::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Native::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as decimal
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Native::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Borrow as text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Native::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get as datetime
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Native::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Get as date
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Native::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Get as time
    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            Native::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// Borrow as URL
    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Native::Url(u) => Some(u),
            _ => None,
        }
    }

    /// Borrow as bytes
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Native::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Borrow as a nested instance
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Native::Instance(i) => Some(i),
            _ => None,
        }
    }

    /// Mutably borrow as a nested instance
    pub fn as_instance_mut(&mut self) -> Option<&mut Instance> {
        match self {
            Native::Instance(i) => Some(i),
            _ => None,
        }
    }

    /// Borrow as a collection of instances
    pub fn as_instances(&self) -> Option<&[Instance]> {
        match self {
            Native::Instances(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow as a collection of choice items
    pub fn as_items(&self) -> Option<&[ChoiceItem]> {
        match self {
            Native::Items(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Native {
    fn from(b: bool) -> Self {
        Native::Bool(b)
    }
}

impl From<i64> for Native {
    fn from(i: i64) -> Self {
        Native::Int(i)
    }
}

impl From<f64> for Native {
    fn from(v: f64) -> Self {
        Native::Float(v)
    }
}

impl From<&str> for Native {
    fn from(s: &str) -> Self {
        Native::Text(s.to_string())
    }
}

impl From<String> for Native {
    fn from(s: String) -> Self {
        Native::Text(s)
    }
}

impl From<Instance> for Native {
    fn from(instance: Instance) -> Self {
        Native::Instance(Box::new(instance))
    }
}
