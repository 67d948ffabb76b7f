//! # xmodels
//!
//! Declarative data models for converting and validating XML-derived
//! ordered mappings.
//!
//! A [`Model`] is an ordered set of named [`Field`]s. Each field converts a
//! primitive value (string, number, boolean, null, nested mapping or
//! sequence) to a typed native value and back, and reports every
//! constraint violation of that value. A model instance aggregates the
//! violations of all its fields, nested models included, into one
//! [`ErrorMap`] keyed by path.
//!
//! ## Features
//!
//! - Scalar fields: boolean, integer, float, decimal, text and its lexical
//!   refinements, enumeration, date-time, date, time, URL, base64
//! - Facets: bounds, lengths, patterns, allowed values
//! - Composite fields: nested model, collection of models, choice collection
//! - XML conventions: attributes, text content, namespaces, sequence and
//!   choice content models, ID / IDREF
//! - Strict or lax construction, role-filtered output
//!
//! ## Example
//!
//! ```rust
//! use xmodels::{Field, Model, Value};
//!
//! let person = Model::builder("Person")
//!     .field("name", Field::text().required())
//!     .field("age", Field::integer().min(0))
//!     .build()
//!     .unwrap();
//!
//! let mut joe = person
//!     .from_primitive(&Value::map([("name", Value::from("Joe")), ("age", Value::from(-5))]))
//!     .unwrap();
//!
//! let err = joe.validate().unwrap_err();
//! assert_eq!(err.errors().get("age").unwrap(), ["must be >= 0"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod converters;
pub mod error;
pub mod error_map;
pub mod fields;
pub mod models;
pub mod names;
pub mod namespaces;
pub mod schemata;
pub mod validators;
pub mod values;

// Re-exports for convenience
pub use converters::{Context, ConversionMode, ConverterConfig};
pub use error::{ConversionError, Error, ModelValidationError, Result};
pub use error_map::ErrorMap;
pub use fields::{Field, FieldKind, Placement, Visibility};
pub use models::{Instance, Model, ModelBuilder, ModelOptions, UnknownKeys};
pub use validators::{Choice, Occurs, Sequence, SequenceElement, ValidityStatus};
pub use values::{ChoiceItem, Native, OrderedMap, Value};

/// Version of the xmodels library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XML Schema instance namespace
pub use namespaces::XSI_NAMESPACE;
