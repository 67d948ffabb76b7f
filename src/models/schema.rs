//! Model definitions
//!
//! A [`Model`] is a named, ordered collection of fields built once with a
//! [`ModelBuilder`] and shared behind an `Arc` by every instance and by
//! the fields of enclosing models.

use super::instance::Instance;
use crate::converters::Context;
use crate::error::{Error, Result};
use crate::fields::{Field, Placement};
use crate::names::split_qname;
use crate::validators::{ConstraintKind, Sequence};
use crate::values::Value;
use indexmap::{IndexMap, IndexSet};
use log::debug;
use std::fmt;
use std::sync::Arc;

/// Policy for input keys no field claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeys {
    /// Drop them
    #[default]
    Ignore,
    /// Raise in strict mode, report under `_extra` in lax mode
    Reject,
    /// Keep them on the instance and write them back after the declared fields
    Preserve,
}

impl UnknownKeys {
    /// Parse from string
    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "ignore" => Ok(UnknownKeys::Ignore),
            "reject" => Ok(UnknownKeys::Reject),
            "preserve" => Ok(UnknownKeys::Preserve),
            _ => Err(Error::Value(format!(
                "Invalid unknown keys policy: '{}'. Must be 'ignore', 'reject', or 'preserve'",
                s
            ))),
        }
    }

    /// Get as string
    pub fn as_str(&self) -> &'static str {
        match self {
            UnknownKeys::Ignore => "ignore",
            UnknownKeys::Reject => "reject",
            UnknownKeys::Preserve => "preserve",
        }
    }
}

impl fmt::Display for UnknownKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-model options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModelOptions {
    /// Policy for unknown element (and text) keys
    pub unknown_elements: UnknownKeys,
    /// Policy for unknown attribute keys
    pub unknown_attributes: UnknownKeys,
}

impl ModelOptions {
    /// Default options: unknown keys are ignored
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the policy for unknown elements
    pub fn unknown_elements(mut self, policy: UnknownKeys) -> Self {
        self.unknown_elements = policy;
        self
    }

    /// Set the policy for unknown attributes
    pub fn unknown_attributes(mut self, policy: UnknownKeys) -> Self {
        self.unknown_attributes = policy;
        self
    }

    /// Reject unknown elements and attributes
    pub fn reject_unknown() -> Self {
        Self::new()
            .unknown_elements(UnknownKeys::Reject)
            .unknown_attributes(UnknownKeys::Reject)
    }

    /// Preserve unknown elements and attributes
    pub fn preserve_unknown() -> Self {
        Self::new()
            .unknown_elements(UnknownKeys::Preserve)
            .unknown_attributes(UnknownKeys::Preserve)
    }
}

/// A record schema: ordered named fields plus XML metadata
#[derive(Debug)]
pub struct Model {
    name: String,
    namespace: Option<String>,
    root: Option<String>,
    fields: IndexMap<String, Field>,
    sequence: Option<Sequence>,
    scopes: Vec<(ConstraintKind, String)>,
    options: ModelOptions,
}

impl Model {
    /// Start building a model
    pub fn builder(name: impl Into<String>) -> ModelBuilder {
        ModelBuilder::new(name)
    }

    /// Model name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace URI of the model's elements
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Root element name, the model name when not set
    pub fn root(&self) -> &str {
        self.root.as_deref().unwrap_or(&self.name)
    }

    /// Fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the model has no field
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Content model of the element fields
    pub fn sequence(&self) -> Option<&Sequence> {
        self.sequence.as_ref()
    }

    /// Key and uniqueness scopes opened by every instance of this model
    pub fn scopes(&self) -> &[(ConstraintKind, String)] {
        &self.scopes
    }

    /// Model options
    pub fn options(&self) -> ModelOptions {
        self.options
    }

    /// Create an instance holding only the field defaults
    pub fn new_instance(self: &Arc<Self>) -> Instance {
        let ctx = Context::new();
        let mut instance = Instance::new(self);
        for (name, field) in self.fields() {
            // defaults were checked at build time
            if let Ok(Some(value)) = field.to_native(None, &ctx) {
                instance.insert(name, value);
            }
        }
        instance
    }

    /// Construct an instance from a primitive value (lax conversion)
    pub fn from_primitive(self: &Arc<Self>, value: &Value) -> Result<Instance> {
        self.from_primitive_with(value, &Context::new())
    }

    /// Construct an instance from a primitive value under a context
    pub fn from_primitive_with(self: &Arc<Self>, value: &Value, ctx: &Context) -> Result<Instance> {
        Ok(Instance::from_value(self, value, ctx)?)
    }

    /// Construct an instance from JSON text (lax conversion)
    pub fn from_json_str(self: &Arc<Self>, text: &str) -> Result<Instance> {
        self.from_primitive(&Value::from_json_str(text)?)
    }

    /// Construct an instance from a document mapping `{root: {...}}`
    ///
    /// The root key may carry a namespace prefix.
    pub fn from_document(self: &Arc<Self>, document: &Value) -> Result<Instance> {
        self.from_document_with(document, &Context::new())
    }

    /// Construct an instance from a document mapping under a context
    pub fn from_document_with(self: &Arc<Self>, document: &Value, ctx: &Context) -> Result<Instance> {
        let map = document
            .as_map()
            .ok_or_else(|| Error::Value(format!("expected a document mapping, got {}", document.type_name())))?;
        let root = self.root();
        let content = map
            .iter()
            .find(|(key, _)| split_qname(key).1 == root)
            .map(|(_, content)| content)
            .ok_or_else(|| Error::Key(format!("root element '{}' not found", root)))?;
        self.from_primitive_with(content, ctx)
    }
}

/// Builder for [`Model`]
#[derive(Debug)]
pub struct ModelBuilder {
    name: String,
    namespace: Option<String>,
    root: Option<String>,
    fields: Vec<(String, Field)>,
    sequence: Option<Sequence>,
    scopes: Vec<(ConstraintKind, String)>,
    options: ModelOptions,
}

impl ModelBuilder {
    /// Create a builder for a model named `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            root: None,
            fields: Vec::new(),
            sequence: None,
            scopes: Vec::new(),
            options: ModelOptions::default(),
        }
    }

    /// Declare a field; declaration order is the output order
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.push((name.into(), field));
        self
    }

    /// Declare a field bound to an attribute
    pub fn attribute(self, name: impl Into<String>, field: Field) -> Self {
        self.field(name, field.attribute())
    }

    /// Declare a field bound to the text content
    pub fn text(self, name: impl Into<String>, field: Field) -> Self {
        self.field(name, field.text_content())
    }

    /// Namespace URI of the model's elements
    pub fn namespace(mut self, uri: impl Into<String>) -> Self {
        self.namespace = Some(uri.into());
        self
    }

    /// Root element name
    pub fn root(mut self, name: impl Into<String>) -> Self {
        self.root = Some(name.into());
        self
    }

    /// Content model of the element fields
    pub fn sequence(mut self, sequence: Sequence) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Open a scope for key `name`: `key_name` values below an instance
    /// must be unique within it
    pub fn key(mut self, name: impl Into<String>) -> Self {
        self.scopes.push((ConstraintKind::Key, name.into()));
        self
    }

    /// Open a scope for uniqueness constraint `name`
    pub fn unique(mut self, name: impl Into<String>) -> Self {
        self.scopes.push((ConstraintKind::Unique, name.into()));
        self
    }

    /// Model options
    pub fn options(mut self, options: ModelOptions) -> Self {
        self.options = options;
        self
    }

    fn schema_error(&self, message: impl fmt::Display) -> Error {
        Error::Schema(format!("model {}: {}", self.name, message))
    }

    /// Check the definition and build the model
    pub fn build(self) -> Result<Arc<Model>> {
        if self.name.is_empty() {
            return Err(Error::Schema("model name must not be empty".to_string()));
        }

        let ctx = Context::strict();
        let mut fields = IndexMap::new();
        let mut keys = IndexSet::new();
        let mut text_fields = 0;

        for (name, field) in &self.fields {
            if name.is_empty() {
                return Err(self.schema_error("field name must not be empty"));
            }
            if let Some(problem) = field.problems().first() {
                return Err(self.schema_error(format!("field '{}': {}", name, problem)));
            }
            if let Some(default) = field.default_value() {
                let native = field.to_native(Some(default), &ctx).map_err(|e| {
                    self.schema_error(format!("invalid default of field '{}': {}", name, e))
                })?;
                let violations = field.validate(native.as_ref());
                if !violations.is_empty() {
                    return Err(self.schema_error(format!(
                        "default of field '{}' {}",
                        name,
                        violations.join(", ")
                    )));
                }
            }
            if field.placement() == Placement::Text {
                text_fields += 1;
            }
            if !keys.insert(field.key(name, None, &ctx)) {
                return Err(self.schema_error(format!("field '{}' reuses the key of another field", name)));
            }
            if fields.insert(name.clone(), field.clone()).is_some() {
                return Err(self.schema_error(format!("duplicate field '{}'", name)));
            }
        }
        if text_fields > 1 {
            return Err(self.schema_error("only one field can be bound to the text content"));
        }

        if let Some(sequence) = &self.sequence {
            sequence.validate().map_err(|e| self.schema_error(e))?;
            for tag in sequence.tags() {
                match fields.get(tag) {
                    Some(field) if field.placement() == Placement::Element => {}
                    _ => {
                        return Err(self.schema_error(format!(
                            "sequence tag '{}' is not an element field",
                            tag
                        )))
                    }
                }
            }
        }

        let mut scopes = IndexSet::new();
        for (kind, name) in &self.scopes {
            if name.is_empty() {
                return Err(self.schema_error(format!("{} name must not be empty", kind.as_str())));
            }
            if !scopes.insert((*kind, name.as_str())) {
                return Err(self.schema_error(format!("{} '{}' declared twice", kind.as_str(), name)));
            }
        }

        debug!("Built model {} with {} field(s)", self.name, fields.len());
        Ok(Arc::new(Model {
            name: self.name,
            namespace: self.namespace,
            root: self.root,
            fields,
            sequence: self.sequence,
            scopes: self.scopes,
            options: self.options,
        }))
    }
}
