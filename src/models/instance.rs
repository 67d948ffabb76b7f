//! Model instances
//!
//! An [`Instance`] holds the native values of one record shaped by a
//! [`Model`]. Construction converts every declared field from an ordered
//! mapping; validation walks the whole tree and aggregates every violation
//! into one [`ErrorMap`].

use super::schema::{Model, UnknownKeys};
use crate::converters::{classify_key, collect_declarations, is_schema_location, Context, KeyKind};
use crate::error::{join_path, ConversionError, Error, ModelValidationError, Result};
use crate::error_map::{ErrorMap, EXTRA_KEY};
use crate::fields::{Field, Placement};
use crate::validators::{IdentityStore, ValidityStatus};
use crate::values::{Native, OrderedMap, Value};
use indexmap::{IndexMap, IndexSet};
use log::debug;
use std::sync::Arc;

type Conversion<T> = std::result::Result<T, ConversionError>;

/// Deferred key of a failure of the whole instance; field names are never empty
const REJECTED_KEY: &str = "";

/// One record of a model
#[derive(Debug, Clone)]
pub struct Instance {
    model: Arc<Model>,
    values: IndexMap<String, Native>,
    /// Preserved unknown keys
    extra: OrderedMap,
    /// Conversion failures deferred by lax construction, by field name, `_extra`,
    /// or the empty key for a rejected collection element
    deferred: IndexMap<String, Vec<ConversionError>>,
    /// Namespace declarations `(prefix, uri)` found on input or declared
    namespaces: Vec<(String, String)>,
    status: ValidityStatus,
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.is_instance_of(&other.model)
            && self.values == other.values
            && self.extra == other.extra
            && self.deferred == other.deferred
            && self.namespaces == other.namespaces
    }
}

impl Instance {
    /// Create an empty instance; no default is applied
    pub fn new(model: &Arc<Model>) -> Self {
        Self {
            model: Arc::clone(model),
            values: IndexMap::new(),
            extra: OrderedMap::new(),
            deferred: IndexMap::new(),
            namespaces: Vec::new(),
            status: ValidityStatus::NotKnown,
        }
    }

    /// Convert a primitive value into an instance of `model`
    ///
    /// A mapping is converted field by field; null stands for an empty
    /// mapping and a scalar for the text content. In strict mode the first
    /// conversion failure is returned with its path; in lax mode failures
    /// are kept on the instance and reported by [`Instance::validate`].
    pub fn from_value(model: &Arc<Model>, value: &Value, ctx: &Context) -> Conversion<Self> {
        match value {
            Value::Map(map) => Self::from_map(model, map, ctx),
            Value::Null => Self::from_map(model, &OrderedMap::new(), ctx),
            Value::Seq(_) => Err(ConversionError::new(format!(
                "expected a mapping for model {}",
                model.name()
            ))
            .with_value(value.to_string())),
            scalar => {
                let mut map = OrderedMap::new();
                map.insert(ctx.config().text_key().to_string(), scalar.clone());
                Self::from_map(model, &map, ctx)
            }
        }
    }

    /// Placeholder for a collection element that could not be converted
    ///
    /// The failure is reported at the element's own path.
    pub(crate) fn rejected(model: &Arc<Model>, error: ConversionError) -> Self {
        let mut instance = Self::new(model);
        instance.defer(REJECTED_KEY, error);
        instance
    }

    fn from_map(model: &Arc<Model>, map: &OrderedMap, ctx: &Context) -> Conversion<Self> {
        let config = ctx.config();
        let declarations =
            collect_declarations(config, map).map_err(|e| ConversionError::new(e.to_string()))?;
        let ctx = ctx.declaring(&declarations);
        let strict = ctx.mode().is_strict();

        let mut instance = Instance::new(model);
        instance.namespaces = declarations;
        let mut consumed: IndexSet<&str> = IndexSet::new();

        for (name, field) in model.fields() {
            let (key, value) = lookup(map, name, field, model.namespace(), &ctx);
            if let Some(key) = key {
                consumed.insert(key);
            }
            if strict {
                if let Some(native) = field.to_native(value, &ctx).map_err(|e| e.prefixed(name))? {
                    instance.insert(name, native);
                }
                continue;
            }
            let (native, failures) = field.to_native_lax(value, &ctx);
            if let Some(native) = native {
                instance.insert(name, native);
            }
            for e in failures {
                debug!("Deferring conversion error of {}.{}: {}", model.name(), name, e);
                instance.defer(name, e);
            }
        }

        let mut elements = Vec::new();
        let mut attributes = Vec::new();
        for (key, value) in map {
            if consumed.contains(key.as_str()) {
                continue;
            }
            let kind = classify_key(config, key).map_err(|e| ConversionError::new(e.to_string()))?;
            match kind {
                KeyKind::Declaration(_) => {}
                KeyKind::Attribute(name) if is_schema_location(&ctx, name) => {}
                KeyKind::Attribute(_) => attributes.push((key, value)),
                KeyKind::Element(_) | KeyKind::Text => elements.push((key, value)),
            }
        }

        let options = model.options();
        instance.unknown_keys(options.unknown_elements, "element", elements, strict)?;
        instance.unknown_keys(options.unknown_attributes, "attribute", attributes, strict)?;

        Ok(instance)
    }

    fn unknown_keys(
        &mut self,
        policy: UnknownKeys,
        what: &str,
        keys: Vec<(&String, &Value)>,
        strict: bool,
    ) -> Conversion<()> {
        if keys.is_empty() {
            return Ok(());
        }
        match policy {
            UnknownKeys::Ignore => {
                for (key, _) in keys {
                    debug!("Ignoring unknown {} '{}' of model {}", what, key, self.model.name());
                }
            }
            UnknownKeys::Preserve => {
                for (key, value) in keys {
                    self.extra.insert(key.clone(), value.clone());
                }
            }
            UnknownKeys::Reject => {
                let names: Vec<&str> = keys.iter().map(|(key, _)| key.as_str()).collect();
                let error = ConversionError::new(format!(
                    "Found extra {} fields: {}",
                    what,
                    names.join(", ")
                ));
                if strict {
                    return Err(error.with_path(EXTRA_KEY));
                }
                self.defer(EXTRA_KEY, error);
            }
        }
        Ok(())
    }

    fn defer(&mut self, name: &str, error: ConversionError) {
        self.deferred.entry(name.to_string()).or_default().push(error);
        self.status = ValidityStatus::NotKnown;
    }

    pub(crate) fn insert(&mut self, name: &str, value: Native) {
        self.values.insert(name.to_string(), value);
        self.status = ValidityStatus::NotKnown;
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The model of this instance
    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// Check if this is an instance of `model`
    pub fn is_instance_of(&self, model: &Arc<Model>) -> bool {
        Arc::ptr_eq(&self.model, model) || self.model.name() == model.name()
    }

    /// Native value of a field
    pub fn get(&self, name: &str) -> Option<&Native> {
        self.values.get(name)
    }

    /// Mutable native value of a field
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Native> {
        self.status = ValidityStatus::NotKnown;
        self.values.get_mut(name)
    }

    /// Set a field from a primitive value, converted strictly
    ///
    /// Null removes the value (or restores the default). Unknown names are
    /// kept as extra keys when the model preserves unknown elements.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let model = Arc::clone(&self.model);
        let Some(field) = model.field(name) else {
            if model.options().unknown_elements == UnknownKeys::Preserve {
                self.extra.insert(name.to_string(), value);
                self.status = ValidityStatus::NotKnown;
                return Ok(());
            }
            return Err(self.unknown_field(name));
        };

        let ctx = Context::strict().declaring(&self.namespaces);
        let native = field
            .to_native(Some(&value), &ctx)
            .map_err(|e| e.prefixed(name))?;
        self.deferred.shift_remove(name);
        match native {
            Some(native) => self.insert(name, native),
            None => {
                self.values.shift_remove(name);
                self.status = ValidityStatus::NotKnown;
            }
        }
        Ok(())
    }

    /// Set a field to a native value without conversion
    ///
    /// A value of the wrong type is reported by `validate`.
    pub fn set_native(&mut self, name: &str, value: impl Into<Native>) -> Result<()> {
        if self.model.field(name).is_none() {
            return Err(self.unknown_field(name));
        }
        self.deferred.shift_remove(name);
        self.insert(name, value.into());
        Ok(())
    }

    /// Remove the value of a field
    pub fn remove(&mut self, name: &str) -> Option<Native> {
        self.deferred.shift_remove(name);
        self.status = ValidityStatus::NotKnown;
        self.values.shift_remove(name)
    }

    fn unknown_field(&self, name: &str) -> Error {
        Error::Key(format!("model {} has no field '{}'", self.model.name(), name))
    }

    /// Fields holding a value, in declaration order of the values
    pub fn values(&self) -> impl Iterator<Item = (&str, &Native)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Unknown keys kept by a preserving model
    pub fn extra(&self) -> &OrderedMap {
        &self.extra
    }

    /// Declare a namespace prefix, written as `xmlns:prefix` on output
    ///
    /// An empty prefix declares the default namespace.
    pub fn declare_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        let prefix = prefix.into();
        let uri = uri.into();
        match self.namespaces.iter_mut().find(|(p, _)| *p == prefix) {
            Some(entry) => entry.1 = uri,
            None => self.namespaces.push((prefix, uri)),
        }
    }

    /// Namespace declarations `(prefix, uri)`
    pub fn namespaces(&self) -> &[(String, String)] {
        &self.namespaces
    }

    /// Check if lax construction deferred any conversion failure
    pub fn has_conversion_errors(&self) -> bool {
        !self.deferred.is_empty()
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate the whole instance tree
    ///
    /// Every field is checked; the aggregate error carries every violation
    /// keyed by path. Calling it again on unchanged data gives the same result.
    pub fn validate(&mut self) -> std::result::Result<(), ModelValidationError> {
        let errors = self.errors();
        if errors.is_empty() {
            self.status = ValidityStatus::Valid;
            return Ok(());
        }
        self.status = ValidityStatus::Invalid;
        debug!(
            "{} failed validation: {} message(s) at {} path(s)",
            self.model.name(),
            errors.message_count(),
            errors.len()
        );
        Err(ModelValidationError::new(self.model.name(), errors))
    }

    /// Every violation of the instance tree, keyed by path
    pub fn errors(&self) -> ErrorMap {
        let mut errors = ErrorMap::new();
        let mut ids = IdentityStore::new();
        self.collect_into("", &mut errors, &mut ids);
        ids.report(&mut errors);
        errors
    }

    /// Check validity without recording the status
    pub fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }

    /// Outcome of the last `validate` call, `NotKnown` after a mutation
    pub fn status(&self) -> ValidityStatus {
        self.status
    }

    /// Record the violations of this instance under `prefix`
    pub(crate) fn collect_into(&self, prefix: &str, errors: &mut ErrorMap, ids: &mut IdentityStore) {
        if let Some(failures) = self.deferred.get(REJECTED_KEY) {
            for failure in failures {
                errors.add(join_path(prefix, &failure.path), failure.summary());
            }
            return;
        }

        for (kind, name) in self.model.scopes() {
            ids.open_scope(*kind, name, prefix);
        }

        for (name, field) in self.model.fields() {
            let path = join_path(prefix, name);
            match self.deferred.get(name) {
                Some(failures) => {
                    for failure in failures {
                        errors.add(join_path(&path, &failure.path), failure.summary());
                    }
                }
                None => field.collect(&path, self.values.get(name), errors, ids),
            }
        }

        if let Some(sequence) = self.model.sequence() {
            let matched = sequence.match_tags(&self.present_elements());
            for (tag, messages) in matched.errors.into_inner() {
                // a missing required field already reports `required`
                let reported = self
                    .model
                    .field(&tag)
                    .is_some_and(|field| field.is_required())
                    && !self.values.contains_key(&tag)
                    && !self.deferred.contains_key(&tag);
                if !reported {
                    errors.extend(&join_path(prefix, &tag), messages);
                }
            }
        }

        if let Some(failures) = self.deferred.get(EXTRA_KEY) {
            let path = join_path(prefix, EXTRA_KEY);
            for failure in failures {
                errors.add(path.as_str(), failure.summary());
            }
        }
    }

    /// Element fields holding a value with their occurrence counts
    fn present_elements(&self) -> IndexMap<String, usize> {
        self.model
            .fields()
            .filter(|(_, field)| field.placement() == Placement::Element)
            .filter_map(|(name, _)| {
                let count = match self.values.get(name) {
                    Some(value) => Field::occurrences(value),
                    None if self.deferred.contains_key(name) => 1,
                    None => 0,
                };
                (count > 0).then(|| (name.to_string(), count))
            })
            .collect()
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Render as an ordered mapping under a context
    ///
    /// Namespace declarations come first. Fields follow in declaration
    /// order, or for a model with a sequence: attributes, text, then
    /// elements in sequence order. Preserved unknown keys come last.
    pub fn to_primitive_with(&self, ctx: &Context) -> Conversion<OrderedMap> {
        let ctx = ctx.declaring(&self.namespaces);
        let config = ctx.config();
        let mut output = OrderedMap::new();

        for (prefix, uri) in &self.namespaces {
            let name = if prefix.is_empty() {
                "xmlns".to_string()
            } else {
                format!("xmlns:{}", prefix)
            };
            output.insert(config.attribute_key(&name), Value::Str(uri.clone()));
        }

        for name in self.output_order() {
            let Some(field) = self.model.field(name) else {
                continue;
            };
            if !field.is_visible(ctx.role()) {
                continue;
            }
            if let Some(value) = self.values.get(name) {
                let key = field.key(name, self.model.namespace(), &ctx);
                let primitive = field.to_primitive(value, &ctx).map_err(|e| e.prefixed(name))?;
                output.insert(key, primitive);
            }
        }

        for (key, value) in &self.extra {
            if !output.contains_key(key) {
                output.insert(key.clone(), value.clone());
            }
        }

        Ok(output)
    }

    fn output_order(&self) -> Vec<&str> {
        let Some(sequence) = self.model.sequence() else {
            return self.model.fields().map(|(name, _)| name).collect();
        };

        let mut order: Vec<&str> = Vec::new();
        for placement in [Placement::Attribute, Placement::Text] {
            order.extend(
                self.model
                    .fields()
                    .filter(|(_, field)| field.placement() == placement)
                    .map(|(name, _)| name),
            );
        }

        let matched = sequence.match_tags(&self.present_elements());
        let mut elements: IndexSet<&str> = matched
            .order
            .iter()
            .filter_map(|tag| {
                self.model
                    .fields()
                    .find(|(name, _)| *name == tag.as_str())
                    .map(|(name, _)| name)
            })
            .collect();
        // empty collections are not matched but still written
        for (name, field) in self.model.fields() {
            if field.placement() == Placement::Element {
                elements.insert(name);
            }
        }
        order.extend(elements);
        order
    }

    /// Render as an ordered mapping, filtered for `role`
    pub fn to_primitive(&self, role: Option<&str>) -> Result<OrderedMap> {
        Ok(self.to_primitive_with(&Context::new().with_role(role))?)
    }

    /// Render as JSON text, filtered for `role`
    pub fn to_json_string(&self, role: Option<&str>) -> Result<String> {
        Value::Map(self.to_primitive(role)?).to_json_string()
    }

    /// Render as a document mapping `{root: {...}}`, filtered for `role`
    pub fn to_document(&self, role: Option<&str>) -> Result<Value> {
        let ctx = Context::new().with_role(role);
        let content = self.to_primitive_with(&ctx)?;
        let scope = ctx.declaring(&self.namespaces);
        let root = format!(
            "{}{}",
            scope.namespaces().qualifier(self.model.namespace()),
            self.model.root()
        );
        Ok(Value::map([(root, Value::Map(content))]))
    }
}

/// Find the input key of a field
///
/// Element keys qualified by a namespace prefix fall back to the bare name.
fn lookup<'m>(
    map: &'m OrderedMap,
    name: &str,
    field: &Field,
    namespace: Option<&str>,
    ctx: &Context,
) -> (Option<&'m str>, Option<&'m Value>) {
    let key = field.key(name, namespace, ctx);
    if let Some((key, value)) = map.get_key_value(key.as_str()) {
        return (Some(key.as_str()), Some(value));
    }
    if field.placement() == Placement::Element {
        let base = field.source_key().unwrap_or(name);
        if let Some((key, value)) = map.get_key_value(base) {
            return (Some(key.as_str()), Some(value));
        }
    }
    (None, None)
}
