//! Fields
//!
//! A [`Field`] is the atomic schema unit: a [`FieldKind`] fixing the native
//! and primitive types, plus the options shared by all kinds (required
//! flag, default, allowed choices, placement in the mapping, role
//! visibility) and the facets that narrow the value space.
//!
//! Every field offers the same three operations:
//! - [`Field::to_native`] converts a primitive value, failing with a
//!   [`ConversionError`] when it cannot be parsed
//! - [`Field::validate`] collects every violation of a converted value
//! - [`Field::to_primitive`] renders a native value back

mod composite;
mod simple;

use crate::converters::Context;
use crate::error::ConversionError;
use crate::error_map::ErrorMap;
use crate::models::Model;
use crate::validators::{
    BoundFacet, BoundKind, ConstraintKind, EnumerationFacet, Facet, IdentityStore, KeyConstraint,
    Lexical, LexicalFacet, MaxLengthFacet, MinLengthFacet, NumericBound, PatternFacet,
    TemporalFormats, TemporalKind,
};
use crate::values::{Native, Value};
use log::trace;
use std::sync::Arc;

/// Where a field is found in an XML-derived mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Child element (plain key)
    #[default]
    Element,
    /// Attribute (key with the attribute prefix)
    Attribute,
    /// Text content of an element that also carries attributes
    Text,
}

/// Output visibility of a field for a given role
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Written for every role
    #[default]
    All,
    /// Written only for the listed roles
    Only(Vec<String>),
    /// Written for every role except the listed ones
    Except(Vec<String>),
}

impl Visibility {
    /// Check if a field is written for `role`; no role means no filtering
    pub fn allows(&self, role: Option<&str>) -> bool {
        let Some(role) = role else {
            return true;
        };
        match self {
            Visibility::All => true,
            Visibility::Only(roles) => roles.iter().any(|r| r == role),
            Visibility::Except(roles) => !roles.iter().any(|r| r == role),
        }
    }
}

/// Identity role of a text value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    /// Plain text
    #[default]
    None,
    /// Unique identifier within an instance tree
    Id,
    /// Reference to an identifier of the same tree
    IdRef,
    /// Value of a named key or uniqueness constraint
    Key(KeyConstraint),
    /// Reference to a value of the named key
    KeyRef(String),
}

/// Closed set of field variants
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Boolean
    Boolean,
    /// 64-bit integer
    Integer,
    /// Float, optionally rendered with a fixed number of decimals
    Float {
        /// Decimals on output
        precision: Option<usize>,
    },
    /// Arbitrary precision decimal
    Decimal,
    /// Text
    Text {
        /// Strip leading and trailing whitespace on conversion
        strip: bool,
        /// ID / IDREF role
        identity: Identity,
    },
    /// Text restricted to a fixed set of spellings
    Enumeration {
        /// Declared spellings
        options: Vec<String>,
        /// Match input case-sensitively
        case_sensitive: bool,
    },
    /// Date-time, date or time
    Temporal {
        /// Which temporal value
        kind: TemporalKind,
        /// Parse and output patterns
        formats: TemporalFormats,
    },
    /// Absolute URL
    Url,
    /// Base64 encoded binary
    Base64,
    /// One nested model instance
    Model(Arc<Model>),
    /// Ordered collection of nested model instances
    Models(Arc<Model>),
    /// Ordered collection whose elements each match one named member field
    Choice(Vec<(String, Field)>),
}

impl FieldKind {
    /// Name used in messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Boolean => "boolean",
            FieldKind::Integer => "integer",
            FieldKind::Float { .. } => "float",
            FieldKind::Decimal => "decimal",
            FieldKind::Text { .. } => "text",
            FieldKind::Enumeration { .. } => "enumeration",
            FieldKind::Temporal { kind, .. } => kind.as_str(),
            FieldKind::Url => "url",
            FieldKind::Base64 => "base64",
            FieldKind::Model(_) => "model",
            FieldKind::Models(_) => "model collection",
            FieldKind::Choice(_) => "choice collection",
        }
    }

    /// Check for numeric kinds
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldKind::Integer | FieldKind::Float { .. } | FieldKind::Decimal
        )
    }

    /// Check for kinds with a text native value
    pub fn is_textual(&self) -> bool {
        matches!(self, FieldKind::Text { .. } | FieldKind::Enumeration { .. })
    }

    /// Check for kinds holding nested models or collections
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            FieldKind::Model(_) | FieldKind::Models(_) | FieldKind::Choice(_)
        )
    }

    /// Check if a native value has the type of this kind
    pub fn accepts(&self, value: &Native) -> bool {
        match (self, value) {
            (FieldKind::Boolean, Native::Bool(_))
            | (FieldKind::Integer, Native::Int(_))
            | (FieldKind::Float { .. }, Native::Float(_))
            | (FieldKind::Decimal, Native::Decimal(_))
            | (FieldKind::Text { .. }, Native::Text(_))
            | (FieldKind::Enumeration { .. }, Native::Text(_))
            | (FieldKind::Url, Native::Url(_))
            | (FieldKind::Base64, Native::Bytes(_))
            | (FieldKind::Choice(_), Native::Items(_)) => true,
            (FieldKind::Temporal { kind, .. }, value) => matches!(
                (kind, value),
                (TemporalKind::DateTime, Native::DateTime(_))
                    | (TemporalKind::Date, Native::Date(_))
                    | (TemporalKind::Time, Native::Time(_))
            ),
            (FieldKind::Model(model), Native::Instance(instance)) => instance.is_instance_of(model),
            (FieldKind::Models(model), Native::Instances(instances)) => {
                instances.iter().all(|i| i.is_instance_of(model))
            }
            _ => false,
        }
    }
}

/// A schema field
#[derive(Debug, Clone)]
pub struct Field {
    kind: FieldKind,
    required: bool,
    default: Option<Value>,
    source: Option<String>,
    placement: Placement,
    visibility: Visibility,
    facets: Vec<Arc<dyn Facet>>,
    /// Configuration mistakes, reported when the owning model is built
    problems: Vec<String>,
}

impl Field {
    /// Create a field of the given kind with default options
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            default: None,
            source: None,
            placement: Placement::Element,
            visibility: Visibility::All,
            facets: Vec::new(),
            problems: Vec::new(),
        }
    }

    // =========================================================================
    // Kinds
    // =========================================================================

    /// Boolean field
    pub fn boolean() -> Self {
        Self::new(FieldKind::Boolean)
    }

    /// Integer field
    pub fn integer() -> Self {
        Self::new(FieldKind::Integer)
    }

    /// Integer field with value >= 0
    pub fn non_negative_integer() -> Self {
        Self::integer().min(0)
    }

    /// Integer field with value > 0
    pub fn positive_integer() -> Self {
        Self::integer().min_exclusive(0)
    }

    /// Integer field with value < 0
    pub fn negative_integer() -> Self {
        Self::integer().max_exclusive(0)
    }

    /// Float field
    pub fn float() -> Self {
        Self::new(FieldKind::Float { precision: None })
    }

    /// Float field with value >= 0
    pub fn non_negative_float() -> Self {
        Self::float().min(0.0)
    }

    /// Decimal field
    pub fn decimal() -> Self {
        Self::new(FieldKind::Decimal)
    }

    /// Text field; leading and trailing whitespace is stripped
    pub fn text() -> Self {
        Self::new(FieldKind::Text {
            strip: true,
            identity: Identity::None,
        })
    }

    fn lexical(lexical: Lexical) -> Self {
        Self::text().with_facet(LexicalFacet::new(lexical))
    }

    /// Text with collapsed whitespace
    pub fn token() -> Self {
        Self::lexical(Lexical::Token)
    }

    /// XML Name
    pub fn name() -> Self {
        Self::lexical(Lexical::Name)
    }

    /// XML non-colonized name
    pub fn ncname() -> Self {
        Self::lexical(Lexical::NCName)
    }

    /// Language identifier
    pub fn language() -> Self {
        Self::lexical(Lexical::Language)
    }

    /// Name token
    pub fn nmtoken() -> Self {
        Self::lexical(Lexical::NMToken)
    }

    /// E-mail address
    pub fn email() -> Self {
        Self::lexical(Lexical::Email)
    }

    /// Identifier, unique within a validated instance tree
    pub fn id() -> Self {
        Self::new(FieldKind::Text {
            strip: true,
            identity: Identity::Id,
        })
        .with_facet(LexicalFacet::new(Lexical::NCName))
    }

    /// Reference to an identifier of the same instance tree
    pub fn idref() -> Self {
        Self::new(FieldKind::Text {
            strip: true,
            identity: Identity::IdRef,
        })
        .with_facet(LexicalFacet::new(Lexical::NCName))
    }

    fn keyed(constraint: KeyConstraint) -> Self {
        let mut field = Self::new(FieldKind::Text {
            strip: true,
            identity: Identity::None,
        });
        if constraint.names.iter().all(|name| name.is_empty()) {
            field.problems.push("key names must not be empty".to_string());
        }
        if constraint.level == 0 {
            field.problems.push("key level must be at least 1".to_string());
        }
        field.kind = FieldKind::Text {
            strip: true,
            identity: Identity::Key(constraint),
        };
        field
    }

    /// XML Name that must be present and unique within the nearest open
    /// scope of one of `names`, found `level` path segments up
    pub fn key_name<I, S>(names: I, level: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::keyed(KeyConstraint::new(ConstraintKind::Key, names, level))
            .with_facet(LexicalFacet::new(Lexical::Name).allow_empty())
    }

    /// XML Name, possibly empty, unique within the scope of one of `names`
    /// found `level` path segments up
    pub fn unique_name<I, S>(names: I, level: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::keyed(KeyConstraint::new(ConstraintKind::Unique, names, level))
            .with_facet(LexicalFacet::new(Lexical::Name).allow_empty())
    }

    /// Reference to a value of key `name`, resolved after the whole tree
    /// has been visited
    pub fn key_ref(name: impl Into<String>) -> Self {
        Self::new(FieldKind::Text {
            strip: true,
            identity: Identity::KeyRef(name.into()),
        })
    }

    /// Text fully matching a regular expression
    pub fn regex(pattern: &str) -> Self {
        Self::text().pattern(pattern)
    }

    /// Text restricted to the given spellings, matched case-insensitively
    pub fn enumeration<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        Self::new(FieldKind::Enumeration {
            options: options.clone(),
            case_sensitive: false,
        })
        .choices(options)
    }

    fn temporal(kind: TemporalKind) -> Self {
        Self::new(FieldKind::Temporal {
            kind,
            formats: TemporalFormats::defaults(kind),
        })
    }

    /// Date-time field
    pub fn datetime() -> Self {
        Self::temporal(TemporalKind::DateTime)
    }

    /// Date field
    pub fn date() -> Self {
        Self::temporal(TemporalKind::Date)
    }

    /// Time field
    pub fn time() -> Self {
        Self::temporal(TemporalKind::Time)
    }

    /// Absolute URL field
    pub fn url() -> Self {
        Self::new(FieldKind::Url)
    }

    /// Base64 binary field
    pub fn base64() -> Self {
        Self::new(FieldKind::Base64)
    }

    /// Nested model field
    pub fn model(model: &Arc<Model>) -> Self {
        Self::new(FieldKind::Model(Arc::clone(model)))
    }

    /// Ordered collection of nested models
    pub fn models(model: &Arc<Model>) -> Self {
        Self::new(FieldKind::Models(Arc::clone(model)))
    }

    /// Ordered collection where each element is converted by the first
    /// member field that accepts it
    pub fn choice<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = (S, Field)>,
        S: Into<String>,
    {
        let members: Vec<(String, Field)> = members
            .into_iter()
            .map(|(name, field)| (name.into(), field))
            .collect();
        let mut field = Self::new(FieldKind::Choice(Vec::new()));
        if members.is_empty() {
            field.problems.push("choice field without members".to_string());
        }
        for (name, member) in &members {
            field
                .problems
                .extend(member.problems.iter().map(|p| format!("member '{}': {}", name, p)));
        }
        field.kind = FieldKind::Choice(members);
        field
    }

    /// Ordered collection of values of one field kind
    pub fn list(member: Field) -> Self {
        Self::choice([("item", member)])
    }

    // =========================================================================
    // Options
    // =========================================================================

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Primitive default used when the input has no value
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Restrict values to a fixed set
    ///
    /// The values are converted with the field's rules as configured so far.
    pub fn choices<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        if self.kind.is_composite() {
            self.problems
                .push(format!("choices on a {} field", self.kind.type_name()));
            return self;
        }
        let ctx = Context::strict();
        let mut natives = Vec::new();
        let mut labels = Vec::new();
        for value in values {
            let value = value.into();
            match self.to_native(Some(&value), &ctx) {
                Ok(Some(native)) => {
                    labels.push(match value {
                        Value::Str(s) => s,
                        other => other.to_string(),
                    });
                    natives.push(native);
                }
                Ok(None) => self.problems.push("null is not a valid choice".to_string()),
                Err(e) => self
                    .problems
                    .push(format!("invalid choice: {}", e.summary())),
            }
        }
        self.with_facet(EnumerationFacet::new(natives, labels))
    }

    /// Key in the mapping when it differs from the field name
    pub fn source(mut self, key: impl Into<String>) -> Self {
        self.source = Some(key.into());
        self
    }

    /// Bind the field to an attribute
    pub fn attribute(self) -> Self {
        self.placed(Placement::Attribute)
    }

    /// Bind the field to the text content
    pub fn text_content(self) -> Self {
        self.placed(Placement::Text)
    }

    fn placed(mut self, placement: Placement) -> Self {
        if self.kind.is_composite() {
            self.problems.push(format!(
                "a {} field can only be bound to an element",
                self.kind.type_name()
            ));
        }
        self.placement = placement;
        self
    }

    /// Lower inclusive bound
    pub fn min(self, bound: impl Into<NumericBound>) -> Self {
        self.bound(BoundKind::MinInclusive, bound.into())
    }

    /// Upper inclusive bound
    pub fn max(self, bound: impl Into<NumericBound>) -> Self {
        self.bound(BoundKind::MaxInclusive, bound.into())
    }

    /// Lower exclusive bound
    pub fn min_exclusive(self, bound: impl Into<NumericBound>) -> Self {
        self.bound(BoundKind::MinExclusive, bound.into())
    }

    /// Upper exclusive bound
    pub fn max_exclusive(self, bound: impl Into<NumericBound>) -> Self {
        self.bound(BoundKind::MaxExclusive, bound.into())
    }

    fn bound(mut self, kind: BoundKind, bound: NumericBound) -> Self {
        let facet = BoundFacet::new(kind, bound);
        if !self.kind.is_numeric() {
            self.mistake(facet.name());
            return self;
        }
        self.with_facet(facet)
    }

    /// Minimum length in characters
    pub fn min_length(mut self, length: usize) -> Self {
        if !self.kind.is_textual() {
            self.mistake("minLength");
            return self;
        }
        self.with_facet(MinLengthFacet::new(length))
    }

    /// Maximum length in characters
    pub fn max_length(mut self, length: usize) -> Self {
        if !self.kind.is_textual() {
            self.mistake("maxLength");
            return self;
        }
        self.with_facet(MaxLengthFacet::new(length))
    }

    /// Regular expression the whole text must match
    pub fn pattern(mut self, pattern: &str) -> Self {
        if !self.kind.is_textual() {
            self.mistake("pattern");
            return self;
        }
        match PatternFacet::new(pattern) {
            Ok(facet) => self.with_facet(facet),
            Err(e) => {
                self.problems.push(e.to_string());
                self
            }
        }
    }

    /// Keep leading and trailing whitespace of text
    pub fn no_strip(mut self) -> Self {
        match &mut self.kind {
            FieldKind::Text { strip, .. } => *strip = false,
            _ => self.mistake("strip option"),
        }
        self
    }

    /// Match enumeration spellings case-sensitively
    pub fn case_sensitive(mut self) -> Self {
        match &mut self.kind {
            FieldKind::Enumeration { case_sensitive, .. } => *case_sensitive = true,
            _ => self.mistake("case sensitivity option"),
        }
        self
    }

    /// Fixed number of decimals on output
    pub fn precision(mut self, decimals: usize) -> Self {
        match &mut self.kind {
            FieldKind::Float { precision } => *precision = Some(decimals),
            _ => self.mistake("precision option"),
        }
        self
    }

    /// Replace the temporal parse patterns (tried in order)
    pub fn formats<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match &mut self.kind {
            FieldKind::Temporal { formats, .. } => {
                *formats = formats.clone().with_parse(patterns);
            }
            _ => self.mistake("formats option"),
        }
        self
    }

    /// Replace the temporal output pattern
    pub fn canonical_format(mut self, pattern: impl Into<String>) -> Self {
        match &mut self.kind {
            FieldKind::Temporal { formats, .. } => {
                *formats = formats.clone().with_canonical(pattern);
            }
            _ => self.mistake("canonical format option"),
        }
        self
    }

    /// Write the field only for the listed roles
    pub fn only_for_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.visibility = Visibility::Only(roles.into_iter().map(Into::into).collect());
        self
    }

    /// Never write the field for the listed roles
    pub fn hidden_for_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.visibility = Visibility::Except(roles.into_iter().map(Into::into).collect());
        self
    }

    /// Add a custom facet
    pub fn with_facet(mut self, facet: impl Facet + 'static) -> Self {
        self.facets.push(Arc::new(facet));
        self
    }

    fn mistake(&mut self, what: &str) {
        self.problems
            .push(format!("{} does not apply to {} fields", what, self.kind.type_name()));
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Field kind
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Check if the field is required
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Configured primitive default
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Key override
    pub fn source_key(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Placement in the mapping
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Role visibility
    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    /// Check if the field is written for `role`
    pub fn is_visible(&self, role: Option<&str>) -> bool {
        self.visibility.allows(role)
    }

    /// Facets in declaration order
    pub fn facets(&self) -> &[Arc<dyn Facet>] {
        &self.facets
    }

    /// Configuration mistakes collected while the field was declared
    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    // =========================================================================
    // Conversion and validation
    // =========================================================================

    /// Convert a primitive value to the native type
    ///
    /// Missing input (`None` or null) yields the default when the field is
    /// optional and has one, and `None` otherwise.
    pub fn to_native(
        &self,
        value: Option<&Value>,
        ctx: &Context,
    ) -> Result<Option<Native>, ConversionError> {
        match value {
            None | Some(Value::Null) => match (&self.default, self.required) {
                (Some(default), false) => self.kind.convert(default, ctx).map(Some),
                _ => Ok(None),
            },
            Some(value) => {
                trace!("Converting {} value {}", self.kind.type_name(), value);
                self.kind.convert(value, ctx).map(Some)
            }
        }
    }

    /// Convert without stopping at the first failing collection element
    ///
    /// Every failure is returned with its own path; a choice collection
    /// with any failing element yields no value.
    pub(crate) fn to_native_lax(
        &self,
        value: Option<&Value>,
        ctx: &Context,
    ) -> (Option<Native>, Vec<ConversionError>) {
        if let (FieldKind::Choice(members), Some(value)) = (&self.kind, value) {
            if !matches!(value, Value::Null) {
                return match composite::to_items_lax(members, value, ctx) {
                    Ok(items) => (Some(Native::Items(items)), Vec::new()),
                    Err(failures) => (None, failures),
                };
            }
        }
        match self.to_native(value, ctx) {
            Ok(native) => (native, Vec::new()),
            Err(e) => (None, vec![e]),
        }
    }

    /// Collect every violation of a converted value
    ///
    /// An empty list means the value is valid. Nested models and
    /// collection elements are not visited here; a model's `validate`
    /// does that.
    pub fn validate(&self, value: Option<&Native>) -> Vec<String> {
        let Some(value) = value else {
            return if self.required {
                vec!["required".to_string()]
            } else {
                Vec::new()
            };
        };
        if !self.kind.accepts(value) {
            return vec![format!("expected {} value", self.kind.type_name())];
        }

        let mut violations = Vec::new();
        if let (FieldKind::Text { strip: true, .. }, Native::Text(text)) = (&self.kind, value) {
            if text.trim() != text {
                violations.push("surrounding whitespace must be stripped".to_string());
            }
        }
        violations.extend(self.facets.iter().filter_map(|f| f.check(value)));
        if let (FieldKind::Choice(members), Native::Items(items)) = (&self.kind, value) {
            for item in items {
                if !members.iter().any(|(name, _)| *name == item.member) {
                    violations.push(format!("unknown choice member '{}'", item.member));
                }
            }
        }
        violations
    }

    /// Render a native value as a primitive value
    pub fn to_primitive(&self, value: &Native, ctx: &Context) -> Result<Value, ConversionError> {
        if !self.kind.accepts(value) {
            return Err(ConversionError::new(format!(
                "expected {} value, got {}",
                self.kind.type_name(),
                value.type_name()
            )));
        }
        self.kind.render(value, ctx)
    }

    /// Mapping key under the given context
    pub(crate) fn key(&self, name: &str, owner_namespace: Option<&str>, ctx: &Context) -> String {
        let base = self.source.as_deref().unwrap_or(name);
        match self.placement {
            Placement::Attribute => ctx.config().attribute_key(base),
            Placement::Text => ctx.config().text_key().to_string(),
            Placement::Element => {
                let namespace = match &self.kind {
                    FieldKind::Model(model) | FieldKind::Models(model) => {
                        model.namespace().or(owner_namespace)
                    }
                    _ => owner_namespace,
                };
                format!("{}{}", ctx.namespaces().qualifier(namespace), base)
            }
        }
    }

    /// Number of element occurrences a value stands for
    pub(crate) fn occurrences(value: &Native) -> usize {
        match value {
            Native::Instances(instances) => instances.len(),
            Native::Items(items) => items.len(),
            _ => 1,
        }
    }

    /// Validate a value at `path`, descending into nested values
    pub(crate) fn collect(
        &self,
        path: &str,
        value: Option<&Native>,
        errors: &mut ErrorMap,
        ids: &mut IdentityStore,
    ) {
        errors.extend(path, self.validate(value));
        let Some(value) = value else {
            return;
        };
        if !self.kind.accepts(value) {
            return;
        }

        match (&self.kind, value) {
            (
                FieldKind::Text {
                    identity: Identity::Id,
                    ..
                },
                Native::Text(id),
            ) => {
                if let Some(message) = ids.register_id(id, path) {
                    errors.add(path, message);
                }
            }
            (
                FieldKind::Text {
                    identity: Identity::IdRef,
                    ..
                },
                Native::Text(reference),
            ) => ids.register_ref(reference, path),
            (
                FieldKind::Text {
                    identity: Identity::Key(constraint),
                    ..
                },
                Native::Text(text),
            ) => {
                if let Some(message) = ids.register_key(constraint, text, path) {
                    errors.add(path, message);
                }
            }
            (
                FieldKind::Text {
                    identity: Identity::KeyRef(name),
                    ..
                },
                Native::Text(reference),
            ) => {
                if let Some(message) = ids.register_key_ref(name, reference, path) {
                    errors.add(path, message);
                }
            }
            _ => composite::collect_nested(&self.kind, path, value, errors, ids),
        }
    }
}
