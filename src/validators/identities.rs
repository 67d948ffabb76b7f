//! Identity constraints
//!
//! One [`IdentityStore`] lives for a single `validate()` walk over an
//! instance tree. ID values are counted as they are met; IDREF values are
//! remembered and resolved once the whole tree has been visited.
//!
//! Named keys and uniqueness constraints are scoped: a model opens a scope
//! for a name at its own path, and a constrained value registers into the
//! scope found `level` path segments above the value's path.

use crate::error_map::ErrorMap;
use indexmap::IndexMap;

/// Kind of a named identity constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// Values must be present and unique within the scope
    Key,
    /// Present values must be unique within the scope
    Unique,
}

impl ConstraintKind {
    /// Get as string
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::Key => "key",
            ConstraintKind::Unique => "unique",
        }
    }
}

/// A value constrained by named keys or uniqueness scopes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyConstraint {
    /// Key or uniqueness
    pub kind: ConstraintKind,
    /// Candidate scope names; the value registers into every one open at the target path
    pub names: Vec<String>,
    /// Path segments between the value and its scope
    pub level: usize,
}

impl KeyConstraint {
    /// Create a new constraint
    pub fn new<I, S>(kind: ConstraintKind, names: I, level: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            names: names.into_iter().map(Into::into).collect(),
            level,
        }
    }

    /// Path of the scope a value at `path` belongs to
    pub fn scope_path(&self, path: &str) -> String {
        let segments: Vec<&str> = path.split('.').collect();
        let keep = segments.len().saturating_sub(self.level);
        segments[..keep].join(".")
    }
}

type Scopes = IndexMap<(String, String), IndexMap<String, String>>;

/// Registry of identity values for one validation walk
#[derive(Debug, Clone, Default)]
pub struct IdentityStore {
    /// ID value -> path of its first occurrence
    ids: IndexMap<String, String>,
    /// (IDREF value, path) in visiting order
    refs: Vec<(String, String)>,
    /// (key name, scope path) -> key value -> path
    keys: Scopes,
    /// (unique name, scope path) -> value -> path
    uniques: Scopes,
    /// (key name, value, path) of key references in visiting order
    key_refs: Vec<(String, String, String)>,
}

impl IdentityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an ID value met at `path`
    ///
    /// Returns the violation message when the value was already used.
    pub fn register_id(&mut self, value: &str, path: &str) -> Option<String> {
        match self.ids.get(value) {
            Some(first) => Some(format!("duplicate ID '{}' (first used at {})", value, first)),
            None => {
                self.ids.insert(value.to_string(), path.to_string());
                None
            }
        }
    }

    /// Remember an IDREF value met at `path`
    pub fn register_ref(&mut self, value: &str, path: &str) {
        self.refs.push((value.to_string(), path.to_string()));
    }

    /// Check if an ID value has been registered
    pub fn contains_id(&self, value: &str) -> bool {
        self.ids.contains_key(value)
    }

    /// Number of distinct ID values
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if no ID has been registered
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Open the scope of a key or uniqueness constraint at `path`
    pub fn open_scope(&mut self, kind: ConstraintKind, name: &str, path: &str) {
        self.scopes_mut(kind)
            .entry((name.to_string(), path.to_string()))
            .or_default();
    }

    fn scopes_mut(&mut self, kind: ConstraintKind) -> &mut Scopes {
        match kind {
            ConstraintKind::Key => &mut self.keys,
            ConstraintKind::Unique => &mut self.uniques,
        }
    }

    /// Register a constrained value met at `path`
    ///
    /// Returns the violation message for an empty key, a duplicate within
    /// a scope, or a value with no open scope. Empty unique values are
    /// not registered.
    pub fn register_key(&mut self, constraint: &KeyConstraint, value: &str, path: &str) -> Option<String> {
        if value.is_empty() {
            return match constraint.kind {
                ConstraintKind::Key => Some("key value may not be empty".to_string()),
                ConstraintKind::Unique => None,
            };
        }

        let target = constraint.scope_path(path);
        let scopes = self.scopes_mut(constraint.kind);
        let mut found = false;
        for name in &constraint.names {
            let Some(scope) = scopes.get_mut(&(name.clone(), target.clone())) else {
                continue;
            };
            if scope.contains_key(value) {
                return Some(format!("{} is a duplicate entry for key {}", value, name));
            }
            scope.insert(value.to_string(), path.to_string());
            found = true;
        }

        if found {
            None
        } else {
            Some(format!(
                "no {} scope {} found at path '{}'",
                constraint.kind.as_str(),
                constraint.names.join(" | "),
                target
            ))
        }
    }

    /// Remember a reference to a value of key `name` met at `path`
    ///
    /// Returns the violation message for an empty reference.
    pub fn register_key_ref(&mut self, name: &str, value: &str, path: &str) -> Option<String> {
        if value.is_empty() {
            return Some("key reference may not be empty".to_string());
        }
        self.key_refs
            .push((name.to_string(), value.to_string(), path.to_string()));
        None
    }

    /// Path of the value a key reference points to
    pub fn resolve_key_ref(&self, name: &str, value: &str) -> Option<&str> {
        self.keys
            .iter()
            .filter(|((key, _), _)| key == name)
            .find_map(|(_, scope)| scope.get(value))
            .map(String::as_str)
    }

    /// Number of values registered under key `name` in the scope at `path`
    pub fn key_value_count(&self, name: &str, path: &str) -> usize {
        self.keys
            .get(&(name.to_string(), path.to_string()))
            .map_or(0, IndexMap::len)
    }

    /// IDREFs and key references that resolve to nothing, as `(path, message)`
    pub fn unresolved(&self) -> Vec<(String, String)> {
        let idrefs = self
            .refs
            .iter()
            .filter(|(value, _)| !self.ids.contains_key(value))
            .map(|(value, path)| (path.clone(), format!("could not resolve IDREF '{}'", value)));
        let key_refs = self
            .key_refs
            .iter()
            .filter(|(name, value, _)| self.resolve_key_ref(name, value).is_none())
            .map(|(name, value, path)| {
                (
                    path.clone(),
                    format!("could not resolve '{}' for key {}", value, name),
                )
            });
        idrefs.chain(key_refs).collect()
    }

    /// Record unresolved IDREFs into an error map
    pub fn report(&self, errors: &mut ErrorMap) {
        for (path, message) in self.unresolved() {
            errors.add(path, message);
        }
    }
}
