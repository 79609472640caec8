//! Error types for dynamic serializer configuration and input validation
//!
//! Configuration errors are always attributable to caller-supplied
//! configuration, never to the data being serialized. They surface
//! immediately and are never downgraded. Validation errors carry the
//! per-field message mapping produced on the input path.

use indexmap::IndexMap;

/// Key under which object-level validation messages are collected.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Error raised for malformed serializer configuration.
///
/// Raised synchronously at construction or at first representation build,
/// before any instance data is touched. Unknown field-name references in
/// allow-lists and per-field maps are deliberately *not* errors; only
/// malformed container shapes, malformed nested specs, and failing
/// caller-supplied predicates are.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration option that must be a mapping was something else.
    #[error("{option} must be a dictionary")]
    ExpectedMapping { option: String },

    /// A configuration option that must be a sequence was something else.
    #[error("{option} must be a sequence of field names")]
    ExpectedSequence { option: String },

    /// A per-field entry inside a mapping option had the wrong shape.
    #[error("{option} entry for field '{field}' must be a dictionary")]
    ExpectedFieldMapping { option: String, field: String },

    /// A per-field entry that must be a string was something else.
    #[error("{option} entry for field '{field}' must be a string")]
    ExpectedFieldString { option: String, field: String },

    /// A per-field entry that must be a boolean was something else.
    #[error("{option} entry for field '{field}' must be a boolean")]
    ExpectedFieldBoolean { option: String, field: String },

    /// A configuration option that must be a boolean was something else.
    #[error("{option} must be a boolean")]
    ExpectedBoolean { option: String },

    /// A configuration option that must be an integer was something else.
    #[error("{option} must be a non-negative integer")]
    ExpectedInteger { option: String },

    /// A declarative nested spec had no `serializer` reference.
    #[error("Missing serializer for nested field '{field}'")]
    MissingNestedSerializer { field: String },

    /// A declarative nested spec referenced a serializer name that is not
    /// registered.
    #[error("Unknown serializer '{serializer}' for nested field '{field}'")]
    UnknownNestedSerializer { serializer: String, field: String },

    /// A nested spec was present but not one of the three recognized forms.
    #[error("Invalid nested configuration for field '{field}': {reason}")]
    InvalidNestedSpec { field: String, reason: String },

    /// A recognized field attribute was given a value of the wrong type.
    #[error("Invalid value for attribute '{attribute}' on field '{field}': expected {expected}")]
    InvalidAttributeValue {
        field: String,
        attribute: String,
        expected: &'static str,
    },

    /// A conditional-inclusion predicate failed while being evaluated.
    #[error("Error evaluating condition for field '{field}': {message}")]
    ConditionEvaluation { field: String, message: String },

    /// An attribute-override predicate failed while being evaluated.
    #[error("Error evaluating attribute '{attribute}' for field '{field}': {message}")]
    AttributeEvaluation {
        field: String,
        attribute: String,
        message: String,
    },

    /// A nested `instance` override predicate failed while being evaluated.
    #[error("Error resolving nested instance for field '{field}': {message}")]
    NestedInstanceEvaluation { field: String, message: String },

    /// A declarative options object carried a key this crate does not
    /// recognize.
    #[error("Unknown configuration option '{option}'")]
    UnknownOption { option: String },

    /// An inline serializer definition was built from a non-object value.
    #[error("Inline serializer '{name}' requires an object instance")]
    InvalidInlineInstance { name: String },
}

impl ConfigError {
    pub fn expected_mapping(option: impl Into<String>) -> Self {
        Self::ExpectedMapping {
            option: option.into(),
        }
    }

    pub fn expected_sequence(option: impl Into<String>) -> Self {
        Self::ExpectedSequence {
            option: option.into(),
        }
    }
}

/// Error surface of the input-validation path.
///
/// Configuration errors and validation errors stay distinct: a failing
/// attribute predicate or a wrong-typed attribute value is caller
/// misconfiguration and must not be mistaken for bad input data. Beneath a
/// web-facing view, `Config` maps to a 5xx-class failure and `Validation`
/// to a 4xx-class response carrying the per-field messages.
#[derive(Debug, thiserror::Error)]
pub enum SerializerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

impl SerializerError {
    pub fn as_config(&self) -> Option<&ConfigError> {
        match self {
            Self::Config(err) => Some(err),
            Self::Validation(_) => None,
        }
    }

    pub fn into_validation(self) -> Option<ValidationErrors> {
        match self {
            Self::Config(_) => None,
            Self::Validation(errors) => Some(errors),
        }
    }
}

/// Accumulated input-validation failures, keyed by field name.
///
/// Object-level messages are collected under [`NON_FIELD_ERRORS`]. Entry
/// order follows field declaration order, message order follows validator
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: IndexMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_default().push(message.into());
    }

    /// Record an object-level message.
    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD_ERRORS, message);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Messages recorded against a field, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(|v| v.as_slice())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(|k| k.as_str())
    }

    /// Consume into the underlying field → messages mapping.
    pub fn into_inner(self) -> IndexMap<String, Vec<String>> {
        self.errors
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation failed")?;
        let mut first = true;
        for (field, messages) in &self.errors {
            write!(
                f,
                "{} {}: {}",
                if first { ":" } else { ";" },
                field,
                messages.join(", ")
            )?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
