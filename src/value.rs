//! Tagged configuration values
//!
//! Wherever configuration needs to vary per instance or per request, an
//! option accepts either a literal value or a two-argument predicate
//! `(instance, context)`. Instead of duck-typing on callability, both forms
//! are explicit variants resolved at the point of use.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::context::SerializerContext;
use crate::error::ConfigError;

/// Error type predicates may fail with; wrapped into [`ConfigError`] at the
/// evaluation site so the failure is attributable to this subsystem.
pub type PredicateError = Box<dyn std::error::Error + Send + Sync>;

/// A caller-supplied `(instance, context) -> value` function.
pub type Predicate = Arc<dyn Fn(&Value, &SerializerContext) -> Result<Value, PredicateError> + Send + Sync>;

/// A configuration value that is either a literal or computed per build.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shapeless_serializers::{ConfigValue, SerializerContext};
///
/// let literal = ConfigValue::from(true);
/// let computed = ConfigValue::computed(|_instance, context| {
///     Ok(json!(context.get("make_required").is_some()))
/// });
///
/// let ctx = SerializerContext::new().with("make_required", true);
/// assert_eq!(literal.resolve(&json!({}), &ctx).unwrap(), json!(true));
/// assert_eq!(computed.resolve(&json!({}), &ctx).unwrap(), json!(true));
/// ```
#[derive(Clone)]
pub enum ConfigValue {
    /// Used as-is.
    Literal(Value),
    /// Invoked with `(instance, context)`; the return value is used.
    Computed(Predicate),
}

impl ConfigValue {
    /// Build a computed value from a fallible closure.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Value, &SerializerContext) -> Result<Value, PredicateError> + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    /// Resolve to a concrete value for this `(instance, context)` pair.
    pub fn resolve(
        &self,
        instance: &Value,
        context: &SerializerContext,
    ) -> Result<Value, PredicateError> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Computed(predicate) => predicate(instance, context),
        }
    }

    /// Whether this value needs per-build evaluation.
    pub fn is_computed(&self) -> bool {
        matches!(self, Self::Computed(_))
    }
}

impl fmt::Debug for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<Value> for ConfigValue {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Literal(Value::Bool(value))
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Literal(Value::String(value.to_string()))
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Literal(Value::String(value))
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Literal(Value::from(value))
    }
}

/// A conditional-inclusion rule: a plain boolean or a context-evaluated
/// predicate coerced by ordinary truthiness.
#[derive(Clone)]
pub enum Condition {
    Static(bool),
    Computed(Predicate),
}

impl Condition {
    /// Build a condition from an infallible boolean closure.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use shapeless_serializers::{Condition, SerializerContext};
    ///
    /// let staff_only = Condition::when(|_instance, context| {
    ///     context.get("is_staff") == Some(&json!(true))
    /// });
    ///
    /// let ctx = SerializerContext::new().with("is_staff", true);
    /// assert!(staff_only.evaluate("secret", &json!({}), &ctx).unwrap());
    /// ```
    pub fn when<F>(f: F) -> Self
    where
        F: Fn(&Value, &SerializerContext) -> bool + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(move |instance, context| {
            Ok(Value::Bool(f(instance, context)))
        }))
    }

    /// Build a condition from a fallible closure returning an arbitrary
    /// value; the result is coerced by truthiness.
    pub fn try_when<F>(f: F) -> Self
    where
        F: Fn(&Value, &SerializerContext) -> Result<Value, PredicateError> + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    /// Resolve truthiness for this `(instance, context)` pair.
    ///
    /// Predicate failures are wrapped into
    /// [`ConfigError::ConditionEvaluation`] with the field name and the
    /// underlying message; the raw error never propagates.
    pub fn evaluate(
        &self,
        field: &str,
        instance: &Value,
        context: &SerializerContext,
    ) -> Result<bool, ConfigError> {
        match self {
            Self::Static(value) => Ok(*value),
            Self::Computed(predicate) => match predicate(instance, context) {
                Ok(value) => Ok(is_truthy(&value)),
                Err(err) => Err(ConfigError::ConditionEvaluation {
                    field: field.to_string(),
                    message: err.to_string(),
                }),
            },
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<bool> for Condition {
    fn from(value: bool) -> Self {
        Self::Static(value)
    }
}

/// Ordinary truthiness: null, `false`, zero, empty strings, empty arrays
/// and empty objects are falsy; everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
