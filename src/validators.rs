//! Input-validation chains
//!
//! Validation itself is delegated work: the configuration engine's only
//! responsibility is installing these chains before validation runs. A
//! [`FieldValidator`] checks one field value; an [`ObjectValidator`] checks
//! the whole validated mapping. Failures are plain human-readable messages,
//! collected per field into [`crate::ValidationErrors`].

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

/// Validates a single field value.
pub trait FieldValidator: Send + Sync {
    fn validate(&self, field_name: &str, value: &Value) -> Result<(), String>;
}

/// Validates the whole object after per-field validation passed.
pub trait ObjectValidator: Send + Sync {
    fn validate(&self, data: &IndexMap<String, Value>) -> Result<(), String>;
}

/// Rejects numbers below a minimum.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shapeless_serializers::validators::{FieldValidator, MinValueValidator};
///
/// let validator = MinValueValidator::new(0.0);
/// assert!(validator.validate("price", &json!(100)).is_ok());
/// assert!(validator.validate("price", &json!(-10)).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MinValueValidator {
    min: f64,
}

impl MinValueValidator {
    pub fn new(min: f64) -> Self {
        Self { min }
    }
}

impl FieldValidator for MinValueValidator {
    fn validate(&self, _field_name: &str, value: &Value) -> Result<(), String> {
        let Some(number) = value.as_f64() else {
            return Err("A valid number is required.".to_string());
        };
        if number < self.min {
            return Err(format!(
                "Ensure this value is greater than or equal to {}.",
                self.min
            ));
        }
        Ok(())
    }
}

/// Rejects numbers above a maximum.
#[derive(Debug, Clone)]
pub struct MaxValueValidator {
    max: f64,
}

impl MaxValueValidator {
    pub fn new(max: f64) -> Self {
        Self { max }
    }
}

impl FieldValidator for MaxValueValidator {
    fn validate(&self, _field_name: &str, value: &Value) -> Result<(), String> {
        let Some(number) = value.as_f64() else {
            return Err("A valid number is required.".to_string());
        };
        if number > self.max {
            return Err(format!(
                "Ensure this value is less than or equal to {}.",
                self.max
            ));
        }
        Ok(())
    }
}

/// Rejects strings longer than a maximum character count.
#[derive(Debug, Clone)]
pub struct MaxLengthValidator {
    max_length: usize,
}

impl MaxLengthValidator {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }
}

impl FieldValidator for MaxLengthValidator {
    fn validate(&self, _field_name: &str, value: &Value) -> Result<(), String> {
        let Some(text) = value.as_str() else {
            return Err("A valid string is required.".to_string());
        };
        if text.chars().count() > self.max_length {
            return Err(format!(
                "Ensure this field has no more than {} characters.",
                self.max_length
            ));
        }
        Ok(())
    }
}

/// Rejects strings shorter than a minimum character count.
#[derive(Debug, Clone)]
pub struct MinLengthValidator {
    min_length: usize,
}

impl MinLengthValidator {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }
}

impl FieldValidator for MinLengthValidator {
    fn validate(&self, _field_name: &str, value: &Value) -> Result<(), String> {
        let Some(text) = value.as_str() else {
            return Err("A valid string is required.".to_string());
        };
        if text.chars().count() < self.min_length {
            return Err(format!(
                "Ensure this field has at least {} characters.",
                self.min_length
            ));
        }
        Ok(())
    }
}

/// Rejects strings that do not match a pattern.
#[derive(Debug, Clone)]
pub struct RegexValidator {
    pattern: Regex,
    message: Option<String>,
}

impl RegexValidator {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            message: None,
        })
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl FieldValidator for RegexValidator {
    fn validate(&self, _field_name: &str, value: &Value) -> Result<(), String> {
        let Some(text) = value.as_str() else {
            return Err("A valid string is required.".to_string());
        };
        if !self.pattern.is_match(text) {
            return Err(self
                .message
                .clone()
                .unwrap_or_else(|| "This value does not match the required pattern.".to_string()));
        }
        Ok(())
    }
}

/// Wrap a closure as a [`FieldValidator`].
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shapeless_serializers::validators::{field_validator, FieldValidator};
///
/// let even = field_validator(|_, value| {
///     match value.as_i64() {
///         Some(n) if n % 2 == 0 => Ok(()),
///         _ => Err("Ensure this value is even.".to_string()),
///     }
/// });
/// assert!(even.validate("count", &json!(4)).is_ok());
/// assert!(even.validate("count", &json!(3)).is_err());
/// ```
pub fn field_validator<F>(f: F) -> Arc<dyn FieldValidator>
where
    F: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
{
    struct Fun<F>(F);
    impl<F> FieldValidator for Fun<F>
    where
        F: Fn(&str, &Value) -> Result<(), String> + Send + Sync,
    {
        fn validate(&self, field_name: &str, value: &Value) -> Result<(), String> {
            (self.0)(field_name, value)
        }
    }
    Arc::new(Fun(f))
}

/// Wrap a closure as an [`ObjectValidator`].
pub fn object_validator<F>(f: F) -> Arc<dyn ObjectValidator>
where
    F: Fn(&IndexMap<String, Value>) -> Result<(), String> + Send + Sync + 'static,
{
    struct Fun<F>(F);
    impl<F> ObjectValidator for Fun<F>
    where
        F: Fn(&IndexMap<String, Value>) -> Result<(), String> + Send + Sync,
    {
        fn validate(&self, data: &IndexMap<String, Value>) -> Result<(), String> {
            (self.0)(data)
        }
    }
    Arc::new(Fun(f))
}
