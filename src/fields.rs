//! Field definitions and the ordered field set
//!
//! A [`Field`] is a named unit of a serializer's declared shape: it renders an
//! instance attribute to an output value and optionally validates input.
//! Behavior flags such as `write_only` can be overridden per serializer
//! instance through the attribute patcher; mutation is always scoped to the
//! instance's own copy of the field set, never a shared declaration.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::ConfigError;
use crate::validators::FieldValidator;

/// Ordered mapping from field name to definition. Insertion order is
/// representation order; inserting a duplicate name replaces the earlier
/// definition.
pub type FieldSet = IndexMap<String, Field>;

/// A named, typed unit of a serializer's declared shape.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shapeless_serializers::Field;
///
/// let field = Field::new("title");
/// assert_eq!(field.to_representation(&json!({"title": "T"})), json!("T"));
///
/// // Missing attributes render as explicit null, not an error.
/// assert_eq!(field.to_representation(&json!({})), json!(null));
/// ```
#[derive(Clone)]
pub struct Field {
    name: String,
    source: Option<String>,
    read_only: bool,
    write_only: bool,
    required: bool,
    allow_null: bool,
    label: Option<String>,
    help_text: Option<String>,
    default: Option<Value>,
    validators: Vec<Arc<dyn FieldValidator>>,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
            read_only: false,
            write_only: false,
            required: true,
            allow_null: false,
            label: None,
            help_text: None,
            default: None,
            validators: Vec::new(),
        }
    }

    /// Look the value up under a different attribute path. Dotted paths
    /// traverse nested objects (`"author.user"`).
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Included in output, excluded from input validation.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Accepted on input, excluded from output.
    pub fn write_only(mut self) -> Self {
        self.write_only = true;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn allow_null(mut self) -> Self {
        self.allow_null = true;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    /// Value rendered (and accepted on input) when the attribute is absent.
    pub fn default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Append a validator to this field's input-validation chain.
    pub fn validator(mut self, validator: Arc<dyn FieldValidator>) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_path(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.name)
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_write_only(&self) -> bool {
        self.write_only
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn allows_null(&self) -> bool {
        self.allow_null
    }

    pub fn label_text(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn help(&self) -> Option<&str> {
        self.help_text.as_deref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn validators(&self) -> &[Arc<dyn FieldValidator>] {
        &self.validators
    }

    /// Render the instance attribute this field covers.
    ///
    /// Missing values fall back to the declared default, then to explicit
    /// null; a nullable to-one relation with no related value therefore
    /// renders as `null`, not omission and not an error.
    pub fn to_representation(&self, instance: &Value) -> Value {
        match lookup_path(instance, self.source_path()) {
            Some(value) => value.clone(),
            None => self.default.clone().unwrap_or(Value::Null),
        }
    }

    /// Set one of the recognized behavior attributes by name.
    ///
    /// Recognized names form a bounded set with typed setters; wrong value
    /// types for a recognized name are configuration errors. Unrecognized
    /// names are ignored, consistent with the tolerant unknown-name policy
    /// applied to every per-field configuration map.
    pub fn set_attribute(&mut self, attribute: &str, value: Value) -> Result<(), ConfigError> {
        match attribute {
            "read_only" => self.read_only = expect_bool(&self.name, attribute, value)?,
            "write_only" => self.write_only = expect_bool(&self.name, attribute, value)?,
            "required" => self.required = expect_bool(&self.name, attribute, value)?,
            "allow_null" => self.allow_null = expect_bool(&self.name, attribute, value)?,
            "label" => self.label = expect_string(&self.name, attribute, value)?,
            "help_text" => self.help_text = expect_string(&self.name, attribute, value)?,
            "default" => self.default = Some(value),
            "source" => {
                self.source = expect_string(&self.name, attribute, value)?;
            }
            _ => {}
        }
        Ok(())
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("read_only", &self.read_only)
            .field("write_only", &self.write_only)
            .field("required", &self.required)
            .field("allow_null", &self.allow_null)
            .field("label", &self.label)
            .field("help_text", &self.help_text)
            .field("default", &self.default)
            .field("validators", &self.validators.len())
            .finish()
    }
}

fn expect_bool(field: &str, attribute: &str, value: Value) -> Result<bool, ConfigError> {
    match value {
        Value::Bool(b) => Ok(b),
        _ => Err(ConfigError::InvalidAttributeValue {
            field: field.to_string(),
            attribute: attribute.to_string(),
            expected: "a boolean",
        }),
    }
}

fn expect_string(
    field: &str,
    attribute: &str,
    value: Value,
) -> Result<Option<String>, ConfigError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        _ => Err(ConfigError::InvalidAttributeValue {
            field: field.to_string(),
            attribute: attribute.to_string(),
            expected: "a string or null",
        }),
    }
}

/// Traverse a dotted attribute path through nested objects.
pub(crate) fn lookup_path<'a>(instance: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = instance;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_by_name_by_default() {
        let field = Field::new("title");
        let value = field.to_representation(&json!({"title": "T", "other": 1}));
        assert_eq!(value, json!("T"));
    }

    #[test]
    fn renders_via_dotted_source() {
        let field = Field::new("author_name").source("author.name");
        let instance = json!({"author": {"name": "Ada"}});
        assert_eq!(field.to_representation(&instance), json!("Ada"));
    }

    #[test]
    fn missing_value_uses_default_then_null() {
        let with_default = Field::new("count").default(0);
        assert_eq!(with_default.to_representation(&json!({})), json!(0));

        let without = Field::new("profile");
        assert_eq!(without.to_representation(&json!({})), json!(null));
    }

    #[test]
    fn recognized_attributes_have_typed_setters() {
        let mut field = Field::new("title");
        field.set_attribute("write_only", json!(true)).unwrap();
        assert!(field.is_write_only());

        field.set_attribute("label", json!("Title")).unwrap();
        assert_eq!(field.label_text(), Some("Title"));

        field.set_attribute("default", json!("untitled")).unwrap();
        assert_eq!(field.default_value(), Some(&json!("untitled")));
    }

    #[test]
    fn wrong_value_type_for_recognized_attribute_errors() {
        let mut field = Field::new("title");
        let err = field.set_attribute("read_only", json!("yes")).unwrap_err();
        assert!(err.to_string().contains("read_only"));
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn unrecognized_attribute_names_are_ignored() {
        let mut field = Field::new("title");
        field.set_attribute("no_such_attribute", json!(1)).unwrap();
        assert!(!field.is_read_only());
    }
}
