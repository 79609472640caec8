//! Serializer definitions and configured serializer instances
//!
//! A [`SerializerDef`] is the static declaration: a name plus an ordered
//! field set. A [`Serializer`] is one configured instantiation of it: it
//! exclusively owns the field-set snapshot computed at construction, its
//! configuration bundle, and its context, and it drives the representation
//! pipeline. Nothing is shared mutably between instances, so independent
//! builds need no coordination.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::config::SerializerConfig;
use crate::context::SerializerContext;
use crate::error::{ConfigError, SerializerError, ValidationErrors};
use crate::fields::{Field, FieldSet};
use crate::options::{self, SerializerRegistry};
use crate::stages::{self, Build};

/// The static declaration of a serializer: its name and declared fields.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shapeless_serializers::{Field, SerializerDef};
///
/// let def = SerializerDef::new("BookSerializer")
///     .field(Field::new("id"))
///     .field(Field::new("title"))
///     .field(Field::new("price"));
///
/// let serializer = def.serializer();
/// let data = serializer.serialize(&json!({"id": 1, "title": "T", "price": 9.99})).unwrap();
/// assert_eq!(data, json!({"id": 1, "title": "T", "price": 9.99}));
/// ```
#[derive(Debug, Clone)]
pub struct SerializerDef {
    name: String,
    fields: FieldSet,
}

impl SerializerDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: FieldSet::new(),
        }
    }

    /// Declare a field. Declaring the same name twice replaces the earlier
    /// definition, keeping keys unique.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.insert(field.name().to_string(), field);
        self
    }

    /// Synthesize an include-all declaration from an object's keys, for
    /// inline serializers that have no statically declared field set.
    pub fn from_instance(name: impl Into<String>, instance: &Value) -> Result<Self, ConfigError> {
        let name = name.into();
        let Some(object) = instance.as_object() else {
            return Err(ConfigError::InvalidInlineInstance { name });
        };
        let mut def = Self::new(name);
        for key in object.keys() {
            def = def.field(Field::new(key));
        }
        Ok(def)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    /// Instantiate with default configuration and an empty context.
    pub fn serializer(&self) -> Serializer {
        self.serializer_with(SerializerConfig::default(), SerializerContext::new())
    }

    /// Instantiate with a configuration bundle and context. Field selection
    /// happens here, once, before any rendering; the instance owns the
    /// resulting snapshot.
    pub fn serializer_with(
        &self,
        config: SerializerConfig,
        context: SerializerContext,
    ) -> Serializer {
        let fields = stages::select::select_fields(&self.fields, config.allow_fields());
        Serializer {
            name: self.name.clone(),
            fields,
            config,
            context,
            many: false,
        }
    }

    /// Instantiate from an untyped options object, validating every option's
    /// shape before any field mutation. Nested specs reference serializers
    /// by name through the registry.
    pub fn serializer_from_options(
        &self,
        options: &Value,
        registry: &SerializerRegistry,
    ) -> Result<Serializer, ConfigError> {
        let parsed = options::parse_options(options, registry)?;
        let mut serializer = self.serializer_with(parsed.config, parsed.context);
        serializer.many = parsed.many;
        Ok(serializer)
    }
}

/// One configured serializer instantiation.
#[derive(Debug, Clone)]
pub struct Serializer {
    name: String,
    fields: FieldSet,
    config: SerializerConfig,
    context: SerializerContext,
    many: bool,
}

impl Serializer {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The instance-scoped field-set snapshot computed at construction.
    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    pub fn context(&self) -> &SerializerContext {
        &self.context
    }

    pub fn is_many(&self) -> bool {
        self.many
    }

    /// Force sequence output even for a single instance.
    pub fn many(mut self, many: bool) -> Self {
        self.many = many;
        self
    }

    /// Replace the context.
    pub fn with_context(mut self, context: SerializerContext) -> Self {
        self.context = context;
        self
    }

    /// Merge a parent's context underneath this serializer's own; own keys
    /// win. Used when this instance is wired in as a nested field.
    pub(crate) fn inherit_context(&mut self, parent: &SerializerContext) {
        self.context = parent.merged_with(&self.context);
    }

    /// Build the representation of an instance.
    ///
    /// An array input (or an explicit `many` flag) produces an ordered
    /// sequence of representations; anything else produces one ordered
    /// key→value mapping.
    pub fn serialize(&self, instance: &Value) -> Result<Value, ConfigError> {
        let max_depth = self.config.max_depth();
        match instance {
            Value::Array(items) => {
                let mut rendered = Vec::with_capacity(items.len());
                for item in items {
                    rendered.push(self.represent_value(item, 0, max_depth)?);
                }
                Ok(Value::Array(rendered))
            }
            single if self.many => {
                Ok(Value::Array(vec![self.represent_value(single, 0, max_depth)?]))
            }
            single => self.represent_value(single, 0, max_depth),
        }
    }

    /// Build the representation as an ordered map, for callers that want to
    /// inspect keys without going through `Value`.
    pub fn represent(&self, instance: &Value) -> Result<IndexMap<String, Value>, ConfigError> {
        self.represent_at(instance, 0, self.config.max_depth())
    }

    pub(crate) fn represent_value(
        &self,
        instance: &Value,
        depth: usize,
        max_depth: usize,
    ) -> Result<Value, ConfigError> {
        let output = self.represent_at(instance, depth, max_depth)?;
        let mut map = serde_json::Map::with_capacity(output.len());
        for (key, value) in output {
            map.insert(key, value);
        }
        Ok(Value::Object(map))
    }

    fn represent_at(
        &self,
        instance: &Value,
        depth: usize,
        max_depth: usize,
    ) -> Result<IndexMap<String, Value>, ConfigError> {
        debug!(serializer = %self.name, depth, "building representation");
        let mut build = Build {
            instance,
            context: &self.context,
            config: &self.config,
            fields: self.fields.clone(),
            resolved: IndexMap::new(),
            output: IndexMap::new(),
            depth,
            max_depth,
        };
        for stage in stages::PIPELINE {
            debug!(serializer = %self.name, stage = stage.name(), "applying stage");
            stage.apply(&mut build)?;
        }
        Ok(build.output)
    }

    /// Run the input-validation path: required/null checks, then each
    /// field's declared and configured validator chains, then object-level
    /// validators. Read-only fields are ignored on input. Attribute patches
    /// apply here too, so a patched `required` or `read_only` flag governs
    /// the input contract as well as the output shape.
    ///
    /// The two failure kinds stay distinct: a malformed configuration
    /// surfaces as [`SerializerError::Config`], rejected input as
    /// [`SerializerError::Validation`] with the per-field messages.
    pub fn validate(&self, data: &Value) -> Result<IndexMap<String, Value>, SerializerError> {
        let mut errors = ValidationErrors::new();
        let Some(object) = data.as_object() else {
            errors.add_non_field("Invalid data. Expected a dictionary.");
            return Err(errors.into());
        };

        let fields = self.patched_fields(data)?;

        let mut validated = IndexMap::new();
        for (name, field) in &fields {
            if field.is_read_only() {
                continue;
            }
            let value = match object.get(name) {
                Some(value) => value.clone(),
                None => match field.default_value() {
                    Some(default) => default.clone(),
                    None => {
                        if field.is_required() {
                            errors.add(name.clone(), "This field is required.");
                        }
                        continue;
                    }
                },
            };
            if value.is_null() && !field.allows_null() {
                errors.add(name.clone(), "This field may not be null.");
                continue;
            }

            let mut valid = true;
            for validator in field.validators() {
                if let Err(message) = validator.validate(name, &value) {
                    errors.add(name.clone(), message);
                    valid = false;
                }
            }
            if let Some(chain) = self.config.field_validators().get(name) {
                for validator in chain {
                    if let Err(message) = validator.validate(name, &value) {
                        errors.add(name.clone(), message);
                        valid = false;
                    }
                }
            }
            if valid {
                validated.insert(name.clone(), value);
            }
        }

        if errors.is_empty() {
            for validator in self.config.validators() {
                if let Err(message) = validator.validate(&validated) {
                    errors.add_non_field(message);
                }
            }
        }

        if errors.is_empty() {
            Ok(validated)
        } else {
            Err(errors.into())
        }
    }

    /// Whether `data` passes validation.
    pub fn is_valid(&self, data: &Value) -> bool {
        self.validate(data).is_ok()
    }

    fn patched_fields(&self, data: &Value) -> Result<FieldSet, ConfigError> {
        let mut fields = self.fields.clone();
        stages::attributes::patch(&mut fields, self.config.attribute_map(), data, &self.context)?;
        Ok(fields)
    }
}
