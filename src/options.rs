//! Declarative configuration parsing
//!
//! The typed builder API cannot express a malformed configuration, so the
//! shape checks live here: an untyped options object (typically deserialized
//! from request-scoped settings) is validated key by key before any serializer
//! state is touched. Nested specs reference other serializer definitions by
//! name through a [`SerializerRegistry`]. Unknown *field* names inside a
//! well-formed option are tolerated; unknown option keys and malformed
//! container shapes are not.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::config::SerializerConfig;
use crate::context::SerializerContext;
use crate::error::ConfigError;
use crate::nested::{NestedConfig, NestedSpec};
use crate::serializer::SerializerDef;
use crate::value::{Condition, ConfigValue};

/// Name → definition lookup for declarative nested references.
///
/// # Examples
///
/// ```
/// use shapeless_serializers::{Field, SerializerDef, SerializerRegistry};
///
/// let mut registry = SerializerRegistry::new();
/// registry.register(SerializerDef::new("AuthorSerializer").field(Field::new("id")));
/// assert!(registry.contains("AuthorSerializer"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SerializerRegistry {
    defs: IndexMap<String, Arc<SerializerDef>>,
}

impl SerializerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition under its own name. Re-registering a name
    /// replaces the earlier definition.
    pub fn register(&mut self, def: SerializerDef) -> &mut Self {
        self.register_arc(Arc::new(def))
    }

    pub fn register_arc(&mut self, def: Arc<SerializerDef>) -> &mut Self {
        debug!(serializer = %def.name(), "registering serializer definition");
        self.defs.insert(def.name().to_string(), def);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<SerializerDef>> {
        self.defs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(|k| k.as_str())
    }
}

/// The validated outcome of parsing one options object.
#[derive(Debug)]
pub(crate) struct ParsedOptions {
    pub(crate) config: SerializerConfig,
    pub(crate) context: SerializerContext,
    pub(crate) many: bool,
}

/// Validate an options object and lower it into a configuration bundle.
///
/// Every option's shape is checked before anything is applied, so a
/// malformed object leaves no partial state behind.
pub(crate) fn parse_options(
    options: &Value,
    registry: &SerializerRegistry,
) -> Result<ParsedOptions, ConfigError> {
    let Some(object) = options.as_object() else {
        return Err(ConfigError::expected_mapping("options"));
    };

    let mut builder = SerializerConfig::builder();
    let mut context = SerializerContext::new();
    let mut many = false;

    for (key, value) in object {
        match key.as_str() {
            "fields" => {
                builder = builder.fields(parse_field_names(value, "fields")?);
            }
            "rename_fields" => {
                builder = builder.rename_fields(parse_renames(value, "rename_fields")?);
            }
            "field_attributes" => {
                for (field, attributes) in parse_attributes(value, "field_attributes")? {
                    for (attribute, attr_value) in attributes {
                        builder = builder.field_attribute(field.clone(), attribute, attr_value);
                    }
                }
            }
            "conditional_fields" => {
                for (field, condition) in parse_conditions(value, "conditional_fields")? {
                    builder = builder.condition(field, condition);
                }
            }
            "nested" => {
                for (field, spec) in parse_nested(value, "nested", registry)? {
                    builder = builder.nested(field, spec);
                }
            }
            "context" => {
                context = parse_context(value, "context")?;
            }
            "many" => {
                many = value.as_bool().ok_or_else(|| ConfigError::ExpectedBoolean {
                    option: "many".to_string(),
                })?;
            }
            "max_depth" => {
                let depth = value.as_u64().ok_or_else(|| ConfigError::ExpectedInteger {
                    option: "max_depth".to_string(),
                })?;
                builder = builder.max_depth(depth as usize);
            }
            other => {
                return Err(ConfigError::UnknownOption {
                    option: other.to_string(),
                });
            }
        }
    }

    Ok(ParsedOptions {
        config: builder.build(),
        context,
        many,
    })
}

fn parse_field_names(value: &Value, option: &str) -> Result<Vec<String>, ConfigError> {
    let Some(items) = value.as_array() else {
        return Err(ConfigError::expected_sequence(option));
    };
    let mut names = Vec::with_capacity(items.len());
    for item in items {
        let Some(name) = item.as_str() else {
            return Err(ConfigError::expected_sequence(option));
        };
        names.push(name.to_string());
    }
    Ok(names)
}

fn parse_renames(value: &Value, option: &str) -> Result<IndexMap<String, String>, ConfigError> {
    let Some(entries) = value.as_object() else {
        return Err(ConfigError::expected_mapping(option));
    };
    let mut renames = IndexMap::with_capacity(entries.len());
    for (field, new_name) in entries {
        let Some(new_name) = new_name.as_str() else {
            return Err(ConfigError::ExpectedFieldString {
                option: option.to_string(),
                field: field.clone(),
            });
        };
        renames.insert(field.clone(), new_name.to_string());
    }
    Ok(renames)
}

fn parse_attributes(
    value: &Value,
    option: &str,
) -> Result<IndexMap<String, IndexMap<String, ConfigValue>>, ConfigError> {
    let Some(entries) = value.as_object() else {
        return Err(ConfigError::expected_mapping(option));
    };
    let mut attributes = IndexMap::with_capacity(entries.len());
    for (field, overrides) in entries {
        let Some(overrides) = overrides.as_object() else {
            return Err(ConfigError::ExpectedFieldMapping {
                option: option.to_string(),
                field: field.clone(),
            });
        };
        let per_field: IndexMap<String, ConfigValue> = overrides
            .iter()
            .map(|(attribute, attr_value)| {
                (attribute.clone(), ConfigValue::Literal(attr_value.clone()))
            })
            .collect();
        attributes.insert(field.clone(), per_field);
    }
    Ok(attributes)
}

fn parse_conditions(
    value: &Value,
    option: &str,
) -> Result<IndexMap<String, Condition>, ConfigError> {
    let Some(entries) = value.as_object() else {
        return Err(ConfigError::expected_mapping(option));
    };
    let mut conditions = IndexMap::with_capacity(entries.len());
    for (field, condition) in entries {
        // Predicates need the builder API; the declarative form is bools only.
        let Some(flag) = condition.as_bool() else {
            return Err(ConfigError::ExpectedFieldBoolean {
                option: option.to_string(),
                field: field.clone(),
            });
        };
        conditions.insert(field.clone(), Condition::Static(flag));
    }
    Ok(conditions)
}

fn parse_context(value: &Value, option: &str) -> Result<SerializerContext, ConfigError> {
    let Some(entries) = value.as_object() else {
        return Err(ConfigError::expected_mapping(option));
    };
    Ok(entries
        .iter()
        .map(|(key, val)| (key.clone(), val.clone()))
        .collect())
}

fn parse_nested(
    value: &Value,
    option: &str,
    registry: &SerializerRegistry,
) -> Result<IndexMap<String, NestedSpec>, ConfigError> {
    let Some(entries) = value.as_object() else {
        return Err(ConfigError::expected_mapping(option));
    };
    let mut nested = IndexMap::with_capacity(entries.len());
    for (field, spec) in entries {
        nested.insert(field.clone(), parse_nested_entry(field, spec, registry)?);
    }
    Ok(nested)
}

fn parse_nested_entry(
    field: &str,
    spec: &Value,
    registry: &SerializerRegistry,
) -> Result<NestedSpec, ConfigError> {
    match spec {
        // Shorthand: a bare serializer name, instantiated with defaults.
        Value::String(name) => {
            let def = lookup(registry, name, field)?;
            Ok(NestedSpec::Class(Arc::clone(def)))
        }
        Value::Object(entry) => {
            let serializer = match entry.get("serializer") {
                Some(Value::String(name)) => lookup(registry, name, field)?,
                Some(_) => {
                    return Err(ConfigError::InvalidNestedSpec {
                        field: field.to_string(),
                        reason: "'serializer' must be a serializer name".to_string(),
                    });
                }
                None => {
                    return Err(ConfigError::MissingNestedSerializer {
                        field: field.to_string(),
                    });
                }
            };
            let mut config = NestedConfig::new(Arc::clone(serializer));

            for (key, value) in entry {
                match key.as_str() {
                    "serializer" => {}
                    "fields" => {
                        let label = format!("nested.{field}.fields");
                        config = config.fields(parse_field_names(value, &label)?);
                    }
                    "rename_fields" => {
                        let label = format!("nested.{field}.rename_fields");
                        for (from, to) in parse_renames(value, &label)? {
                            config = config.rename_field(from, to);
                        }
                    }
                    "field_attributes" => {
                        let label = format!("nested.{field}.field_attributes");
                        for (child, attributes) in parse_attributes(value, &label)? {
                            for (attribute, attr_value) in attributes {
                                config = config.field_attribute(child.clone(), attribute, attr_value);
                            }
                        }
                    }
                    "conditional_fields" => {
                        let label = format!("nested.{field}.conditional_fields");
                        for (child, condition) in parse_conditions(value, &label)? {
                            config = config.condition(child, condition);
                        }
                    }
                    "nested" => {
                        let label = format!("nested.{field}.nested");
                        for (child, spec) in parse_nested(value, &label, registry)? {
                            config = config.nested(child, spec);
                        }
                    }
                    "context" => {
                        let label = format!("nested.{field}.context");
                        config = config.context(parse_context(value, &label)?);
                    }
                    "many" => {
                        let flag = value.as_bool().ok_or_else(|| ConfigError::ExpectedBoolean {
                            option: format!("nested.{field}.many"),
                        })?;
                        config = config.many(flag);
                    }
                    "instance" => {
                        return Err(ConfigError::InvalidNestedSpec {
                            field: field.to_string(),
                            reason: "instance overrides require the builder API".to_string(),
                        });
                    }
                    other => {
                        return Err(ConfigError::InvalidNestedSpec {
                            field: field.to_string(),
                            reason: format!("unrecognized key '{other}'"),
                        });
                    }
                }
            }
            Ok(config.into())
        }
        _ => Err(ConfigError::InvalidNestedSpec {
            field: field.to_string(),
            reason: "expected a serializer name or a dictionary".to_string(),
        }),
    }
}

fn lookup<'r>(
    registry: &'r SerializerRegistry,
    name: &str,
    field: &str,
) -> Result<&'r Arc<SerializerDef>, ConfigError> {
    registry.get(name).ok_or_else(|| ConfigError::UnknownNestedSerializer {
        serializer: name.to_string(),
        field: field.to_string(),
    })
}
