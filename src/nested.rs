//! Nested serializer substitution specs
//!
//! A [`NestedSpec`] describes how to replace a relation field's default
//! rendering with a caller-supplied serializer. It is polymorphic over three
//! forms: a ready-made serializer instance (used as-is, including its own
//! pre-attached sub-configuration), a serializer definition instantiated with
//! defaults, or a declarative [`NestedConfig`] carrying its own
//! sub-configuration, context overrides, and an optional data-source
//! override. Declarative specs may themselves carry `nested`, enabling
//! arbitrarily deep graphs.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::SerializerConfig;
use crate::context::SerializerContext;
use crate::serializer::{Serializer, SerializerDef};
use crate::value::{Condition, ConfigValue};

/// One of the three recognized ways to substitute a relation field.
#[derive(Debug, Clone)]
pub enum NestedSpec {
    /// A pre-configured serializer instance, used as-is. The parent's
    /// context is merged underneath the instance's own.
    Instance(Box<Serializer>),
    /// A serializer definition, instantiated with default configuration.
    Class(Arc<SerializerDef>),
    /// A declarative record with its own sub-configuration.
    Config(Box<NestedConfig>),
}

impl From<Serializer> for NestedSpec {
    fn from(serializer: Serializer) -> Self {
        Self::Instance(Box::new(serializer))
    }
}

impl From<Arc<SerializerDef>> for NestedSpec {
    fn from(def: Arc<SerializerDef>) -> Self {
        Self::Class(def)
    }
}

impl From<&Arc<SerializerDef>> for NestedSpec {
    fn from(def: &Arc<SerializerDef>) -> Self {
        Self::Class(Arc::clone(def))
    }
}

impl From<SerializerDef> for NestedSpec {
    fn from(def: SerializerDef) -> Self {
        Self::Class(Arc::new(def))
    }
}

impl From<NestedConfig> for NestedSpec {
    fn from(config: NestedConfig) -> Self {
        Self::Config(Box::new(config))
    }
}

/// Declarative sub-configuration for one nested field.
///
/// # Examples
///
/// ```
/// use shapeless_serializers::{Field, NestedConfig, SerializerDef};
///
/// let author = SerializerDef::new("AuthorSerializer")
///     .field(Field::new("id"))
///     .field(Field::new("bio"))
///     .field(Field::new("website"));
///
/// let spec = NestedConfig::new(author).fields(["id", "bio"]);
/// ```
#[derive(Debug, Clone)]
pub struct NestedConfig {
    serializer: Arc<SerializerDef>,
    fields: Option<Vec<String>>,
    nested: IndexMap<String, NestedSpec>,
    rename_fields: IndexMap<String, String>,
    field_attributes: IndexMap<String, IndexMap<String, ConfigValue>>,
    conditional_fields: IndexMap<String, Condition>,
    instance: Option<ConfigValue>,
    many: Option<bool>,
    context: SerializerContext,
}

impl NestedConfig {
    pub fn new(serializer: impl Into<Arc<SerializerDef>>) -> Self {
        Self {
            serializer: serializer.into(),
            fields: None,
            nested: IndexMap::new(),
            rename_fields: IndexMap::new(),
            field_attributes: IndexMap::new(),
            conditional_fields: IndexMap::new(),
            instance: None,
            many: None,
            context: SerializerContext::new(),
        }
    }

    /// Restrict the nested serializer to these fields.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Nest further below this level.
    pub fn nested(mut self, field: impl Into<String>, spec: impl Into<NestedSpec>) -> Self {
        self.nested.insert(field.into(), spec.into());
        self
    }

    pub fn rename_field(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rename_fields.insert(from.into(), to.into());
        self
    }

    pub fn field_attribute(
        mut self,
        field: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Self {
        self.field_attributes
            .entry(field.into())
            .or_default()
            .insert(attribute.into(), value.into());
        self
    }

    pub fn condition(mut self, field: impl Into<String>, condition: impl Into<Condition>) -> Self {
        self.conditional_fields.insert(field.into(), condition.into());
        self
    }

    /// Override the data source for this field's representation: a static
    /// value or a predicate, used instead of the default attribute lookup.
    /// This is how filtered or computed nested data is rendered.
    pub fn instance(mut self, instance: impl Into<ConfigValue>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// Force element-wise rendering. When omitted, multi-valued relation
    /// values are detected from the data.
    pub fn many(mut self, many: bool) -> Self {
        self.many = Some(many);
        self
    }

    /// Context overrides for this subtree; keys here win over inherited
    /// keys.
    pub fn context(mut self, context: SerializerContext) -> Self {
        self.context = context;
        self
    }

    /// Insert a single context override.
    pub fn context_value(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.context.insert(key, value);
        self
    }

    pub fn serializer_def(&self) -> &Arc<SerializerDef> {
        &self.serializer
    }

    pub fn instance_override(&self) -> Option<&ConfigValue> {
        self.instance.as_ref()
    }

    pub fn many_flag(&self) -> Option<bool> {
        self.many
    }

    pub fn context_overrides(&self) -> &SerializerContext {
        &self.context
    }

    /// Lower this spec into a full [`SerializerConfig`] for the child
    /// serializer. The parent's depth ceiling is inherited so one limit
    /// governs the whole graph.
    pub(crate) fn to_config(&self, max_depth: usize) -> SerializerConfig {
        let mut builder = SerializerConfig::builder().max_depth(max_depth);
        if let Some(fields) = &self.fields {
            builder = builder.fields(fields.iter().cloned());
        }
        for (from, to) in &self.rename_fields {
            builder = builder.rename_field(from.clone(), to.clone());
        }
        for (field, attributes) in &self.field_attributes {
            for (attribute, value) in attributes {
                builder = builder.field_attribute(field.clone(), attribute.clone(), value.clone());
            }
        }
        for (field, condition) in &self.conditional_fields {
            builder = builder.condition(field.clone(), condition.clone());
        }
        for (field, spec) in &self.nested {
            builder = builder.nested(field.clone(), spec.clone());
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Field;

    fn author_def() -> SerializerDef {
        SerializerDef::new("AuthorSerializer")
            .field(Field::new("id"))
            .field(Field::new("bio"))
    }

    #[test]
    fn lowers_into_child_config() {
        let spec = NestedConfig::new(author_def())
            .fields(["bio"])
            .rename_field("bio", "biography")
            .condition("biography", true);

        let config = spec.to_config(7);
        assert_eq!(config.allow_fields().unwrap(), &["bio"]);
        assert_eq!(config.rename_map().get("bio").unwrap(), "biography");
        assert!(config.condition_map().contains_key("biography"));
        assert_eq!(config.max_depth(), 7);
    }

    #[test]
    fn spec_forms_convert_into_nested_spec() {
        let def = Arc::new(author_def());

        let from_class: NestedSpec = (&def).into();
        assert!(matches!(from_class, NestedSpec::Class(_)));

        let from_config: NestedSpec = NestedConfig::new(Arc::clone(&def)).into();
        assert!(matches!(from_config, NestedSpec::Config(_)));

        let from_instance: NestedSpec = def.serializer().into();
        assert!(matches!(from_instance, NestedSpec::Instance(_)));
    }
}
