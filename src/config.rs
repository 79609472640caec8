//! The per-instance configuration bundle
//!
//! A [`SerializerConfig`] is an immutable bundle captured at construction
//! with five independent optional components: the field allow-list, the
//! rename map, the attribute map, the condition map, and the nested map,
//! plus the delegated validator chains and the recursion depth limit.
//! Every component defaults to "no change from the declared serializer".

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::nested::NestedSpec;
use crate::validators::{FieldValidator, ObjectValidator};
use crate::value::{Condition, ConfigValue};

/// Default maximum nesting depth for the substitution resolver.
///
/// Depth is naturally bounded by how many explicit levels a configuration
/// writes, but a default ceiling guards against accidental unbounded
/// configuration graphs built by reference.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Immutable configuration captured at serializer construction.
///
/// # Examples
///
/// ```
/// use shapeless_serializers::SerializerConfig;
///
/// let config = SerializerConfig::builder()
///     .fields(["id", "title", "price"])
///     .rename_field("price", "retail_price")
///     .condition("title", true)
///     .build();
///
/// assert_eq!(config.rename_map().get("price").unwrap(), "retail_price");
/// ```
#[derive(Clone)]
pub struct SerializerConfig {
    allow_fields: Option<Vec<String>>,
    rename_map: IndexMap<String, String>,
    attribute_map: IndexMap<String, IndexMap<String, ConfigValue>>,
    condition_map: IndexMap<String, Condition>,
    nested_map: IndexMap<String, NestedSpec>,
    field_validators: IndexMap<String, Vec<Arc<dyn FieldValidator>>>,
    validators: Vec<Arc<dyn ObjectValidator>>,
    max_depth: usize,
}

impl SerializerConfig {
    pub fn builder() -> SerializerConfigBuilder {
        SerializerConfigBuilder::default()
    }

    /// Field names to retain; `None` retains all. An empty allow-list is
    /// treated the same as an omitted one.
    pub fn allow_fields(&self) -> Option<&[String]> {
        self.allow_fields.as_deref()
    }

    pub fn rename_map(&self) -> &IndexMap<String, String> {
        &self.rename_map
    }

    pub fn attribute_map(&self) -> &IndexMap<String, IndexMap<String, ConfigValue>> {
        &self.attribute_map
    }

    pub fn condition_map(&self) -> &IndexMap<String, Condition> {
        &self.condition_map
    }

    pub fn nested_map(&self) -> &IndexMap<String, NestedSpec> {
        &self.nested_map
    }

    pub fn field_validators(&self) -> &IndexMap<String, Vec<Arc<dyn FieldValidator>>> {
        &self.field_validators
    }

    pub fn validators(&self) -> &[Arc<dyn ObjectValidator>] {
        &self.validators
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for SerializerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerConfig")
            .field("allow_fields", &self.allow_fields)
            .field("rename_map", &self.rename_map)
            .field("attribute_map", &self.attribute_map)
            .field("condition_map", &self.condition_map)
            .field("nested_map", &self.nested_map)
            .field("field_validators", &self.field_validators.len())
            .field("validators", &self.validators.len())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

/// Fluent builder for [`SerializerConfig`].
#[derive(Clone)]
pub struct SerializerConfigBuilder {
    allow_fields: Option<Vec<String>>,
    rename_map: IndexMap<String, String>,
    attribute_map: IndexMap<String, IndexMap<String, ConfigValue>>,
    condition_map: IndexMap<String, Condition>,
    nested_map: IndexMap<String, NestedSpec>,
    field_validators: IndexMap<String, Vec<Arc<dyn FieldValidator>>>,
    validators: Vec<Arc<dyn ObjectValidator>>,
    max_depth: usize,
}

impl Default for SerializerConfigBuilder {
    fn default() -> Self {
        Self {
            allow_fields: None,
            rename_map: IndexMap::new(),
            attribute_map: IndexMap::new(),
            condition_map: IndexMap::new(),
            nested_map: IndexMap::new(),
            field_validators: IndexMap::new(),
            validators: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SerializerConfigBuilder {
    /// Restrict output to these field names. Unknown names are silently
    /// ignored at selection time.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Relabel one output key.
    pub fn rename_field(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rename_map.insert(from.into(), to.into());
        self
    }

    /// Relabel several output keys at once.
    pub fn rename_fields<I, K, V>(mut self, renames: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (from, to) in renames {
            self.rename_map.insert(from.into(), to.into());
        }
        self
    }

    /// Override one behavior attribute of a field before rendering.
    pub fn field_attribute(
        mut self,
        field: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Self {
        self.attribute_map
            .entry(field.into())
            .or_default()
            .insert(attribute.into(), value.into());
        self
    }

    /// Gate presence of an output key on a boolean or a predicate.
    pub fn condition(mut self, field: impl Into<String>, condition: impl Into<Condition>) -> Self {
        self.condition_map.insert(field.into(), condition.into());
        self
    }

    /// Substitute a relation field's rendering with a nested serializer.
    pub fn nested(mut self, field: impl Into<String>, spec: impl Into<NestedSpec>) -> Self {
        self.nested_map.insert(field.into(), spec.into());
        self
    }

    /// Append a validator to a field's input-validation chain.
    pub fn field_validator(
        mut self,
        field: impl Into<String>,
        validator: Arc<dyn FieldValidator>,
    ) -> Self {
        self.field_validators
            .entry(field.into())
            .or_default()
            .push(validator);
        self
    }

    /// Install an object-level validator.
    pub fn validator(mut self, validator: Arc<dyn ObjectValidator>) -> Self {
        self.validators.push(validator);
        self
    }

    /// Override the nested recursion ceiling ([`DEFAULT_MAX_DEPTH`]).
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn build(self) -> SerializerConfig {
        SerializerConfig {
            allow_fields: self.allow_fields,
            rename_map: self.rename_map,
            attribute_map: self.attribute_map,
            condition_map: self.condition_map,
            nested_map: self.nested_map,
            field_validators: self.field_validators,
            validators: self.validators,
            max_depth: self.max_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Condition;

    #[test]
    fn empty_config_changes_nothing() {
        let config = SerializerConfig::default();
        assert!(config.allow_fields().is_none());
        assert!(config.rename_map().is_empty());
        assert!(config.attribute_map().is_empty());
        assert!(config.condition_map().is_empty());
        assert!(config.nested_map().is_empty());
        assert_eq!(config.max_depth(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn builder_collects_all_components() {
        let config = SerializerConfig::builder()
            .fields(["id", "title"])
            .rename_field("title", "heading")
            .field_attribute("id", "read_only", true)
            .condition("title", Condition::Static(false))
            .max_depth(3)
            .build();

        assert_eq!(config.allow_fields().unwrap(), &["id", "title"]);
        assert_eq!(config.rename_map().get("title").unwrap(), "heading");
        assert!(config.attribute_map().contains_key("id"));
        assert!(config.condition_map().contains_key("title"));
        assert_eq!(config.max_depth(), 3);
    }

    #[test]
    fn repeated_attribute_calls_merge_per_field() {
        let config = SerializerConfig::builder()
            .field_attribute("title", "write_only", true)
            .field_attribute("title", "label", "Title")
            .build();
        assert_eq!(config.attribute_map().get("title").unwrap().len(), 2);
    }
}
