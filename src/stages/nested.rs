//! Nested substitution resolution
//!
//! For each configured relation field that survived selection, resolve the
//! [`crate::NestedSpec`] to a concrete child serializer, carrying the
//! parent's context merged with any spec-level overrides. Rendering then
//! delegates to the child: the `instance` override if supplied, otherwise
//! the natural attribute value looked up from the parent instance, with
//! element-wise rendering for multi-valued relations. Recursion is
//! depth-counted against the root's ceiling; a spec beyond the ceiling is
//! ignored and the field falls back to default rendering.

use serde_json::Value;
use tracing::debug;

use crate::error::ConfigError;
use crate::fields::Field;
use crate::nested::NestedSpec;
use crate::serializer::Serializer;
use crate::stages::{Build, Stage};
use crate::value::ConfigValue;

/// A nested spec resolved for one build: the child serializer plus the
/// data-source override and the many flag recorded from the spec.
pub(crate) struct ResolvedNested {
    serializer: Serializer,
    instance_override: Option<ConfigValue>,
    many: Option<bool>,
}

impl ResolvedNested {
    /// Render the substituted field value.
    pub(crate) fn render(
        &self,
        field: &Field,
        instance: &Value,
        context: &crate::context::SerializerContext,
        depth: usize,
        max_depth: usize,
    ) -> Result<Value, ConfigError> {
        let source = match &self.instance_override {
            Some(value) => value.resolve(instance, context).map_err(|err| {
                ConfigError::NestedInstanceEvaluation {
                    field: field.name().to_string(),
                    message: err.to_string(),
                }
            })?,
            None => field.to_representation(instance),
        };

        match source {
            // A missing to-one relation renders as explicit null.
            Value::Null => Ok(Value::Null),
            Value::Array(items) => {
                let mut rendered = Vec::with_capacity(items.len());
                for item in &items {
                    rendered.push(self.serializer.represent_value(item, depth + 1, max_depth)?);
                }
                Ok(Value::Array(rendered))
            }
            other => {
                let rendered = self.serializer.represent_value(&other, depth + 1, max_depth)?;
                if self.many == Some(true) {
                    Ok(Value::Array(vec![rendered]))
                } else {
                    Ok(rendered)
                }
            }
        }
    }
}

pub(crate) struct ResolveNested;

impl Stage for ResolveNested {
    fn name(&self) -> &'static str {
        "resolve-nested"
    }

    fn apply(&self, build: &mut Build<'_>) -> Result<(), ConfigError> {
        for (field_name, spec) in build.config.nested_map() {
            // Unknown field names are tolerated, not errors.
            if !build.fields.contains_key(field_name) {
                continue;
            }
            if build.depth >= build.max_depth {
                debug!(
                    field = %field_name,
                    depth = build.depth,
                    max_depth = build.max_depth,
                    "nested substitution skipped at depth ceiling"
                );
                continue;
            }

            let resolved = resolve_spec(spec, build)?;
            build.resolved.insert(field_name.clone(), resolved);
        }
        Ok(())
    }
}

fn resolve_spec(spec: &NestedSpec, build: &Build<'_>) -> Result<ResolvedNested, ConfigError> {
    match spec {
        NestedSpec::Instance(serializer) => {
            // The instance carries its own configuration, resolved at its
            // own construction time; only the context is inherited, with
            // the instance's own keys winning.
            let mut child = serializer.as_ref().clone();
            child.inherit_context(build.context);
            Ok(ResolvedNested {
                many: child.is_many().then_some(true),
                serializer: child,
                instance_override: None,
            })
        }
        NestedSpec::Class(def) => {
            let config = crate::SerializerConfig::builder()
                .max_depth(build.max_depth)
                .build();
            let child = def.serializer_with(config, build.context.clone());
            Ok(ResolvedNested {
                serializer: child,
                instance_override: None,
                many: None,
            })
        }
        NestedSpec::Config(config) => {
            let context = build.context.merged_with(config.context_overrides());
            let child = config
                .serializer_def()
                .serializer_with(config.to_config(build.max_depth), context);
            Ok(ResolvedNested {
                serializer: child,
                instance_override: config.instance_override().cloned(),
                many: config.many_flag(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    use crate::config::SerializerConfig;
    use crate::context::SerializerContext;
    use crate::fields::{Field, FieldSet};
    use crate::nested::NestedConfig;
    use crate::serializer::SerializerDef;

    fn author_def() -> SerializerDef {
        SerializerDef::new("AuthorSerializer")
            .field(Field::new("id"))
            .field(Field::new("bio"))
    }

    fn parent_fields() -> FieldSet {
        [
            ("title".to_string(), Field::new("title")),
            ("author".to_string(), Field::new("author")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn resolves_declarative_spec_for_existing_field() {
        let config = SerializerConfig::builder()
            .nested("author", NestedConfig::new(author_def()).fields(["bio"]))
            .build();
        let instance = json!({});
        let context = SerializerContext::new();
        let mut build = Build {
            instance: &instance,
            context: &context,
            config: &config,
            fields: parent_fields(),
            resolved: IndexMap::new(),
            output: IndexMap::new(),
            depth: 0,
            max_depth: 10,
        };
        ResolveNested.apply(&mut build).unwrap();
        assert!(build.resolved.contains_key("author"));
    }

    #[test]
    fn unknown_field_spec_is_ignored() {
        let config = SerializerConfig::builder()
            .nested("no_such_field", NestedConfig::new(author_def()))
            .build();
        let instance = json!({});
        let context = SerializerContext::new();
        let mut build = Build {
            instance: &instance,
            context: &context,
            config: &config,
            fields: parent_fields(),
            resolved: IndexMap::new(),
            output: IndexMap::new(),
            depth: 0,
            max_depth: 10,
        };
        ResolveNested.apply(&mut build).unwrap();
        assert!(build.resolved.is_empty());
    }

    #[test]
    fn spec_at_depth_ceiling_is_skipped() {
        let config = SerializerConfig::builder()
            .nested("author", NestedConfig::new(author_def()))
            .build();
        let instance = json!({});
        let context = SerializerContext::new();
        let mut build = Build {
            instance: &instance,
            context: &context,
            config: &config,
            fields: parent_fields(),
            resolved: IndexMap::new(),
            output: IndexMap::new(),
            depth: 3,
            max_depth: 3,
        };
        ResolveNested.apply(&mut build).unwrap();
        assert!(build.resolved.is_empty());
    }

    #[test]
    fn spec_context_overrides_win_over_parent() {
        let config = SerializerConfig::builder()
            .nested(
                "author",
                NestedConfig::new(author_def())
                    .context_value("shared", "child")
                    .context_value("extra_info", "test"),
            )
            .build();
        let instance = json!({});
        let context = SerializerContext::new()
            .with("request_method", "GET")
            .with("shared", "parent");
        let mut build = Build {
            instance: &instance,
            context: &context,
            config: &config,
            fields: parent_fields(),
            resolved: IndexMap::new(),
            output: IndexMap::new(),
            depth: 0,
            max_depth: 10,
        };
        ResolveNested.apply(&mut build).unwrap();

        let child = &build.resolved["author"].serializer;
        assert_eq!(child.context().get("request_method"), Some(&json!("GET")));
        assert_eq!(child.context().get("shared"), Some(&json!("child")));
        assert_eq!(child.context().get("extra_info"), Some(&json!("test")));
    }
}
