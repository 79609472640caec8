//! Attribute patching
//!
//! Applies per-field attribute overrides onto the surviving field
//! definitions before rendering, so attributes such as `write_only` affect
//! whether and how the underlying rendering happens. Overrides are literals
//! or `(instance, context)` predicates; either way the resolved value goes
//! through the bounded typed setter on [`crate::Field`].

use indexmap::IndexMap;
use serde_json::Value;

use crate::context::SerializerContext;
use crate::error::ConfigError;
use crate::fields::FieldSet;
use crate::stages::{Build, Stage};
use crate::value::ConfigValue;

pub(crate) struct PatchAttributes;

impl Stage for PatchAttributes {
    fn name(&self) -> &'static str {
        "patch-attributes"
    }

    fn apply(&self, build: &mut Build<'_>) -> Result<(), ConfigError> {
        patch(
            &mut build.fields,
            build.config.attribute_map(),
            build.instance,
            build.context,
        )
    }
}

/// Apply an attribute map onto a field set. Also used on the validation
/// path, where the patched flags govern the input contract.
pub(crate) fn patch(
    fields: &mut FieldSet,
    attribute_map: &IndexMap<String, IndexMap<String, ConfigValue>>,
    instance: &Value,
    context: &SerializerContext,
) -> Result<(), ConfigError> {
    for (field_name, overrides) in attribute_map {
        // Unknown field names are tolerated, not errors.
        let Some(field) = fields.get_mut(field_name) else {
            continue;
        };
        for (attribute, value) in overrides {
            let resolved = value.resolve(instance, context).map_err(|err| {
                ConfigError::AttributeEvaluation {
                    field: field_name.clone(),
                    attribute: attribute.clone(),
                    message: err.to_string(),
                }
            })?;
            field.set_attribute(attribute, resolved)?;
        }
    }
    Ok(())
}
