//! Rendering
//!
//! Produce the ordered key→value mapping for the selected, nested-resolved,
//! attribute-patched field set. Substituted fields delegate to their child
//! serializer; everything else renders by attribute lookup. Write-only
//! fields are excluded from output.

use crate::error::ConfigError;
use crate::stages::{Build, Stage};

pub(crate) struct RenderFields;

impl Stage for RenderFields {
    fn name(&self) -> &'static str {
        "render"
    }

    fn apply(&self, build: &mut Build<'_>) -> Result<(), ConfigError> {
        for (name, field) in &build.fields {
            if field.is_write_only() {
                continue;
            }
            let value = match build.resolved.get(name) {
                Some(resolved) => resolved.render(
                    field,
                    build.instance,
                    build.context,
                    build.depth,
                    build.max_depth,
                )?,
                None => field.to_representation(build.instance),
            };
            build.output.insert(name.clone(), value);
        }
        Ok(())
    }
}
