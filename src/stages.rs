//! The representation-build pipeline
//!
//! Each configuration capability is an independent stage over a shared
//! mutable [`Build`] context, run in a fixed documented order:
//!
//! 1. field selection (construction time, [`select`])
//! 2. nested substitution resolution ([`nested`])
//! 3. attribute patching ([`attributes`])
//! 4. rendering ([`render`])
//! 5. output-key renaming ([`rename`])
//! 6. conditional filtering ([`conditional`])
//!
//! No stage revisits an earlier stage's output.

pub(crate) mod attributes;
pub(crate) mod conditional;
pub(crate) mod nested;
pub(crate) mod rename;
pub(crate) mod render;
pub(crate) mod select;

use indexmap::IndexMap;
use serde_json::Value;

use crate::config::SerializerConfig;
use crate::context::SerializerContext;
use crate::error::ConfigError;
use crate::fields::FieldSet;

use self::nested::ResolvedNested;

/// Mutable state shared by the representation-time stages of one build.
pub(crate) struct Build<'a> {
    pub instance: &'a Value,
    pub context: &'a SerializerContext,
    pub config: &'a SerializerConfig,
    /// Instance-scoped copy of the selected field set; attribute patching
    /// mutates this, never the shared declaration.
    pub fields: FieldSet,
    /// Nested substitutions resolved for this build, keyed by field name.
    pub resolved: IndexMap<String, ResolvedNested>,
    /// The representation under construction.
    pub output: IndexMap<String, Value>,
    /// Current nesting depth (0 at the root).
    pub depth: usize,
    /// Depth ceiling inherited from the root configuration.
    pub max_depth: usize,
}

/// One capability of the representation pipeline.
pub(crate) trait Stage: Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, build: &mut Build<'_>) -> Result<(), ConfigError>;
}

/// The representation-time stages, in their fixed order. Field selection is
/// a construction-time step and runs once in the serializer constructor.
pub(crate) const PIPELINE: &[&dyn Stage] = &[
    &nested::ResolveNested,
    &attributes::PatchAttributes,
    &render::RenderFields,
    &rename::RenameOutput,
    &conditional::FilterConditional,
];
