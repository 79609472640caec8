//! Conditional field filtering
//!
//! Runs last, on the fully rendered and renamed output. A falsy condition
//! removes its key; a truthy one leaves it in place. A condition cannot
//! resurrect a key that was never rendered, and entries referencing absent
//! keys are silently ignored. Predicate failures are wrapped so they are
//! attributable to configuration, never left to propagate raw.

use crate::error::ConfigError;
use crate::stages::{Build, Stage};

pub(crate) struct FilterConditional;

impl Stage for FilterConditional {
    fn name(&self) -> &'static str {
        "filter-conditional"
    }

    fn apply(&self, build: &mut Build<'_>) -> Result<(), ConfigError> {
        for (field_name, condition) in build.config.condition_map() {
            if !build.output.contains_key(field_name) {
                continue;
            }
            if !condition.evaluate(field_name, build.instance, build.context)? {
                build.output.shift_remove(field_name);
            }
        }
        Ok(())
    }
}
