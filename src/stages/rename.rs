//! Output-key renaming
//!
//! Pure relabeling of the already-rendered representation: values are
//! untouched, each renamed key keeps the position its old name occupied, and
//! a rename targeting an existing output key overwrites it. Entries whose
//! old name is absent from the output (never rendered, non-existent, or
//! write-only) are ignored.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::ConfigError;
use crate::stages::{Build, Stage};

pub(crate) struct RenameOutput;

impl Stage for RenameOutput {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn apply(&self, build: &mut Build<'_>) -> Result<(), ConfigError> {
        let rename = build.config.rename_map();
        if rename.is_empty() {
            return Ok(());
        }

        // Targets of renames that will actually happen; a plain key equal to
        // one of these is overwritten by the rename regardless of position.
        let targets: HashSet<&String> = rename
            .iter()
            .filter(|(old, _)| build.output.contains_key(*old))
            .map(|(_, new)| new)
            .collect();

        let mut relabeled = IndexMap::with_capacity(build.output.len());
        for (key, value) in build.output.drain(..) {
            if let Some(new_key) = rename.get(&key) {
                relabeled.insert(new_key.clone(), value);
            } else if targets.contains(&key) {
                // Collision: the renamed entry wins.
                continue;
            } else {
                relabeled.insert(key, value);
            }
        }
        build.output = relabeled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    use crate::config::SerializerConfig;
    use crate::context::SerializerContext;
    use crate::fields::FieldSet;

    fn run(config: &SerializerConfig, output: Vec<(&str, Value)>) -> IndexMap<String, Value> {
        let instance = json!({});
        let context = SerializerContext::new();
        let mut build = Build {
            instance: &instance,
            context: &context,
            config,
            fields: FieldSet::new(),
            resolved: IndexMap::new(),
            output: output
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            depth: 0,
            max_depth: 10,
        };
        RenameOutput.apply(&mut build).unwrap();
        build.output
    }

    #[test]
    fn renamed_key_keeps_its_position_and_value() {
        let config = SerializerConfig::builder()
            .rename_field("price", "retail_price")
            .build();
        let output = run(
            &config,
            vec![("id", json!(1)), ("price", json!(9.99)), ("title", json!("T"))],
        );

        let keys: Vec<&String> = output.keys().collect();
        assert_eq!(keys, vec!["id", "retail_price", "title"]);
        assert_eq!(output["retail_price"], json!(9.99));
    }

    #[test]
    fn absent_old_names_are_ignored() {
        let config = SerializerConfig::builder()
            .rename_field("non_existent", "new_name")
            .build();
        let output = run(&config, vec![("id", json!(1))]);
        assert_eq!(output.len(), 1);
        assert!(!output.contains_key("new_name"));
    }

    #[test]
    fn collision_with_existing_key_overwrites_it() {
        let config = SerializerConfig::builder()
            .rename_field("title", "content")
            .build();
        let output = run(
            &config,
            vec![("title", json!("Heading")), ("content", json!("Body"))],
        );

        assert_eq!(output.len(), 1);
        assert_eq!(output["content"], json!("Heading"));
    }

    #[test]
    fn collision_overwrites_even_when_target_renders_first() {
        let config = SerializerConfig::builder()
            .rename_field("title", "content")
            .build();
        let output = run(
            &config,
            vec![("content", json!("Body")), ("title", json!("Heading"))],
        );

        assert_eq!(output.len(), 1);
        assert_eq!(output["content"], json!("Heading"));
    }
}
