//! Ambient execution context threaded through a representation build
//!
//! The context typically carries the inbound request and caller-supplied
//! auxiliary data. It is captured at construction and propagated unchanged to
//! every condition/attribute predicate and to every nested serializer, so
//! arbitrarily deep nesting sees the same ambient data plus any per-spec
//! overrides.

use indexmap::IndexMap;
use serde_json::Value;

/// String-keyed ambient data available to every predicate in a build.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shapeless_serializers::SerializerContext;
///
/// let ctx = SerializerContext::new()
///     .with("request_method", "GET")
///     .with("is_staff", false);
///
/// assert_eq!(ctx.get("request_method"), Some(&json!("GET")));
/// assert!(ctx.get("missing").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SerializerContext {
    values: IndexMap<String, Value>,
}

impl SerializerContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge `overrides` over this context. Override keys win; the result is
    /// the context a nested serializer sees for its own subtree.
    pub fn merged_with(&self, overrides: &SerializerContext) -> SerializerContext {
        let mut merged = self.clone();
        for (key, value) in &overrides.values {
            merged.values.insert(key.clone(), value.clone());
        }
        merged
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for SerializerContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn overrides_win_on_conflict() {
        let parent = SerializerContext::new()
            .with("request_method", "GET")
            .with("shared", "parent");
        let child = SerializerContext::new().with("shared", "child");

        let merged = parent.merged_with(&child);
        assert_eq!(merged.get("request_method"), Some(&json!("GET")));
        assert_eq!(merged.get("shared"), Some(&json!("child")));
        // The parent itself is untouched.
        assert_eq!(parent.get("shared"), Some(&json!("parent")));
    }

    #[test]
    fn merge_with_empty_overrides_is_identity() {
        let parent = SerializerContext::new().with("key", 1);
        let merged = parent.merged_with(&SerializerContext::new());
        assert_eq!(merged, parent);
    }

    #[test]
    fn collects_from_iterator() {
        let ctx: SerializerContext = vec![("a", json!(1)), ("b", json!("two"))]
            .into_iter()
            .collect();
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.get("b"), Some(&json!("two")));
    }
}
