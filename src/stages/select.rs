//! Field selection
//!
//! Given the declared field set and an optional allow-list, compute the
//! retained subset. Runs once at serializer construction, before any other
//! configuration touches the field set.

use crate::fields::FieldSet;

/// Compute the retained field subset.
///
/// Declaration order is preserved. Unknown names in the allow-list are
/// silently ignored, and an empty allow-list is treated the same as an
/// omitted one.
pub(crate) fn select_fields(declared: &FieldSet, allow: Option<&[String]>) -> FieldSet {
    match allow {
        Some(names) if !names.is_empty() => declared
            .iter()
            .filter(|(name, _)| names.iter().any(|n| n == *name))
            .map(|(name, field)| (name.clone(), field.clone()))
            .collect(),
        _ => declared.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Field;

    fn declared() -> FieldSet {
        ["id", "title", "price", "author"]
            .into_iter()
            .map(|name| (name.to_string(), Field::new(name)))
            .collect()
    }

    #[test]
    fn retains_intersection_in_declaration_order() {
        let allow = vec!["price".to_string(), "id".to_string()];
        let selected = select_fields(&declared(), Some(&allow));
        let names: Vec<&String> = selected.keys().collect();
        assert_eq!(names, vec!["id", "price"]);
    }

    #[test]
    fn no_allow_list_keeps_everything() {
        let selected = select_fields(&declared(), None);
        assert_eq!(selected.len(), 4);
    }

    #[test]
    fn empty_allow_list_keeps_everything() {
        let selected = select_fields(&declared(), Some(&[]));
        assert_eq!(selected.len(), 4);
    }

    #[test]
    fn unknown_names_are_silently_ignored() {
        let allow = vec!["title".to_string(), "invalid_field".to_string()];
        let selected = select_fields(&declared(), Some(&allow));
        let names: Vec<&String> = selected.keys().collect();
        assert_eq!(names, vec!["title"]);
    }
}
