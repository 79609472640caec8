//! Composable, per-instance serializer configuration
//!
//! Serializer behavior is usually fixed at declaration time: which fields
//! render, what the output keys are called, which relations expand into
//! nested objects. This crate moves those decisions to construction time.
//! A [`SerializerDef`] declares a name and an ordered field set once; each
//! [`Serializer`] instantiated from it carries its own configuration bundle
//! selecting fields, renaming output keys, patching field attributes, gating
//! fields on runtime conditions, and substituting nested serializers, without
//! touching the shared declaration or any other instance.
//!
//! Configuration comes in two equivalent forms: the typed
//! [`SerializerConfig`] builder, which cannot express a malformed
//! configuration, and an untyped options object parsed through
//! [`SerializerDef::serializer_from_options`], which validates every option's
//! shape before any state is touched and resolves nested references by name
//! through a [`SerializerRegistry`].
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use shapeless_serializers::{
//!     Field, NestedConfig, SerializerConfig, SerializerContext, SerializerDef,
//! };
//!
//! let author = SerializerDef::new("AuthorSerializer")
//!     .field(Field::new("id"))
//!     .field(Field::new("bio"))
//!     .field(Field::new("website"));
//!
//! let book = SerializerDef::new("BookSerializer")
//!     .field(Field::new("id"))
//!     .field(Field::new("title"))
//!     .field(Field::new("price"))
//!     .field(Field::new("author"));
//!
//! let config = SerializerConfig::builder()
//!     .fields(["id", "title", "price", "author"])
//!     .rename_field("price", "retail_price")
//!     .nested("author", NestedConfig::new(author).fields(["id", "bio"]))
//!     .build();
//!
//! let serializer = book.serializer_with(config, SerializerContext::new());
//! let data = serializer
//!     .serialize(&json!({
//!         "id": 1,
//!         "title": "Dynamic Serializers",
//!         "price": 29.99,
//!         "author": {"id": 7, "bio": "Writes code.", "website": "https://example.com"},
//!     }))
//!     .unwrap();
//!
//! assert_eq!(
//!     data,
//!     json!({
//!         "id": 1,
//!         "title": "Dynamic Serializers",
//!         "retail_price": 29.99,
//!         "author": {"id": 7, "bio": "Writes code."},
//!     })
//! );
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod fields;
pub mod nested;
pub mod options;
pub mod serializer;
pub mod validators;
pub mod value;

mod stages;

pub use config::{SerializerConfig, SerializerConfigBuilder, DEFAULT_MAX_DEPTH};
pub use context::SerializerContext;
pub use error::{ConfigError, SerializerError, ValidationErrors, NON_FIELD_ERRORS};
pub use fields::{Field, FieldSet};
pub use nested::{NestedConfig, NestedSpec};
pub use options::SerializerRegistry;
pub use serializer::{Serializer, SerializerDef};
pub use validators::{FieldValidator, ObjectValidator};
pub use value::{is_truthy, Condition, ConfigValue, Predicate, PredicateError};

/// Convert any [`serde::Serialize`] type into the instance representation
/// the serializers consume.
///
/// # Examples
///
/// ```
/// use serde::Serialize;
/// use serde_json::json;
///
/// #[derive(Serialize)]
/// struct Book {
///     id: u64,
///     title: String,
/// }
///
/// let book = Book { id: 1, title: "T".to_string() };
/// let instance = shapeless_serializers::to_instance(&book).unwrap();
/// assert_eq!(instance, json!({"id": 1, "title": "T"}));
/// ```
pub fn to_instance<T: serde::Serialize>(
    value: &T,
) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::to_value(value)
}
