//! Input validation through per-field and object-level validator chains.

use std::sync::Arc;

use serde_json::json;

use shapeless_serializers::validators::{
    field_validator, object_validator, MaxLengthValidator, MinValueValidator,
};
use shapeless_serializers::{
    ConfigValue, Field, SerializerConfig, SerializerContext, SerializerDef,
};

fn product_def() -> SerializerDef {
    SerializerDef::new("ProductSerializer")
        .field(Field::new("name").validator(Arc::new(MaxLengthValidator::new(50))))
        .field(Field::new("price").validator(Arc::new(MinValueValidator::new(0.0))))
}

#[test]
fn valid_data_passes_and_is_returned() {
    let serializer = product_def().serializer();
    let validated = serializer
        .validate(&json!({"name": "Widget", "price": 9.99}))
        .unwrap();
    assert_eq!(validated["name"], json!("Widget"));
    assert_eq!(validated["price"], json!(9.99));
}

#[test]
fn negative_price_fails_with_the_boundary_message() {
    let serializer = product_def().serializer();
    let errors = serializer
        .validate(&json!({"name": "Widget", "price": -10}))
        .unwrap_err()
        .into_validation()
        .unwrap();
    assert_eq!(
        errors.get("price").unwrap(),
        &["Ensure this value is greater than or equal to 0.".to_string()]
    );
    assert!(!errors.contains("name"));
}

#[test]
fn zero_price_is_accepted_at_the_boundary() {
    let serializer = product_def().serializer();
    assert!(serializer.is_valid(&json!({"name": "Widget", "price": 0})));
}

#[test]
fn configured_chains_extend_declared_ones() {
    let config = SerializerConfig::builder()
        .field_validator(
            "name",
            field_validator(|_, value| {
                match value.as_str() {
                    Some(s) if s.trim().is_empty() => {
                        Err("This field may not be blank.".to_string())
                    }
                    _ => Ok(()),
                }
            }),
        )
        .build();
    let serializer = product_def().serializer_with(config, SerializerContext::new());

    let errors = serializer
        .validate(&json!({"name": "   ", "price": 1}))
        .unwrap_err()
        .into_validation()
        .unwrap();
    assert_eq!(
        errors.get("name").unwrap(),
        &["This field may not be blank.".to_string()]
    );
}

#[test]
fn every_failing_validator_in_a_chain_reports() {
    let config = SerializerConfig::builder()
        .field_validator(
            "price",
            field_validator(|_, value| match value.as_i64() {
                Some(n) if n % 2 != 0 => Err("Ensure this value is even.".to_string()),
                _ => Ok(()),
            }),
        )
        .build();
    let serializer = product_def().serializer_with(config, SerializerContext::new());

    let errors = serializer
        .validate(&json!({"name": "W", "price": -3}))
        .unwrap_err()
        .into_validation()
        .unwrap();
    // Declared validator first, configured chain second.
    assert_eq!(
        errors.get("price").unwrap(),
        &[
            "Ensure this value is greater than or equal to 0.".to_string(),
            "Ensure this value is even.".to_string(),
        ]
    );
}

#[test]
fn object_validators_run_after_fields_pass() {
    let config = SerializerConfig::builder()
        .validator(object_validator(|data| {
            let cost = data.get("cost").and_then(|v| v.as_f64()).unwrap_or(0.0);
            let price = data.get("price").and_then(|v| v.as_f64()).unwrap_or(0.0);
            if price < cost {
                Err("Price must not be below cost.".to_string())
            } else {
                Ok(())
            }
        }))
        .build();
    let def = SerializerDef::new("ProductSerializer")
        .field(Field::new("price"))
        .field(Field::new("cost"));
    let serializer = def.serializer_with(config, SerializerContext::new());

    let errors = serializer
        .validate(&json!({"price": 5, "cost": 8}))
        .unwrap_err()
        .into_validation()
        .unwrap();
    assert_eq!(
        errors.get(shapeless_serializers::NON_FIELD_ERRORS).unwrap(),
        &["Price must not be below cost.".to_string()]
    );

    assert!(serializer.is_valid(&json!({"price": 9, "cost": 8})));
}

#[test]
fn object_validators_are_skipped_when_fields_fail() {
    let config = SerializerConfig::builder()
        .validator(object_validator(|_| Err("should not run".to_string())))
        .build();
    let serializer = product_def().serializer_with(config, SerializerContext::new());

    let errors = serializer
        .validate(&json!({"name": "W", "price": -1}))
        .unwrap_err()
        .into_validation()
        .unwrap();
    assert!(errors.contains("price"));
    assert!(!errors.contains(shapeless_serializers::NON_FIELD_ERRORS));
}

#[test]
fn required_and_null_rules_apply_before_chains() {
    let serializer = product_def().serializer();

    let errors = serializer
        .validate(&json!({}))
        .unwrap_err()
        .into_validation()
        .unwrap();
    assert_eq!(
        errors.get("name").unwrap(),
        &["This field is required.".to_string()]
    );

    let errors = serializer
        .validate(&json!({"name": null, "price": 1}))
        .unwrap_err()
        .into_validation()
        .unwrap();
    assert_eq!(
        errors.get("name").unwrap(),
        &["This field may not be null.".to_string()]
    );
}

#[test]
fn defaults_satisfy_missing_fields() {
    let def = SerializerDef::new("ProductSerializer")
        .field(Field::new("name"))
        .field(Field::new("quantity").default(1));
    let serializer = def.serializer();

    let validated = serializer.validate(&json!({"name": "W"})).unwrap();
    assert_eq!(validated["quantity"], json!(1));
}

#[test]
fn failing_attribute_predicate_is_a_configuration_error_not_validation() {
    let config = SerializerConfig::builder()
        .field_attribute(
            "price",
            "required",
            ConfigValue::computed(|_, _| Err("predicate exploded".into())),
        )
        .build();
    let serializer = product_def().serializer_with(config, SerializerContext::new());

    let err = serializer
        .validate(&json!({"name": "W", "price": 1}))
        .unwrap_err();
    let config_err = err.as_config().expect("configuration error");
    let text = config_err.to_string();
    assert!(text.contains("price"));
    assert!(text.contains("predicate exploded"));
    assert!(err.into_validation().is_none());
}

#[test]
fn wrong_typed_attribute_value_is_a_configuration_error_not_validation() {
    let config = SerializerConfig::builder()
        .field_attribute("price", "required", "maybe")
        .build();
    let serializer = product_def().serializer_with(config, SerializerContext::new());

    let err = serializer
        .validate(&json!({"name": "W", "price": 1}))
        .unwrap_err();
    assert!(err.as_config().is_some());
}

#[test]
fn patched_required_flag_relaxes_the_input_contract() {
    let config = SerializerConfig::builder()
        .field_attribute("price", "required", false)
        .build();
    let serializer = product_def().serializer_with(config, SerializerContext::new());

    let validated = serializer.validate(&json!({"name": "W"})).unwrap();
    assert!(!validated.contains_key("price"));
}

#[test]
fn patched_read_only_flag_excludes_a_field_from_input() {
    let config = SerializerConfig::builder()
        .field_attribute("price", "read_only", true)
        .build();
    let serializer = product_def().serializer_with(config, SerializerContext::new());

    // Read-only fields are neither required nor validated.
    let validated = serializer.validate(&json!({"name": "W", "price": -10})).unwrap();
    assert!(!validated.contains_key("price"));
}
