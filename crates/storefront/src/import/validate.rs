//! Field-level validation of raw import records.
//!
//! [`validate_record`] checks one JSON object against a field table and
//! returns a cleaned copy containing only known, non-null fields. Nested
//! objects are cleaned the same way and reported with paths such as
//! `images[2].url`.

use serde_json::{Map, Value};

use atelier_core::Handle;

use super::error::FieldError;
use super::schema::{FieldKind, FieldSpec};

/// Validate `record` against `fields`.
///
/// # Errors
///
/// Returns the first [`FieldError`] found, in field-table order.
pub fn validate_record(
    record: &Value,
    fields: &[FieldSpec],
) -> Result<Map<String, Value>, FieldError> {
    validate_object(record, fields, "")
}

fn validate_object(
    value: &Value,
    fields: &[FieldSpec],
    prefix: &str,
) -> Result<Map<String, Value>, FieldError> {
    let Value::Object(object) = value else {
        return Err(if prefix.is_empty() {
            FieldError::NotAnObject
        } else {
            FieldError::WrongType {
                field: prefix.to_owned(),
                expected: "an object",
            }
        });
    };

    let mut cleaned = Map::new();
    for spec in fields {
        let path = if prefix.is_empty() {
            spec.name.to_owned()
        } else {
            format!("{prefix}.{}", spec.name)
        };

        match object.get(spec.name) {
            None | Some(Value::Null) => {
                if spec.required {
                    return Err(FieldError::Missing(path));
                }
            }
            Some(value) => {
                let checked = check_field(value, spec, &path)?;
                cleaned.insert(spec.name.to_owned(), checked);
            }
        }
    }
    Ok(cleaned)
}

fn check_field(value: &Value, spec: &FieldSpec, path: &str) -> Result<Value, FieldError> {
    match spec.kind {
        FieldKind::Text { max } => {
            let s = expect_str(value, path)?;
            if spec.required && s.trim().is_empty() {
                return Err(FieldError::Missing(path.to_owned()));
            }
            check_len(s, max, path)?;
            Ok(value.clone())
        }
        FieldKind::Handle => {
            let s = expect_str(value, path)?;
            let handle = Handle::parse(s).map_err(|source| FieldError::InvalidHandle {
                field: path.to_owned(),
                source,
            })?;
            Ok(Value::String(handle.into_inner()))
        }
        FieldKind::Integer { min, max } => {
            let n = as_whole_number(value).ok_or_else(|| FieldError::WrongType {
                field: path.to_owned(),
                expected: "an integer",
            })?;
            if !(min..=max).contains(&n) {
                return Err(FieldError::OutOfRange {
                    field: path.to_owned(),
                });
            }
            Ok(Value::from(n))
        }
        FieldKind::Number { max } => {
            let n = value.as_f64().ok_or_else(|| FieldError::WrongType {
                field: path.to_owned(),
                expected: "a number",
            })?;
            if !n.is_finite() || n < 0.0 || n > max {
                return Err(FieldError::OutOfRange {
                    field: path.to_owned(),
                });
            }
            Ok(value.clone())
        }
        FieldKind::Boolean => {
            if value.is_boolean() {
                Ok(value.clone())
            } else {
                Err(FieldError::WrongType {
                    field: path.to_owned(),
                    expected: "a boolean",
                })
            }
        }
        FieldKind::TextArray { max_items, max_len } => {
            let items = expect_array(value, max_items, path, "an array of strings")?;
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{i}]");
                let s = expect_str(item, &item_path)?;
                check_len(s, max_len, &item_path)?;
            }
            Ok(value.clone())
        }
        FieldKind::ObjectArray { max_items, fields } => {
            let items = expect_array(value, max_items, path, "an array of objects")?;
            let cleaned = items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    validate_object(item, fields, &format!("{path}[{i}]")).map(Value::Object)
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(cleaned))
        }
    }
}

fn expect_str<'a>(value: &'a Value, path: &str) -> Result<&'a str, FieldError> {
    value.as_str().ok_or_else(|| FieldError::WrongType {
        field: path.to_owned(),
        expected: "a string",
    })
}

fn expect_array<'a>(
    value: &'a Value,
    max_items: usize,
    path: &str,
    expected: &'static str,
) -> Result<&'a Vec<Value>, FieldError> {
    let items = value.as_array().ok_or_else(|| FieldError::WrongType {
        field: path.to_owned(),
        expected,
    })?;
    if items.len() > max_items {
        return Err(FieldError::TooManyItems {
            field: path.to_owned(),
            max: max_items,
        });
    }
    Ok(items)
}

fn check_len(s: &str, max: usize, path: &str) -> Result<(), FieldError> {
    if s.chars().count() > max {
        return Err(FieldError::TooLong {
            field: path.to_owned(),
            max,
        });
    }
    Ok(())
}

/// Integers, or floats with no fractional part (`2024.0` from spreadsheet exports).
// Casts are guarded by the range check
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn as_whole_number(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::import::schema::{BRAND_FIELDS, PRODUCT_FIELDS};

    #[test]
    fn test_valid_brand_is_cleaned() {
        let record = json!({
            "handle": "  maison-verre ",
            "name": "Maison Verre",
            "country": null,
            "founded_year": 1987.0,
            "is_featured": true,
            "tags": ["glass", "paris"],
            "instagram": "@maisonverre"
        });

        let cleaned = validate_record(&record, BRAND_FIELDS).unwrap();
        assert_eq!(cleaned["handle"], "maison-verre");
        assert_eq!(cleaned["founded_year"], 1987);
        assert!(!cleaned.contains_key("country"));
        assert!(!cleaned.contains_key("instagram"));
    }

    #[test]
    fn test_missing_and_blank_required_fields() {
        let err = validate_record(&json!({"name": "X"}), BRAND_FIELDS).unwrap_err();
        assert_eq!(err, FieldError::Missing("handle".to_owned()));

        let err =
            validate_record(&json!({"handle": "x", "name": "   "}), BRAND_FIELDS).unwrap_err();
        assert_eq!(err, FieldError::Missing("name".to_owned()));

        let err =
            validate_record(&json!({"handle": "x", "name": null}), BRAND_FIELDS).unwrap_err();
        assert_eq!(err, FieldError::Missing("name".to_owned()));
    }

    #[test]
    fn test_type_and_length_errors() {
        let err = validate_record(&json!({"handle": "x", "name": 7}), BRAND_FIELDS).unwrap_err();
        assert!(matches!(err, FieldError::WrongType { ref field, .. } if field == "name"));

        let long = "a".repeat(101);
        let err = validate_record(
            &json!({"handle": "x", "name": "X", "country": long}),
            BRAND_FIELDS,
        )
        .unwrap_err();
        assert_eq!(
            err,
            FieldError::TooLong {
                field: "country".to_owned(),
                max: 100
            }
        );

        let err = validate_record(
            &json!({"handle": "x", "name": "X", "is_featured": "yes"}),
            BRAND_FIELDS,
        )
        .unwrap_err();
        assert!(matches!(err, FieldError::WrongType { expected: "a boolean", .. }));
    }

    #[test]
    fn test_invalid_handle() {
        let err = validate_record(&json!({"handle": "two words", "name": "X"}), BRAND_FIELDS)
            .unwrap_err();
        assert!(matches!(err, FieldError::InvalidHandle { .. }));

        let err = validate_record(&json!({"handle": "   ", "name": "X"}), BRAND_FIELDS)
            .unwrap_err();
        assert!(matches!(err, FieldError::InvalidHandle { .. }));
    }

    #[test]
    fn test_handle_is_trimmed() {
        let cleaned =
            validate_record(&json!({"handle": "  summer-dress ", "name": "X"}), BRAND_FIELDS)
                .unwrap();
        assert_eq!(cleaned["handle"], "summer-dress");
    }

    #[test]
    fn test_tag_limits() {
        let tags: Vec<String> = (0..51).map(|i| format!("t{i}")).collect();
        let err = validate_record(&json!({"handle": "x", "name": "X", "tags": tags}), BRAND_FIELDS)
            .unwrap_err();
        assert_eq!(
            err,
            FieldError::TooManyItems {
                field: "tags".to_owned(),
                max: 50
            }
        );

        let err = validate_record(
            &json!({"handle": "x", "name": "X", "tags": ["ok", 3]}),
            BRAND_FIELDS,
        )
        .unwrap_err();
        assert!(matches!(err, FieldError::WrongType { ref field, .. } if field == "tags[1]"));
    }

    #[test]
    fn test_negative_price_rejected() {
        let err = validate_record(
            &json!({"handle": "coat", "title": "Coat", "price": -1}),
            PRODUCT_FIELDS,
        )
        .unwrap_err();
        assert_eq!(
            err,
            FieldError::OutOfRange {
                field: "price".to_owned()
            }
        );
    }

    #[test]
    fn test_nested_paths() {
        let record = json!({
            "handle": "coat",
            "title": "Coat",
            "images": [{"url": "https://cdn/a.jpg"}, {"alt_text": "back"}],
        });
        let err = validate_record(&record, PRODUCT_FIELDS).unwrap_err();
        assert_eq!(err, FieldError::Missing("images[1].url".to_owned()));

        let record = json!({
            "handle": "coat",
            "title": "Coat",
            "variants": [{"title": "S", "inventory_quantity": 2.5}],
        });
        let err = validate_record(&record, PRODUCT_FIELDS).unwrap_err();
        assert!(matches!(
            err,
            FieldError::WrongType { ref field, .. } if field == "variants[0].inventory_quantity"
        ));
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(
            validate_record(&json!(["handle"]), BRAND_FIELDS).unwrap_err(),
            FieldError::NotAnObject
        );
    }
}
