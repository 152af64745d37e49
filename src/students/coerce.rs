//! Coercion of untyped JSON request bodies into typed student fields.
//!
//! Only `name`, `age`, and `grade` are recognized; every other key (including a caller-supplied
//! `_id`) is ignored. Text fields accept numbers and booleans in their textual form, and `age`
//! accepts booleans and numeric strings.

use serde_json::{Map, Value};

use super::types::{FieldUpdate, InputError, StudentFields, StudentPatch};

const NAME: &str = "name";
const AGE: &str = "age";
const GRADE: &str = "grade";

/// Coerce a create body. `null` values are treated as absent.
pub fn coerce_fields(body: &Value) -> Result<StudentFields, InputError> {
    let object = as_object(body)?;
    Ok(StudentFields {
        name: text_field(object, NAME)?.flatten(),
        age: number_field(object, AGE)?.flatten(),
        grade: text_field(object, GRADE)?.flatten(),
    })
}

/// Coerce an update body. Absent keys are kept, `null` clears the stored value.
pub fn coerce_patch(body: &Value) -> Result<StudentPatch, InputError> {
    let object = as_object(body)?;
    Ok(StudentPatch {
        name: to_update(text_field(object, NAME)?),
        age: to_update(number_field(object, AGE)?),
        grade: to_update(text_field(object, GRADE)?),
    })
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, InputError> {
    body.as_object().ok_or(InputError::NotAnObject)
}

fn to_update<T>(field: Option<Option<T>>) -> FieldUpdate<T> {
    match field {
        None => FieldUpdate::Keep,
        Some(None) => FieldUpdate::Clear,
        Some(Some(value)) => FieldUpdate::Set(value),
    }
}

/// Outer `None`: key absent. Inner `None`: key present with an empty value.
fn text_field(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<Option<String>>, InputError> {
    let Some(value) = object.get(field) else {
        return Ok(None);
    };
    let coerced = match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Array(_) | Value::Object(_) => return Err(cast_error(field, "string", value)),
    };
    Ok(Some(coerced))
}

fn number_field(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<Option<f64>>, InputError> {
    let Some(value) = object.get(field) else {
        return Ok(None);
    };
    let coerced = match value {
        Value::Null => None,
        Value::Number(number) => match number.as_f64() {
            Some(parsed) if parsed.is_finite() => Some(parsed),
            _ => return Err(cast_error(field, "Number", value)),
        },
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => match parse_numeric(text) {
            Some(parsed) => Some(parsed),
            None => return Err(cast_error(field, "Number", value)),
        },
        Value::Array(_) | Value::Object(_) => {
            return Err(cast_error(field, "Number", value));
        }
    };
    Ok(Some(coerced))
}

/// Numeric reading of a string: blank is `0`, `0x`/`0o`/`0b` prefixes select a radix,
/// anything else must be a finite decimal literal.
fn parse_numeric(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    let prefixed = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| trimmed.strip_prefix(prefix).map(|digits| (digits, radix)));
    if let Some((digits, radix)) = prefixed {
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return None;
        }
        return u128::from_str_radix(digits, radix).ok().map(|value| value as f64);
    }

    trimmed.parse::<f64>().ok().filter(|parsed| parsed.is_finite())
}

fn cast_error(field: &'static str, expected: &'static str, value: &Value) -> InputError {
    InputError::Cast {
        field,
        expected,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_fields_reads_typed_values() {
        let fields = coerce_fields(&json!({ "name": "Alice", "age": 22, "grade": "A" }))
            .expect("fields");
        assert_eq!(
            fields,
            StudentFields {
                name: Some("Alice".into()),
                age: Some(22.0),
                grade: Some("A".into()),
            }
        );
    }

    #[test]
    fn coerce_fields_casts_loose_values() {
        let fields = coerce_fields(&json!({ "name": 42, "age": " 19 ", "grade": true }))
            .expect("fields");
        assert_eq!(fields.name.as_deref(), Some("42"));
        assert_eq!(fields.age, Some(19.0));
        assert_eq!(fields.grade.as_deref(), Some("true"));
    }

    #[test]
    fn coerce_fields_ignores_unknown_keys_and_nulls() {
        let fields = coerce_fields(&json!({
            "_id": "caller-chosen",
            "nickname": "Al",
            "grade": null
        }))
        .expect("fields");
        assert_eq!(fields, StudentFields::default());
    }

    #[test]
    fn coerce_fields_rejects_non_object_body() {
        assert_eq!(coerce_fields(&json!([1, 2])), Err(InputError::NotAnObject));
        assert_eq!(coerce_fields(&json!("Alice")), Err(InputError::NotAnObject));
    }

    #[test]
    fn coerce_fields_rejects_uncastable_age() {
        let err = coerce_fields(&json!({ "age": "twenty" })).expect_err("cast error");
        match err {
            InputError::Cast {
                field, expected, ..
            } => {
                assert_eq!(field, "age");
                assert_eq!(expected, "Number");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(coerce_fields(&json!({ "age": "0x1g" })).is_err());
        assert!(coerce_fields(&json!({ "age": [20] })).is_err());
        assert!(coerce_fields(&json!({ "name": { "first": "A" } })).is_err());
    }

    #[test]
    fn coerce_fields_casts_booleans_to_numeric_age() {
        let fields = coerce_fields(&json!({ "age": true })).expect("fields");
        assert_eq!(fields.age, Some(1.0));
        let fields = coerce_fields(&json!({ "age": false })).expect("fields");
        assert_eq!(fields.age, Some(0.0));
    }

    #[test]
    fn coerce_fields_reads_whitespace_age_as_zero_and_empty_as_absent() {
        let fields = coerce_fields(&json!({ "age": "   " })).expect("fields");
        assert_eq!(fields.age, Some(0.0));
        let fields = coerce_fields(&json!({ "age": "" })).expect("fields");
        assert_eq!(fields.age, None);
    }

    #[test]
    fn coerce_fields_reads_radix_prefixed_ages() {
        let age = |raw: &str| coerce_fields(&json!({ "age": raw })).expect("fields").age;
        assert_eq!(age("0x10"), Some(16.0));
        assert_eq!(age(" 0o17 "), Some(15.0));
        assert_eq!(age("0B101"), Some(5.0));
        assert!(coerce_fields(&json!({ "age": "0x" })).is_err());
        assert!(coerce_fields(&json!({ "age": "0x+10" })).is_err());
    }

    #[test]
    fn coerce_patch_distinguishes_absent_and_null() {
        let patch = coerce_patch(&json!({ "grade": "A", "age": null })).expect("patch");
        assert_eq!(patch.name, FieldUpdate::Keep);
        assert_eq!(patch.age, FieldUpdate::Clear);
        assert_eq!(patch.grade, FieldUpdate::Set("A".into()));
    }

    #[test]
    fn coerce_patch_accepts_empty_object() {
        let patch = coerce_patch(&json!({})).expect("patch");
        assert!(patch.is_empty());
    }
}
