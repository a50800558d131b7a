// ── JSON object helpers ──
//
// Type assertion and deep merge over decoded JSON, used by entity
// normalization before typed construction.

use serde_json::Value;

use crate::error::CoreError;

/// A decoded JSON object. Key order follows the input (`preserve_order`).
pub type JsonMap = serde_json::Map<String, Value>;

/// Human-readable name of a JSON value's type, for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Borrow `value` as an object or fail with [`CoreError::UnsupportedJson`].
pub fn expect_object(value: &Value) -> Result<&JsonMap, CoreError> {
    value.as_object().ok_or(CoreError::UnsupportedJson {
        expected: "dict",
        found: json_type_name(value),
    })
}

/// Take ownership of `value` as an object or fail like [`expect_object`].
pub fn into_object(value: Value) -> Result<JsonMap, CoreError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(CoreError::UnsupportedJson {
            expected: "dict",
            found: json_type_name(&other),
        }),
    }
}

/// Deep-merge two JSON objects into a new one; `b` wins on conflicts.
///
/// Nested objects present on both sides are merged recursively. A nested
/// object in `a` whose key is absent (or `null`) in `b` is copied over.
/// Any other value in `b` replaces the one in `a`. Keys keep `a`'s order,
/// followed by keys only present in `b`.
pub fn dict_merge(a: &Value, b: &Value) -> Result<Value, CoreError> {
    let left = expect_object(a)?;
    let right = expect_object(b)?;
    Ok(Value::Object(merge_maps(left, right)))
}

/// [`dict_merge`] over already-typed objects.
pub fn merge_maps(a: &JsonMap, b: &JsonMap) -> JsonMap {
    let mut merged = a.clone();
    for (key, value) in b {
        merged.insert(key.clone(), value.clone());
    }

    for (key, left) in a {
        let Value::Object(left) = left else {
            continue;
        };
        match b.get(key) {
            Some(Value::Object(right)) => {
                merged.insert(key.clone(), Value::Object(merge_maps(left, right)));
            }
            None | Some(Value::Null) => {
                merged.insert(key.clone(), Value::Object(left.clone()));
            }
            Some(_) => {}
        }
    }
    merged
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn expect_object_rejects_other_types() {
        assert!(expect_object(&json!({})).is_ok());
        for value in [json!([]), json!("a"), json!(1), json!(1.0), json!(true), json!(null)] {
            let err = expect_object(&value).unwrap_err();
            assert!(matches!(
                err,
                CoreError::UnsupportedJson { expected: "dict", .. }
            ));
        }
    }

    #[test]
    fn flat_merges() {
        let cases = [
            (json!({}), json!({}), json!({})),
            (json!({"foo": "bar"}), json!({}), json!({"foo": "bar"})),
            (json!({}), json!({"foo": "bar"}), json!({"foo": "bar"})),
            (json!({"1": 1, "3": 3}), json!({"2": 2}), json!({"1": 1, "2": 2, "3": 3})),
            (
                json!({"1": 1, "3": 3}),
                json!({"2": 2, "3": 4}),
                json!({"1": 1, "2": 2, "3": 4}),
            ),
            (
                json!({"A": true, "B": true, "C": true}),
                json!({"B": false}),
                json!({"A": true, "B": false, "C": true}),
            ),
        ];
        for (a, b, expected) in cases {
            assert_eq!(dict_merge(&a, &b).unwrap(), expected);
        }
    }

    #[test]
    fn nested_objects_merge_recursively() {
        let a = json!({"x": {"a": 1, "b": {"deep": 1}}, "keep": {"k": 1}});
        let b = json!({"x": {"b": {"deep": 2, "new": 3}, "c": 4}});
        let merged = dict_merge(&a, &b).unwrap();
        assert_eq!(
            merged,
            json!({
                "x": {"a": 1, "b": {"deep": 2, "new": 3}, "c": 4},
                "keep": {"k": 1}
            })
        );
    }

    #[test]
    fn right_scalar_replaces_left_object() {
        let a = json!({"x": {"a": 1}});
        let b = json!({"x": "flat"});
        assert_eq!(dict_merge(&a, &b).unwrap(), json!({"x": "flat"}));
    }

    #[test]
    fn null_on_the_right_keeps_left_object() {
        let a = json!({"x": {"a": 1}});
        let b = json!({"x": null});
        assert_eq!(dict_merge(&a, &b).unwrap(), json!({"x": {"a": 1}}));
    }

    #[test]
    fn key_order_follows_left_then_right() {
        let a = json!({"z": 1, "a": 2});
        let b = json!({"m": 3, "z": 4});
        let merged = dict_merge(&a, &b).unwrap();
        let keys: Vec<_> = merged.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn inputs_are_left_untouched() {
        let a = json!({"x": {"a": 1}});
        let b = json!({"x": {"b": 2}});
        let _ = dict_merge(&a, &b).unwrap();
        assert_eq!(a, json!({"x": {"a": 1}}));
        assert_eq!(b, json!({"x": {"b": 2}}));
    }

    #[test]
    fn non_object_inputs_fail() {
        assert!(dict_merge(&json!([]), &json!({})).is_err());
        assert!(dict_merge(&json!({}), &json!("nope")).is_err());
    }
}
