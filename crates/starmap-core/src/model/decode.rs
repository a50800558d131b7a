// ── JSON construction contract ──
//
// Every entity is built the same way: assert the root is an object, run the
// entity's preprocessing (key renames, child normalization, meta merge),
// then let serde extract the declared fields. Unknown keys are ignored.
// The caller's value is never modified.
//
// The serde helpers below enforce the field-level invariants, so a derived
// `Deserialize` can't produce an entity that `from_json` would reject.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::CoreError;
use crate::merge::{JsonMap, expect_object, json_type_name};

const META_NOT_A_DICT: &str = "The value for \"meta\" should be a dictionary.";

/// Construct an entity from decoded JSON.
pub trait FromJson: DeserializeOwned {
    /// Entity name used in validation errors.
    const ENTITY: &'static str;

    /// Reshape the raw object before field extraction. Identity by default.
    fn preprocess(json: JsonMap) -> Result<JsonMap, CoreError> {
        Ok(json)
    }

    /// Build from an owned object.
    fn from_object(json: JsonMap) -> Result<Self, CoreError> {
        let json = Self::preprocess(json)?;
        serde_json::from_value(Value::Object(json))
            .map_err(|e| CoreError::validation(Self::ENTITY, e.to_string()))
    }

    /// Build from any decoded JSON value; fails unless it is an object.
    fn from_json(json: &Value) -> Result<Self, CoreError> {
        Self::from_object(expect_object(json)?.clone())
    }
}

// ── Preprocessing validators ─────────────────────────────────────────

/// The `meta` object of a raw entity; absent or `null` reads as empty.
pub(crate) fn raw_meta(json: &JsonMap, entity: &'static str) -> Result<JsonMap, CoreError> {
    match json.get("meta") {
        None | Some(Value::Null) => Ok(JsonMap::new()),
        Some(Value::Object(meta)) => Ok(meta.clone()),
        Some(_) => Err(CoreError::validation(entity, META_NOT_A_DICT)),
    }
}

/// Take a list-valued field out of a raw entity; absent or `null` reads as empty.
pub(crate) fn take_list(
    json: &mut JsonMap,
    key: &str,
    entity: &'static str,
) -> Result<Vec<Value>, CoreError> {
    match json.remove(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(CoreError::validation(
            entity,
            format!(
                "Expected {key} to be a list, got \"{}\"",
                json_type_name(&other)
            ),
        )),
    }
}

/// Take an object-valued field out of a raw entity; absent or `null` reads as empty.
pub(crate) fn take_object(
    json: &mut JsonMap,
    key: &str,
    entity: &'static str,
) -> Result<JsonMap, CoreError> {
    match json.remove(key) {
        None | Some(Value::Null) => Ok(JsonMap::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(CoreError::validation(
            entity,
            format!(
                "Expected {key} to be a dictionary, got \"{}\"",
                json_type_name(&other)
            ),
        )),
    }
}

// ── Serde field validators ───────────────────────────────────────────

/// `meta`: optional object with string keys.
pub(crate) fn meta<'de, D>(deserializer: D) -> Result<Option<JsonMap>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        _ => Err(D::Error::custom(META_NOT_A_DICT)),
    }
}

/// A list that must hold at least one element.
pub(crate) fn non_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items = Vec::<T>::deserialize(deserializer)?;
    if items.is_empty() {
        return Err(D::Error::custom("expected a list with at least 1 element"));
    }
    Ok(items)
}
