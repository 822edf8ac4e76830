//! Typed field extractors over raw JSON object nodes, shared by the
//! decoders in this crate.

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Human-readable type name for a JSON value.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn object<'a>(kind: &'static str, node: &'a Value) -> Result<&'a Map<String, Value>> {
    node.as_object().ok_or_else(|| Error::Invalid {
        kind,
        message: format!("expected an object, got {}", json_type_name(node)),
    })
}

pub(crate) fn str_field(
    kind: &'static str,
    object: &Map<String, Value>,
    key: &str,
) -> Result<Option<String>> {
    match object.get(key) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(other) => Err(wrong_type(kind, key, "a string", other)),
    }
}

pub(crate) fn bool_field(
    kind: &'static str,
    object: &Map<String, Value>,
    key: &str,
) -> Result<Option<bool>> {
    match object.get(key) {
        None => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(*value)),
        Some(other) => Err(wrong_type(kind, key, "a boolean", other)),
    }
}

pub(crate) fn f64_field(
    kind: &'static str,
    object: &Map<String, Value>,
    key: &str,
) -> Result<Option<f64>> {
    match object.get(key) {
        None => Ok(None),
        Some(Value::Number(value)) => Ok(value.as_f64()),
        Some(other) => Err(wrong_type(kind, key, "a number", other)),
    }
}

pub(crate) fn usize_field(
    kind: &'static str,
    object: &Map<String, Value>,
    key: &str,
) -> Result<Option<usize>> {
    match object.get(key) {
        None => Ok(None),
        Some(value) => match value.as_u64() {
            Some(n) => Ok(Some(n as usize)),
            None => Err(wrong_type(kind, key, "a non-negative integer", value)),
        },
    }
}

pub(crate) fn string_array_field(
    kind: &'static str,
    object: &Map<String, Value>,
    key: &str,
) -> Result<Option<Vec<String>>> {
    match object.get(key) {
        None => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(value) => Ok(value.clone()),
                other => Err(wrong_type(kind, key, "an array of strings", other)),
            })
            .collect::<Result<Vec<_>>>()
            .map(Some),
        Some(other) => Err(wrong_type(kind, key, "an array of strings", other)),
    }
}

pub(crate) fn value_map_field(
    kind: &'static str,
    object: &Map<String, Value>,
    key: &str,
) -> Result<std::collections::BTreeMap<String, Value>> {
    match object.get(key) {
        None => Ok(Default::default()),
        Some(Value::Object(entries)) => Ok(entries
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()),
        Some(other) => Err(wrong_type(kind, key, "an object", other)),
    }
}

fn wrong_type(kind: &'static str, key: &str, expected: &str, got: &Value) -> Error {
    Error::Invalid {
        kind,
        message: format!("field {key:?} must be {expected}, got {}", json_type_name(got)),
    }
}
