//! Shape checks shared by rule and variable definitions.
//!
//! Definitions arrive as loosely typed JSON (usually converted from YAML), so
//! every constructor validates its input here before building anything.

use crate::error::SchemaError;
use serde_json::{Map, Value};

pub(crate) type Definition = Map<String, Value>;

/// "rule 'scaling'" / "variable 'type'", or just the kind when unnamed.
pub(crate) fn subject(kind: &str, value: &Value) -> String {
    match value.get("name").and_then(Value::as_str) {
        Some(name) => format!("{kind} '{name}'"),
        None => kind.to_string(),
    }
}

pub(crate) fn as_definition<'v>(subject: &str, value: &'v Value) -> Result<&'v Definition, SchemaError> {
    value.as_object().ok_or_else(|| SchemaError::NotAMapping { subject: subject.to_string() })
}

/// Every `required` key must be present; nothing outside `required` and
/// `optional` may be. Both reported sets are sorted.
pub(crate) fn check_keys(
    subject: &str,
    def: &Definition,
    required: &[&str],
    optional: &[&str],
) -> Result<(), SchemaError> {
    let mut missing: Vec<String> =
        required.iter().filter(|key| !def.contains_key(**key)).map(|key| key.to_string()).collect();
    let mut extra: Vec<String> = def
        .keys()
        .filter(|key| !required.contains(&key.as_str()) && !optional.contains(&key.as_str()))
        .cloned()
        .collect();

    if missing.is_empty() && extra.is_empty() {
        return Ok(());
    }

    missing.sort();
    extra.sort();
    Err(SchemaError::Keys { subject: subject.to_string(), missing, extra })
}

pub(crate) fn name_field(subject: &str, def: &Definition) -> Result<String, SchemaError> {
    match def.get("name").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(shape(subject, "name", "a non-empty string")),
    }
}

pub(crate) fn string_field(subject: &str, def: &Definition, field: &'static str) -> Result<String, SchemaError> {
    def.get(field).and_then(Value::as_str).map(str::to_string).ok_or_else(|| shape(subject, field, "a string"))
}

/// A string, or null for "empty".
pub(crate) fn nullable_string_field(
    subject: &str,
    def: &Definition,
    field: &'static str,
) -> Result<String, SchemaError> {
    match def.get(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(shape(subject, field, "a string")),
    }
}

/// A scalar rendered as text. Numbers and booleans are accepted because YAML
/// happily turns `value: 10` into an integer.
pub(crate) fn scalar_field(subject: &str, def: &Definition, field: &'static str) -> Result<String, SchemaError> {
    match def.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        _ => Err(shape(subject, field, "a string, number or boolean")),
    }
}

pub(crate) fn sequence_field<'v>(
    subject: &str,
    def: &'v Definition,
    field: &'static str,
) -> Result<&'v [Value], SchemaError> {
    def.get(field).and_then(Value::as_array).map(Vec::as_slice).ok_or_else(|| shape(subject, field, "a sequence"))
}

/// A sequence of strings; absent or null reads as empty.
pub(crate) fn string_list_field(
    subject: &str,
    def: &Definition,
    field: &'static str,
) -> Result<Vec<String>, SchemaError> {
    let items = match def.get(field) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(shape(subject, field, "a sequence of strings")),
    };
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(|| shape(subject, field, "a sequence of strings")))
        .collect()
}

fn shape(subject: &str, field: &'static str, expected: &'static str) -> SchemaError {
    SchemaError::Shape { subject: subject.to_string(), field, expected }
}
