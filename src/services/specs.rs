//! Normalization of the `specs` / `other_parts` payloads sent when a computer
//! is registered or edited.
//!
//! Two shapes are in circulation. The current frontend sends
//!
//! ```json
//! { "monitor": { "name": "Dell P2419H", "serial": "CN0123" }, ... }
//! ```
//!
//! while older clients send the whole object JSON-encoded as a string and use
//! plain serial strings as values (`{"monitor": "CN0123"}`). Both are folded
//! into [`PartSpec`] here so nothing downstream has to care.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AppError, Result};

/// One standard part slot as requested by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartSpec {
    pub category: String,
    pub name: String,
    pub serial: Option<String>,
}

/// One custom ("other") part as requested by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomPartSpec {
    pub name: String,
    pub serial: Option<String>,
}

/// Normalize a `specs` value into standard part specs.
///
/// `null` and a missing value both mean "no standard parts".
pub fn normalize_specs(value: &Value) -> Result<Vec<PartSpec>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => specs_from_map(map),
        Value::String(raw) if raw.trim().is_empty() => Ok(Vec::new()),
        Value::String(raw) => match serde_json::from_str::<Value>(raw)? {
            Value::Object(map) => specs_from_map(&map),
            Value::Null => Ok(Vec::new()),
            _ => Err(AppError::Validation(
                "specs must be an object keyed by part category".to_string(),
            )),
        },
        _ => Err(AppError::Validation(
            "specs must be an object keyed by part category".to_string(),
        )),
    }
}

fn specs_from_map(map: &Map<String, Value>) -> Result<Vec<PartSpec>> {
    let mut specs = Vec::with_capacity(map.len());

    for (key, entry) in map {
        let category = key.trim();
        if category.is_empty() {
            return Err(AppError::Validation(
                "specs contains an empty category".to_string(),
            ));
        }
        specs.push(spec_entry(category, entry)?);
    }

    Ok(specs)
}

fn spec_entry(category: &str, entry: &Value) -> Result<PartSpec> {
    let (name, serial) = match entry {
        Value::Null => (None, None),
        Value::Object(fields) => (text_field(fields, "name"), serial_field(fields)),
        // Legacy clients sometimes double-encode individual entries
        Value::String(raw) if raw.trim_start().starts_with('{') => {
            match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(fields)) => (text_field(&fields, "name"), serial_field(&fields)),
                _ => (None, non_empty(raw)),
            }
        }
        Value::String(raw) => (None, non_empty(raw)),
        Value::Number(n) => (None, Some(n.to_string())),
        _ => {
            return Err(AppError::Validation(format!(
                "specs entry '{}' must be an object or a serial string",
                category
            )))
        }
    };

    Ok(PartSpec {
        category: category.to_string(),
        name: name.unwrap_or_else(|| category.to_string()),
        serial,
    })
}

/// Normalize an `other_parts` value into custom part specs.
///
/// Anything that is not a list (or a string holding one) is treated as an
/// empty list. Entries without a name are dropped, as are repeated names.
pub fn normalize_other_parts(value: &Value) -> Vec<CustomPartSpec> {
    let items = match value {
        Value::Array(items) => items.clone(),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    let mut parts: Vec<CustomPartSpec> = Vec::with_capacity(items.len());
    for item in &items {
        let Value::Object(fields) = item else {
            continue;
        };
        let Some(name) = text_field(fields, "name") else {
            continue;
        };
        if parts.iter().any(|p| p.name == name) {
            tracing::debug!("Dropping repeated custom part '{}'", name);
            continue;
        }
        parts.push(CustomPartSpec {
            name,
            serial: serial_field(fields),
        });
    }

    parts
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => non_empty(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn serial_field(fields: &Map<String, Value>) -> Option<String> {
    text_field(fields, "serial").or_else(|| text_field(fields, "serial_number"))
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
