//! Response normalization: mixed-case JSON payloads into typed results.
//!
//! The backend shapes payloads inconsistently across endpoints: field names
//! appear in snake_case, PascalCase, or camelCase, success flags and error
//! collections under several different key names, errors nested to varying
//! depth. [`normalize`] resolves all of that against a declarative
//! [`Schema`] and produces a uniform [`Outcome`]. It never panics on
//! malformed input; every conversion failure becomes a deserialization
//! failure inside the result.

pub mod schema;

pub use schema::{optional, required, FieldKind, FieldSpec, Schema};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::outcome::{ErrorDetail, FailureKind, Outcome};

/// Keys under which the backend reports the overall success flag.
const SUCCESS_KEYS: &[&str] = &["success", "resultado", "exito", "ok"];

/// Keys under which the backend nests its error array.
const ERROR_CONTAINER_KEYS: &[&str] = &[
    "errors",
    "errores",
    "errorList",
    "error_list",
    "listaErrores",
    "lista_errores",
];

/// Keys carrying the message inside an error entry.
const MESSAGE_KEYS: &[&str] = &["message", "mensaje", "descripcion", "detail", "error"];

/// Bound on recursive error-array searches; backend nesting is shallow in
/// practice, this only guards against pathological payloads.
const MAX_ERROR_DEPTH: usize = 8;

/// Normalize a raw response body against an endpoint schema.
pub fn normalize<T: DeserializeOwned>(raw: &[u8], schema: &Schema) -> Outcome<T> {
    let value: Value = match serde_json::from_slice(raw) {
        Ok(value) => value,
        Err(err) => {
            return Outcome::failure(
                FailureKind::Deserialization,
                vec![ErrorDetail::new(format!(
                    "response body is not valid JSON: {err}"
                ))],
            );
        }
    };
    let Some(map) = value.as_object() else {
        return Outcome::failure(
            FailureKind::Deserialization,
            vec![ErrorDetail::new("response body is not a JSON object")],
        );
    };

    if success_flag(map) == Some(false) {
        return Outcome::failure(FailureKind::Validation, extract_error_details(&value));
    }

    match build_canonical(map, schema) {
        Ok(canonical) => match serde_json::from_value::<T>(Value::Object(canonical)) {
            Ok(payload) => Outcome::success(payload),
            Err(err) => Outcome::failure(
                FailureKind::Deserialization,
                vec![ErrorDetail::new(format!(
                    "response did not match the expected shape: {err}"
                ))],
            ),
        },
        Err(message) => Outcome::failure(
            FailureKind::Deserialization,
            vec![ErrorDetail::new(message)],
        ),
    }
}

/// Flatten every backend error message found in `value` into a uniform list,
/// searching the recognized container keys at any nesting depth.
pub fn extract_error_details(value: &Value) -> Vec<ErrorDetail> {
    let mut out = Vec::new();
    collect_errors(value, &mut out, 0);
    out
}

fn collect_errors(value: &Value, out: &mut Vec<ErrorDetail>, depth: usize) {
    if depth > MAX_ERROR_DEPTH {
        return;
    }
    let Value::Object(map) = value else {
        return;
    };
    if let Some(Value::Array(entries)) = resolve_any(map, ERROR_CONTAINER_KEYS) {
        for entry in entries {
            if let Some(message) = entry_message(entry, 0) {
                out.push(ErrorDetail::new(message));
            }
        }
    }
    if out.is_empty() {
        for nested in map.values() {
            collect_errors(nested, out, depth + 1);
            if !out.is_empty() {
                break;
            }
        }
    }
}

fn entry_message(entry: &Value, depth: usize) -> Option<String> {
    if depth > MAX_ERROR_DEPTH {
        return None;
    }
    match entry {
        Value::String(message) => Some(message.clone()),
        Value::Object(map) => {
            if let Some(message) = resolve_any(map, MESSAGE_KEYS).and_then(Value::as_str) {
                return Some(message.to_string());
            }
            map.values().find_map(|v| entry_message(v, depth + 1))
        }
        _ => None,
    }
}

fn success_flag(map: &Map<String, Value>) -> Option<bool> {
    resolve_any(map, SUCCESS_KEYS).and_then(value_as_bool)
}

/// Resolve a source name in `map`: case-sensitive exact match first, then a
/// single case-normalized fallback that lower-cases the first character of
/// both sides. That covers the common PascalCase/camelCase divergence
/// (`Token` vs `token`) without a full fuzzy match.
fn resolve<'a>(map: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    if let Some(value) = map.get(name) {
        return Some(value);
    }
    let wanted = decapitalize(name);
    map.iter()
        .find(|(key, _)| decapitalize(key) == wanted)
        .map(|(_, value)| value)
}

fn resolve_any<'a>(map: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| resolve(map, name))
}

fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn build_canonical(map: &Map<String, Value>, schema: &Schema) -> Result<Map<String, Value>, String> {
    let mut out = Map::new();
    for field in schema.fields {
        let found = field
            .sources
            .iter()
            .find_map(|source| resolve(map, source))
            .filter(|value| !value.is_null());
        match found {
            Some(value) => {
                let converted = convert(value, &field.kind)
                    .map_err(|err| format!("field `{}`: {err}", field.target))?;
                out.insert(field.target.to_string(), converted);
            }
            None if field.required => {
                return Err(format!("missing required field `{}`", field.target));
            }
            // missing optional fields stay absent; the payload type's
            // defaults apply during deserialization
            None => {}
        }
    }
    Ok(out)
}

fn convert(value: &Value, kind: &FieldKind) -> Result<Value, String> {
    match kind {
        FieldKind::String => match value {
            Value::String(s) => Ok(Value::String(s.clone())),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            other => Err(format!("expected a string, got {other}")),
        },
        FieldKind::Integer => value_as_i64(value)
            .map(|n| Value::Number(n.into()))
            .ok_or_else(|| format!("expected an integer, got {value}")),
        FieldKind::Float => value_as_f64(value)
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("expected a number, got {value}")),
        FieldKind::Boolean => value_as_bool(value)
            .map(Value::Bool)
            .ok_or_else(|| format!("expected a boolean, got {value}")),
        FieldKind::DateTime => value_as_datetime(value)
            .map(|dt| Value::String(dt.to_rfc3339()))
            .ok_or_else(|| format!("expected a date/time, got {value}")),
        FieldKind::Object(schema) => match value {
            Value::Object(map) => build_canonical(map, schema).map(Value::Object),
            other => Err(format!("expected an object, got {other}")),
        },
        FieldKind::List(item_kind) => match value {
            Value::Array(items) => items
                .iter()
                .map(|item| convert(item, item_kind))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Err(format!("expected an array, got {other}")),
        },
    }
}

fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        _ => None,
    }
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accepts the date formats observed across the backend's endpoints:
/// RFC 3339, bare ISO date-times, space-separated date-times, and
/// day-first dates, plus integer epoch seconds.
fn value_as_datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_datetime(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        _ => None,
    }
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%d/%m/%Y %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc());
        }
    }
    for format in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}
