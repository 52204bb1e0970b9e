//! Query-string construction for GET parameters.
//!
//! Parameters arrive already case-encoded as a JSON object. `null` marks an
//! absent parameter and is dropped rather than written as an empty value.
//! Arrays are flattened to repeated keys (`files=a&files=b`), which is how the
//! processing service parses list-valued query parameters. Nested objects have
//! no query-string form and are rejected.
//!
//! Numbers are written the way a browser's `URLSearchParams` writes them, so a
//! whole-valued float such as `10.0` goes out as `10`.

use serde_json::{Number, Value};
use url::form_urlencoded;

use crate::error::ApiError;

/// Append `params` to `path` as a query string.
///
/// Returns `path` unchanged when `params` is `null` or leaves no pairs after
/// absent values are dropped.
pub fn append_query(path: &str, params: &Value) -> Result<String, ApiError> {
    let pairs = flatten(params)?;
    if pairs.is_empty() {
        return Ok(path.to_string());
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in &pairs {
        serializer.append_pair(key, value);
    }
    let separator = if path.contains('?') { '&' } else { '?' };
    Ok(format!("{path}{separator}{}", serializer.finish()))
}

/// Turn a params object into ordered `(key, value)` pairs.
fn flatten(params: &Value) -> Result<Vec<(String, String)>, ApiError> {
    let map = match params {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => map,
        other => {
            return Err(ApiError::InvalidParams(format!(
                "expected an object of parameters, got {}",
                kind(other)
            )))
        }
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = scalar_text(key, item)? {
                        pairs.push((key.clone(), text));
                    }
                }
            }
            other => {
                if let Some(text) = scalar_text(key, other)? {
                    pairs.push((key.clone(), text));
                }
            }
        }
    }
    Ok(pairs)
}

fn scalar_text(key: &str, value: &Value) -> Result<Option<String>, ApiError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(number_text(n))),
        other => Err(ApiError::InvalidParams(format!(
            "parameter `{key}` holds {}, which has no query-string form",
            kind(other)
        ))),
    }
}

/// Largest magnitude below which every integral `f64` is exact.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
