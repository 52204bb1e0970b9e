//! Key-case transcoding between the wire convention and the application one.
//!
//! # Design
//! The remote service speaks snake_case JSON; application-side types speak
//! camelCase. `encode` renames every object key to snake_case before a value
//! leaves the client, `decode` renames every key to camelCase after a value
//! arrives. Both walk the closed `serde_json::Value` tree, so recursion depth
//! is bounded by the input and cycles cannot occur.
//!
//! The two transforms are not exact inverses. A camelCase key that already
//! carries a delimiter (`"already_snake"`, `"config-name"`) comes back from
//! `decode(encode(..))` with the delimiter folded away.
//!
//! Values are never mutated in place: every call allocates a fresh tree and
//! leaves the caller's value untouched.

use serde_json::{Map, Value};

/// Target naming convention for object keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    /// `inputName` -> `input_name`
    Snake,
    /// `input_name` -> `inputName`
    Camel,
}

impl Case {
    /// Rename a single key into this convention.
    pub fn convert(self, key: &str) -> String {
        match self {
            Case::Snake => to_snake(key),
            Case::Camel => to_camel(key),
        }
    }
}

/// Rename every object key to snake_case, for values headed to the wire.
pub fn encode(value: &Value) -> Value {
    transcode(value, Case::Snake)
}

/// Rename every object key to camelCase, for values coming off the wire.
pub fn decode(value: &Value) -> Value {
    transcode(value, Case::Camel)
}

/// Rebuild `value` with every object key converted to `case`.
///
/// Scalars, including `null`, are cloned as-is. Arrays keep their order and
/// length. When two keys of one object collapse to the same name, the later
/// one wins.
pub fn transcode(value: &Value, case: Case) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(|item| transcode(item, case)).collect()),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, inner) in map {
                out.insert(case.convert(key), transcode(inner, case));
            }
            Value::Object(out)
        }
        scalar => scalar.clone(),
    }
}

/// `[-_][a-z]` becomes the uppercased letter; everything else is kept.
fn to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '_' || c == '-' {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_lowercase() {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// `[A-Z]` becomes `_` plus the lowercased letter.
fn to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
