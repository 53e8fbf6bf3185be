//! Key-order independent rendering of structured request bodies

use serde_json::Value;

/// Parse `body` as JSON and render its canonical form.
///
/// Returns `None` when the body is not valid JSON; such bodies have no
/// canonical form and are fingerprinted from their raw bytes.
#[must_use]
pub fn canonical_body(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    Some(canonicalize(&value))
}

/// Render a structured value with object keys sorted at every level.
///
/// A top-level object renders as its bare entries (`"a":1,"b":2`), so an
/// empty object renders as the empty string. Nested objects are wrapped in
/// braces. Arrays keep their element order; only object keys are sorted.
#[must_use]
pub fn canonicalize(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Object(map) => write_entries(map, &mut out),
        other => write_value(other, &mut out),
    }
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            out.push('{');
            write_entries(map, out);
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        // Strings are JSON-escaped so separators inside values stay unambiguous
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn write_entries(map: &serde_json::Map<String, Value>, out: &mut String) {
    // Map iteration order depends on serde_json's `preserve_order` feature
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    for (i, key) in keys.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&Value::String(key.clone()).to_string());
        out.push(':');
        write_value(&map[key], out);
    }
}
