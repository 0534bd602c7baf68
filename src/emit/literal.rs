//! Quoting helpers for grammar literal tokens.
use serde_json::Value;

/// Wrap `text` as a grammar literal: `"..."` with backslash, quote and
/// control-character escapes.
pub fn literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// JSON-encode `value` as a string, then quote the JSON text as a literal.
/// `Admin` → `"\"Admin\""`.
pub fn json_string(value: &str) -> String {
    literal(&json_text(value))
}

/// Literal for an object key plus its colon: `"\"message\":"`.
pub fn object_key(name: &str) -> String {
    literal(&format!("{}:", json_text(name)))
}

/// Literal for the function-name value and the separator after it: `"\"send_message\","`.
pub fn function_name(name: &str) -> String {
    literal(&format!("{},", json_text(name)))
}

fn json_text(value: &str) -> String {
    Value::String(value.to_owned()).to_string()
}
