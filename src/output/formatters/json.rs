//! JSON pretty printing
//!
//! Keys keep the order the server sent them in; indentation is two spaces.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value as JsonValue;

const INDENT: &[u8] = b"  ";

/// Pretty-print a JSON document.
///
/// Newline-delimited JSON is formatted value by value. Returns `None` when
/// the first value is not JSON, so the caller can fall back to raw text.
pub fn format_json(text: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<JsonValue>(text) {
        return format_value(&value);
    }

    let mut formatted = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match serde_json::from_str::<JsonValue>(line) {
            Ok(value) => formatted.push(format_value(&value)?),
            // Keep a corrupt line once the stream has proven to be JSON
            Err(_) if !formatted.is_empty() => formatted.push(line.to_string()),
            Err(_) => return None,
        }
    }

    if formatted.is_empty() {
        None
    } else {
        Some(formatted.join("\n"))
    }
}

fn format_value(value: &JsonValue) -> Option<String> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer).ok()?;
    String::from_utf8(buf).ok()
}
