//! Response header formatting

use reqwest::header::HeaderMap;

use crate::output::terminal;
use crate::request::headers::canonical_name;

/// Render headers as `Name: value` lines, sorted by name.
///
/// Names are shown Title-Case; repeated headers keep their received order.
pub fn format_headers(headers: &HeaderMap, colors: bool) -> String {
    let mut lines: Vec<(String, String)> = headers
        .iter()
        .map(|(name, value)| {
            (canonical_name(name.as_str()), String::from_utf8_lossy(value.as_bytes()).into_owned())
        })
        .collect();
    lines.sort_by(|a, b| a.0.to_ascii_uppercase().cmp(&b.0.to_ascii_uppercase()));

    let mut out = String::new();
    for (name, value) in lines {
        if colors {
            out.push_str(&terminal::key(&name));
        } else {
            out.push_str(&name);
        }
        out.push_str(": ");
        out.push_str(&value);
        out.push('\n');
    }
    out
}
