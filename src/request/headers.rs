//! Header resolution
//!
//! Headers are layered: built-in defaults, then configuration headers, then
//! `-H` values from the command line. Lookup is case-insensitive (keys are
//! stored upper-cased); each entry remembers the Title-Case spelling that is
//! put on the wire and shown in verbose output.

use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::errors::{Result, VolleyError};

pub const USER_AGENT_STRING: &str = concat!("volley/", env!("CARGO_PKG_VERSION"));

/// Accept value sent by default: JSON preferred over anything else
pub const DEFAULT_ACCEPT: &str = "application/json, */*;q=0.5";

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A single resolved header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
    /// Canonical wire spelling, e.g. `Content-Type`
    pub name: String,
    pub value: String,
}

/// Case-insensitive, last-write-wins header mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: IndexMap<String, HeaderEntry>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalized lookup key for a header name
    pub fn key(name: &str) -> String {
        name.trim().to_ascii_uppercase()
    }

    /// Insert or overwrite a header
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let name = name.trim();
        self.entries.insert(
            Self::key(name),
            HeaderEntry { name: canonical_name(name), value: value.into() },
        );
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&Self::key(name)).map(|e| e.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&Self::key(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &HeaderEntry> {
        self.entries.values()
    }

    /// Build the wire representation; invalid names or values are rejected
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for entry in self.entries.values() {
            let name = HeaderName::from_bytes(entry.name.as_bytes()).map_err(|_| {
                VolleyError::HeaderParse(format!("{}: {}", entry.name, entry.value))
            })?;
            let value = HeaderValue::from_str(&entry.value).map_err(|_| {
                VolleyError::HeaderParse(format!("{}: {}", entry.name, entry.value))
            })?;
            map.insert(name, value);
        }
        Ok(map)
    }
}

/// Title-Case a header name: `x-api-key` -> `X-Api-Key`
pub fn canonical_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    let mut s = first.to_ascii_uppercase().to_string();
                    s.push_str(&chars.as_str().to_ascii_lowercase());
                    s
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Parse a `Name: Value` command-line header
pub fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| VolleyError::HeaderParse(raw.to_string()))?;
    let name = name.trim();
    if name.is_empty() || name.chars().any(|c| c.is_whitespace()) {
        return Err(VolleyError::HeaderParse(raw.to_string()));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Merge default, configuration and command-line headers.
///
/// `content_type_hint` is the type derived by the body pipeline (forms);
/// without a hint a present body is typed as JSON.
pub fn resolve(
    cli_headers: &[String],
    config_headers: &IndexMap<String, String>,
    has_body: bool,
    content_type_hint: Option<&str>,
) -> Result<HeaderSet> {
    let mut headers = HeaderSet::new();
    headers.set("User-Agent", USER_AGENT_STRING);
    headers.set("Accept", DEFAULT_ACCEPT);
    if has_body {
        headers.set("Content-Type", content_type_hint.unwrap_or(JSON_CONTENT_TYPE));
    }

    for (name, value) in config_headers {
        headers.set(name, value.clone());
    }

    for raw in cli_headers {
        let (name, value) = parse_header(raw)?;
        headers.set(&name, value);
    }

    Ok(headers)
}
