//! Form field parsing and encoding
//!
//! Fields are `key=value`; a value starting with `@` uploads the file at the
//! remaining path. Any upload switches the payload to multipart/form-data.

use std::path::PathBuf;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::errors::{Result, VolleyError};
use crate::models::FormEncoding;

/// Prefix marking a file reference
pub const FILE_INDICATOR: char = '@';

pub const URLENCODED_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";

/// Value of a parsed form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(PathBuf),
}

/// A parsed `key=value` form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

/// A multipart part with its content already loaded
#[derive(Debug, Clone)]
pub enum MultipartField {
    Text { name: String, value: String },
    File { name: String, filename: String, mime: String, data: Bytes },
}

/// Encoded form payload
#[derive(Debug, Clone)]
pub enum EncodedForm {
    UrlEncoded(Bytes),
    Multipart(Vec<MultipartField>),
}

impl EncodedForm {
    pub fn content_type(&self) -> &'static str {
        match self {
            EncodedForm::UrlEncoded(_) => URLENCODED_CONTENT_TYPE,
            EncodedForm::Multipart(_) => MULTIPART_CONTENT_TYPE,
        }
    }
}

/// Parse `key=value` entries; each entry may hold several lines
pub fn parse_fields(raw: &[String]) -> Result<Vec<FormField>> {
    raw.iter()
        .flat_map(|entry| entry.lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let (name, value) = line.split_once('=').ok_or_else(|| {
                VolleyError::Argument(format!("form field '{}' must be key=value", line))
            })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(VolleyError::Argument(format!("form field '{}' has no key", line)));
            }
            let value = match value.strip_prefix(FILE_INDICATOR) {
                Some(path) => FormValue::File(PathBuf::from(path)),
                None => FormValue::Text(value.to_string()),
            };
            Ok(FormField { name: name.to_string(), value })
        })
        .collect()
}

pub fn has_uploads(fields: &[FormField]) -> bool {
    fields.iter().any(|f| matches!(f.value, FormValue::File(_)))
}

/// Encode fields as `application/x-www-form-urlencoded`
pub fn encode_urlencoded(fields: &[FormField]) -> Result<Bytes> {
    let mut pairs: Vec<(&str, &str)> = Vec::with_capacity(fields.len());
    for field in fields {
        match &field.value {
            FormValue::Text(value) => pairs.push((field.name.as_str(), value.as_str())),
            FormValue::File(path) => {
                return Err(VolleyError::UnsupportedEncoding(format!(
                    "field '{}' uploads '{}'; file uploads need multipart/form-data",
                    field.name,
                    path.display()
                )))
            }
        }
    }
    let encoded = serde_urlencoded::to_string(&pairs)
        .map_err(|e| VolleyError::UnsupportedEncoding(e.to_string()))?;
    Ok(Bytes::from(encoded))
}

/// Load every part, reading upload files once
pub fn load_multipart(fields: &[FormField]) -> Result<Vec<MultipartField>> {
    fields
        .iter()
        .map(|field| match &field.value {
            FormValue::Text(value) => Ok(MultipartField::Text {
                name: field.name.clone(),
                value: value.clone(),
            }),
            FormValue::File(path) => {
                let data = std::fs::read(path).map_err(|e| {
                    VolleyError::Io(std::io::Error::new(
                        e.kind(),
                        format!("cannot read upload '{}': {}", path.display(), e),
                    ))
                })?;
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "file".to_string());
                let mime = mime_guess::from_path(path).first_or_octet_stream().to_string();
                debug!(field = %field.name, file = %path.display(), bytes = data.len(), "loaded upload");
                Ok(MultipartField::File {
                    name: field.name.clone(),
                    filename,
                    mime,
                    data: Bytes::from(data),
                })
            }
        })
        .collect()
}

/// Encode fields, picking multipart when files are present under `Auto`
pub fn encode(fields: &[FormField], encoding: FormEncoding) -> Result<EncodedForm> {
    let multipart = match encoding {
        FormEncoding::Auto => has_uploads(fields),
        FormEncoding::Urlencoded => false,
        FormEncoding::Multipart => true,
    };
    if multipart {
        Ok(EncodedForm::Multipart(load_multipart(fields)?))
    } else {
        Ok(EncodedForm::UrlEncoded(encode_urlencoded(fields)?))
    }
}

/// Assemble a fresh multipart form; called once per request since a form
/// is consumed when sent.
pub fn build_form(parts: &[MultipartField]) -> Result<Form> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            MultipartField::Text { name, value } => form.text(name.clone(), value.clone()),
            MultipartField::File { name, filename, mime, data } => {
                let body = reqwest::Body::from(data.clone());
                let part = Part::stream_with_length(body, data.len() as u64)
                    .file_name(filename.clone())
                    .mime_str(mime)?;
                form.part(name.clone(), part)
            }
        };
    }
    Ok(form)
}
