//! Request building
//!
//! Combines URL, method, headers, body and Basic credentials into one
//! immutable [`RequestSpec`]. All resolution happens here, before the first
//! request is sent; executions only clone out of the spec.

use std::io::Read;

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use tracing::debug;
use url::Url;

use crate::auth::AuthProfile;
use crate::cli::Invocation;
use crate::errors::{Result, VolleyError};
use crate::request::body::{self, BodyPayload};
use crate::request::form;
use crate::request::headers::{self, HeaderSet};

/// Fully resolved description of the request to send
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: Url,
    /// Resolved headers with display casing
    pub headers: HeaderSet,
    /// Wire headers; Content-Type is left out for multipart so the boundary
    /// can be filled in per request
    wire_headers: HeaderMap,
    /// Never set for GET or HEAD
    pub body: Option<BodyPayload>,
}

impl RequestSpec {
    /// Resolve a request from the invocation.
    ///
    /// `stdin` is read only when no other body source applies.
    pub fn build(
        invocation: &Invocation,
        auth: &AuthProfile,
        stdin: Option<&mut dyn Read>,
    ) -> Result<Self> {
        let url = resolve_url(invocation.target.as_deref(), invocation.base_url.as_deref())?;
        let method = parse_method(&invocation.method)?;

        let resolved = if carries_body(&method) {
            body::resolve(&invocation.body, &invocation.variables, stdin)?
        } else {
            debug!(method = %method, "method carries no body, skipping body sources");
            None
        };

        let hint = resolved.as_ref().and_then(|b| b.content_type_hint);
        let mut headers = headers::resolve(
            &invocation.cli_headers,
            &invocation.config_headers,
            resolved.is_some(),
            hint,
        )?;

        let body = match resolved {
            None => None,
            Some(resolved) if resolved.is_form() => {
                if let Some(content_type) = resolved.content_type_hint {
                    headers.set("Content-Type", content_type);
                }
                Some(resolved.payload)
            }
            Some(resolved) => match resolved.payload {
                BodyPayload::Bytes(data) if is_json(headers.get("Content-Type")) => {
                    debug!(source = %resolved.source_name, "coercing body to JSON");
                    Some(BodyPayload::Bytes(body::coerce_json(&data)?))
                }
                payload => Some(payload),
            },
        };

        if let Some(basic) = &auth.basic {
            if basic.apply(&mut headers) {
                debug!(username = %basic.username(), "applied basic auth");
            }
        }

        let mut wire_headers = headers.to_header_map()?;
        if matches!(body, Some(BodyPayload::Multipart(_))) {
            wire_headers.remove(CONTENT_TYPE);
        }

        debug!(method = %method, url = %url, headers = headers.len(), body = body.is_some(), "built request");

        Ok(Self { method, url, headers, wire_headers, body })
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("Content-Type")
    }

    /// A fresh reqwest request for one execution
    pub fn to_request(&self, client: &Client) -> Result<RequestBuilder> {
        let request = client
            .request(self.method.clone(), self.url.clone())
            .headers(self.wire_headers.clone());

        Ok(match &self.body {
            Some(BodyPayload::Bytes(data)) => request.body(data.clone()),
            Some(BodyPayload::Multipart(parts)) => request.multipart(form::build_form(parts)?),
            None => request,
        })
    }
}

/// Check if a string starts with a URL scheme (e.g. `https://`)
fn has_url_scheme(s: &str) -> bool {
    match s.find("://") {
        Some(pos) => {
            let scheme = &s[..pos];
            scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
                && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Resolve the target against the configured base URL.
///
/// An absolute target is used verbatim; anything else is appended to the
/// base URL.
pub fn resolve_url(target: Option<&str>, base: Option<&str>) -> Result<Url> {
    let target = target.map(str::trim).unwrap_or("");
    let base = base.map(str::trim).unwrap_or("");

    let joined = if has_url_scheme(target) {
        target.to_string()
    } else if base.ends_with('/') && target.starts_with('/') {
        format!("{}{}", base, &target[1..])
    } else {
        format!("{}{}", base, target)
    };

    if joined.is_empty() {
        return Err(VolleyError::MissingUrl);
    }

    Url::parse(&joined).map_err(|e| VolleyError::InvalidUrl { url: joined.clone(), message: e.to_string() })
}

fn parse_method(raw: &str) -> Result<Method> {
    let upper = raw.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return Err(VolleyError::Argument("HTTP method must not be empty".to_string()));
    }
    Method::from_bytes(upper.as_bytes())
        .map_err(|_| VolleyError::Argument(format!("invalid HTTP method: {}", raw)))
}

fn carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
}
