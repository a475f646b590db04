//! Error types for volley

use thiserror::Error;

/// Shape shown alongside configuration errors
pub const CONFIG_EXAMPLE: &str = "\
base_url: https://api.example.com
headers:
  X-Api-Key: secret
output: body
timeout: 10s
repeat: 1
concurrency: 1";

/// Main error type for volley
#[derive(Error, Debug)]
pub enum VolleyError {
    #[error("Config error: {0}\n\nA valid configuration looks like:\n{CONFIG_EXAMPLE}")]
    Config(String),

    #[error("Certificate and key must both be file paths or both be inline PEM")]
    MixedCredentialFormat,

    #[error("Invalid certificate: {0}")]
    InvalidCertificate(String),

    #[error("Invalid client certificate: {0}")]
    InvalidClientCertificate(String),

    #[error("Credential file not found: {path}: {message}")]
    CredentialNotFound { path: String, message: String },

    #[error("Template error in {source_name}: {message}")]
    Template { source_name: String, message: String },

    #[error("Body parse error: {0}")]
    BodyParse(String),

    #[error("Invalid header '{0}': expected 'Name: Value'")]
    HeaderParse(String),

    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("No URL given and no base_url configured")]
    MissingUrl,

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
}

impl VolleyError {
    /// Whether the error was raised while resolving the request, before any
    /// network traffic.
    pub fn is_resolution_error(&self) -> bool {
        !matches!(self, VolleyError::Network(_) | VolleyError::Request(_))
    }

    /// Build a network error from a failed round trip
    pub fn from_transport(err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else if err.is_connect() {
            format!("connection failed: {}", err)
        } else if err.is_redirect() {
            format!("redirect failed: {}", err)
        } else {
            err.to_string()
        };
        VolleyError::Network(message)
    }
}

pub type Result<T> = std::result::Result<T, VolleyError>;
