//! HTTP Basic Authentication (RFC 7617)

use std::fmt;

use base64::Engine;

use crate::request::headers::HeaderSet;

/// HTTP Basic Authentication credentials
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    username: String,
    password: String,
}

impl BasicAuth {
    /// Credentials are active only when both parts are non-empty after
    /// trimming; the values themselves are sent as given.
    pub fn from_parts(username: Option<&str>, password: Option<&str>) -> Option<Self> {
        let username = username.filter(|u| !u.trim().is_empty())?;
        let password = password.filter(|p| !p.trim().is_empty())?;
        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// `Basic <base64(user:pass)>`
    pub fn header_value(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password);
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());
        format!("Basic {}", encoded)
    }

    /// Set the Authorization header unless one was given explicitly
    pub fn apply(&self, headers: &mut HeaderSet) -> bool {
        if headers.contains("Authorization") {
            return false;
        }
        headers.set("Authorization", self.header_value());
        true
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
