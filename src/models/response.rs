//! Response record produced by one execution

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Version};

/// One completed round trip. Created and consumed within a single execution.
#[derive(Debug, Clone)]
pub struct ResponseRecord {
    pub status: StatusCode,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Wall-clock time from send to the last body byte
    pub duration: Duration,
    /// 0 for a single request, 1-based when repeating
    pub iteration: usize,
}

impl ResponseRecord {
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Whether the response declares a JSON body (`application/json`,
    /// `application/problem+json`, ...)
    pub fn is_json(&self) -> bool {
        self.content_type()
            .map(|ct| {
                let mime = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
                mime.ends_with("/json") || mime.ends_with("+json")
            })
            .unwrap_or(false)
    }
}
