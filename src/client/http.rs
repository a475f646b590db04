//! HTTP client construction and request execution
//!
//! One client is built per run and shared by every execution; reqwest
//! clients are cheap to clone and safe to use concurrently.

use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::debug;

use crate::client::ssl::TlsProfile;
use crate::errors::{Result, VolleyError};
use crate::models::ResponseRecord;
use crate::request::headers::USER_AGENT_STRING;
use crate::request::RequestSpec;

/// Redirect hops followed before giving up
pub const MAX_REDIRECTS: usize = 10;

/// Transport settings shared by all executions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    pub timeout: Duration,
    pub follow_redirects: bool,
}

/// Build the shared client
pub fn build_client(options: TransportOptions, tls: &TlsProfile) -> Result<Client> {
    let mut builder = Client::builder()
        .user_agent(USER_AGENT_STRING)
        .timeout(options.timeout)
        .http1_title_case_headers()
        .referer(false);

    builder = if options.follow_redirects {
        builder.redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
    } else {
        builder.redirect(reqwest::redirect::Policy::none())
    };

    builder = tls.apply_to_builder(builder)?;

    debug!(
        timeout = ?options.timeout,
        follow_redirects = options.follow_redirects,
        verify_tls = tls.verify,
        "built HTTP client"
    );

    builder
        .build()
        .map_err(|e| VolleyError::Argument(format!("failed to build HTTP client: {}", e)))
}

/// Send one request and read the whole response
pub async fn execute(client: &Client, spec: &RequestSpec, iteration: usize) -> Result<ResponseRecord> {
    let request = spec.to_request(client)?;

    let started = Instant::now();
    let response = request.send().await.map_err(|e| VolleyError::from_transport(&e))?;

    let status = response.status();
    let version = response.version();
    let headers = response.headers().clone();
    let body = response.bytes().await.map_err(|e| VolleyError::from_transport(&e))?;
    let duration = started.elapsed();

    debug!(
        iteration,
        status = status.as_u16(),
        bytes = body.len(),
        elapsed_ms = duration.as_secs_f64() * 1000.0,
        "response received"
    );

    Ok(ResponseRecord { status, version, headers, body, duration, iteration })
}
