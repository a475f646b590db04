//! HTTP client and TLS configuration

pub mod http;
pub mod ssl;

pub use http::{build_client, execute, TransportOptions, MAX_REDIRECTS};
pub use ssl::{PemSource, TlsProfile};
