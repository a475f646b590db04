//! volley: send an HTTP request once or many times and render the responses
//!
//! # Module Organization
//!
//! - [`cli`] - Arguments and the resolved [`cli::Invocation`]
//! - [`config`] - YAML configuration and profiles
//! - [`auth`] / [`client`] - Basic credentials, TLS material, the HTTP client
//! - [`request`] - Headers, body sources, templates, forms
//! - [`engine`] - Repeat and concurrency control
//! - [`output`] - Response rendering
//! - [`core`] - Main execution logic

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod core;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod models;
pub mod output;
pub mod request;
pub mod status;
