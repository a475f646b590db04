//! Output formatters

pub mod headers;
pub mod json;

pub use headers::format_headers;
pub use json::format_json;
