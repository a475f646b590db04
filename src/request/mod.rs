//! Request resolution: headers, body sources, templates, forms, and the
//! final request descriptor

pub mod body;
pub mod builder;
pub mod form;
pub mod headers;
pub mod template;

pub use builder::{resolve_url, RequestSpec};
pub use headers::HeaderSet;
