//! Shared option and result types

pub mod response;
pub mod types;

pub use response::ResponseRecord;
pub use types::{DisplayMode, FormEncoding, Toggle};
