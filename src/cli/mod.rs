//! Command-line interface

pub mod args;
pub mod process;

pub use args::{Args, LogFormat};
pub use process::Invocation;
