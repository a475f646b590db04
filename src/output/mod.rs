//! Output handling (formatting, colours, writing)

pub mod formatter;
pub mod formatters;
pub mod terminal;
pub mod writer;

pub use formatter::ResponseFormatter;
pub use writer::{MemorySink, OutputSink, StdioSink};
