//! Response rendering for the three display modes
//!
//! Each response is rendered into one byte buffer so it can be written to the
//! output stream in a single call. Bodies that are not pretty-printed JSON
//! pass through byte for byte.

use crate::models::{DisplayMode, ResponseRecord};
use crate::output::formatters::{format_headers, format_json};
use crate::output::terminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseFormatter {
    pub mode: DisplayMode,
    pub colors: bool,
}

impl ResponseFormatter {
    pub fn new(mode: DisplayMode, colors: bool) -> Self {
        Self { mode, colors }
    }

    /// Render one response. Iteration 0 means a single request: no labels.
    pub fn format(&self, record: &ResponseRecord) -> Vec<u8> {
        match self.mode {
            DisplayMode::Status => {
                prefix_lines(format!("{}\n", record.status.as_u16()).as_bytes(), record.iteration)
            }
            DisplayMode::Body => prefix_lines(&self.body(record), record.iteration),
            DisplayMode::Verbose => self.verbose(record),
        }
    }

    /// Per-iteration failure line for stderr
    pub fn format_failure(&self, iteration: usize, message: &str) -> String {
        let text = if self.colors { terminal::error(message) } else { message.to_string() };
        if iteration == 0 {
            format!("error: {}\n", text)
        } else {
            format!("{}: error: {}\n", iteration, text)
        }
    }

    fn body(&self, record: &ResponseRecord) -> Vec<u8> {
        let pretty = if record.is_json() {
            std::str::from_utf8(&record.body).ok().and_then(format_json)
        } else {
            None
        };
        let mut body = match pretty {
            Some(text) => text.into_bytes(),
            None => record.body.to_vec(),
        };
        if !body.is_empty() && !body.ends_with(b"\n") {
            body.push(b'\n');
        }
        body
    }

    fn verbose(&self, record: &ResponseRecord) -> Vec<u8> {
        let mut out = String::new();

        if record.iteration > 0 {
            let heading = format!("Iteration #{}", record.iteration);
            if self.colors {
                out.push_str(&terminal::label(&heading));
            } else {
                out.push_str(&heading);
            }
            out.push('\n');
        }

        let code = record.status.as_u16();
        let status = match record.status.canonical_reason() {
            Some(reason) => format!("{} {}", code, reason),
            None => code.to_string(),
        };
        let timing = format!("({:.2?})", record.duration);
        if self.colors {
            out.push_str(&format!(
                "{} {} {}\n",
                terminal::muted(&format!("{:?}", record.version)),
                terminal::bold(&status, terminal::status_color(code)),
                terminal::muted(&timing)
            ));
        } else {
            out.push_str(&format!("{:?} {} {}\n", record.version, status, timing));
        }

        out.push_str(&format_headers(&record.headers, self.colors));
        out.push('\n');

        let mut bytes = out.into_bytes();
        bytes.extend_from_slice(&self.body(record));
        if record.iteration > 0 {
            bytes.push(b'\n');
        }
        bytes
    }
}

/// Prefix every line with `<iteration>: ` when repeating.
///
/// Lines split on `\n` only, so a `\r` before it stays in place.
fn prefix_lines(text: &[u8], iteration: usize) -> Vec<u8> {
    if iteration == 0 {
        return text.to_vec();
    }
    let prefix = format!("{}: ", iteration);
    if text.is_empty() {
        return format!("{}\n", prefix).into_bytes();
    }

    let body = text.strip_suffix(b"\n").unwrap_or(text);
    let mut out = Vec::with_capacity(text.len() + prefix.len() * 4);
    for line in body.split(|b| *b == b'\n') {
        out.extend_from_slice(prefix.as_bytes());
        out.extend_from_slice(line);
        out.push(b'\n');
    }
    out
}
