//! Output sinks
//!
//! Concurrent executions hand complete, pre-rendered chunks to a sink, which
//! writes each chunk with a single locked `write_all` so blocks from
//! different iterations never interleave.

use std::io::{self, Write};
use std::sync::Mutex;

/// Destination for rendered output
pub trait OutputSink: Send + Sync {
    fn write_stdout(&self, chunk: &[u8]) -> io::Result<()>;
    fn write_stderr(&self, chunk: &[u8]) -> io::Result<()>;
}

/// The process's standard streams
#[derive(Debug, Default, Clone, Copy)]
pub struct StdioSink;

impl OutputSink for StdioSink {
    fn write_stdout(&self, chunk: &[u8]) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(chunk)?;
        out.flush()
    }

    fn write_stderr(&self, chunk: &[u8]) -> io::Result<()> {
        let mut err = io::stderr().lock();
        err.write_all(chunk)?;
        err.flush()
    }
}

/// Collects output in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    stdout: Mutex<Vec<Vec<u8>>>,
    stderr: Mutex<Vec<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chunks written to stdout, in write order
    pub fn stdout_chunks(&self) -> Vec<String> {
        self.stdout
            .lock()
            .map(|c| c.iter().map(|chunk| String::from_utf8_lossy(chunk).into_owned()).collect())
            .unwrap_or_default()
    }

    /// Everything written to stdout, byte for byte
    pub fn stdout_bytes(&self) -> Vec<u8> {
        self.stdout.lock().map(|c| c.concat()).unwrap_or_default()
    }

    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.stdout_bytes()).into_owned()
    }

    pub fn stderr(&self) -> String {
        let bytes = self.stderr.lock().map(|c| c.concat()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl OutputSink for MemorySink {
    fn write_stdout(&self, chunk: &[u8]) -> io::Result<()> {
        self.stdout
            .lock()
            .map_err(|_| io::Error::other("output buffer poisoned"))?
            .push(chunk.to_vec());
        Ok(())
    }

    fn write_stderr(&self, chunk: &[u8]) -> io::Result<()> {
        self.stderr
            .lock()
            .map_err(|_| io::Error::other("output buffer poisoned"))?
            .push(chunk.to_vec());
        Ok(())
    }
}
