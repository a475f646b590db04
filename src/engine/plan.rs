//! Execution plan: how many times to send, how many at once

use std::time::Duration;

use tokio::sync::Semaphore;

use crate::cli::Invocation;
use crate::client::TransportOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// Total executions, at least 1
    pub repeat: usize,
    /// Executions in flight at once, at least 1
    pub concurrency: usize,
    pub follow_redirects: bool,
    pub timeout: Duration,
}

impl ExecutionPlan {
    pub fn new(repeat: i64, concurrency: i64, follow_redirects: bool, timeout: Duration) -> Self {
        let repeat = clamp_count(repeat);
        // More slots than executions would never be used
        let concurrency = clamp_count(concurrency).min(repeat).min(Semaphore::MAX_PERMITS);
        Self {
            repeat,
            concurrency,
            follow_redirects,
            timeout,
        }
    }

    pub fn from_invocation(invocation: &Invocation) -> Self {
        Self::new(
            invocation.repeat,
            invocation.concurrency,
            invocation.follow_redirects,
            invocation.timeout,
        )
    }

    pub fn is_repeated(&self) -> bool {
        self.repeat > 1
    }

    /// Label for the execution at zero-based `index`: 0 for a single
    /// request, 1-based otherwise
    pub fn iteration_label(&self, index: usize) -> usize {
        if self.is_repeated() {
            index + 1
        } else {
            0
        }
    }

    pub fn transport(&self) -> TransportOptions {
        TransportOptions { timeout: self.timeout, follow_redirects: self.follow_redirects }
    }
}

/// Values below 1 behave as 1
fn clamp_count(value: i64) -> usize {
    if value < 1 {
        1
    } else {
        usize::try_from(value).unwrap_or(usize::MAX)
    }
}
