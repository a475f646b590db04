//! Exit status codes for the CLI
//!
//! - 0: every iteration completed its round trip (HTTP error codes included)
//! - 1: any resolution error, or a failed round trip
//! - 130: interrupted (Ctrl+C)

use std::process::{ExitCode, Termination};

/// Exit status codes following standard Unix conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    /// All network calls completed
    Success = 0,
    /// Resolution error or failed network call
    Error = 1,
    /// User interrupted (Ctrl+C) - standard SIGINT code
    Interrupted = 130,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}

impl Termination for ExitStatus {
    fn report(self) -> ExitCode {
        ExitCode::from(self as u8)
    }
}

impl ExitStatus {
    /// Exit status for a finished run given how many iterations failed
    pub fn from_failures(failed: usize) -> Self {
        if failed == 0 {
            ExitStatus::Success
        } else {
            ExitStatus::Error
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_failures() {
        assert_eq!(ExitStatus::from_failures(0), ExitStatus::Success);
        assert_eq!(ExitStatus::from_failures(3), ExitStatus::Error);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitStatus::Success as u8, 0);
        assert_eq!(ExitStatus::Error as u8, 1);
        assert_eq!(ExitStatus::Interrupted as u8, 130);
    }
}
