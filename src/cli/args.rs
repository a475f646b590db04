//! CLI argument definitions using clap
//!
//! This module defines all command-line arguments for volley.

use clap::{ArgAction, Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;

use crate::models::{DisplayMode, FormEncoding};

/// A string that redacts its value in Debug output to prevent credential leakage
#[derive(Clone, Default)]
pub struct SecretString(pub String);

impl SecretString {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "SecretString(\"\")")
        } else {
            write!(f, "SecretString(\"[REDACTED]\")")
        }
    }
}

impl std::str::FromStr for SecretString {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SecretString(s.to_string()))
    }
}

/// volley - fire HTTP requests from the command line, once or many times over
#[derive(Parser, Debug, Clone)]
#[command(name = "volley", version, about, long_about = None, args_override_self = true)]
#[command(disable_version_flag = true)]  // -V is --var
pub struct Args {
    /// Print version
    #[arg(long = "version", action = ArgAction::Version)]
    pub version: Option<bool>,

    /// URL or path to request; paths are appended to the configured base_url
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    // =========================================================================
    // REQUEST
    // =========================================================================

    /// HTTP method (default: GET)
    #[arg(short = 'X', long = "method", value_name = "METHOD")]
    pub method: Option<String>,

    /// Request header as 'Name: Value' (repeatable)
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Request body: literal text, @path to read a file, or 'stdin'
    #[arg(short = 'd', long = "data", value_name = "DATA")]
    pub data: Option<String>,

    /// Body template file using {{.Vars.name}} placeholders
    #[arg(short = 't', long = "template", value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Template variable as name=value (repeatable)
    #[arg(short = 'V', long = "var", value_name = "NAME=VALUE")]
    pub vars: Vec<String>,

    /// Form field as key=value; key=@path uploads a file (repeatable)
    #[arg(short = 'F', long = "form", value_name = "KEY=VALUE")]
    pub form: Vec<String>,

    /// Form encoding
    #[arg(long = "form-encoding", value_name = "ENCODING", value_enum)]
    pub form_encoding: Option<FormEncoding>,

    /// Read the request body from a file (legacy, prefer -d @path)
    #[arg(long = "file", value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Don't read stdin (useful for scripting)
    #[arg(short = 'I', long = "ignore-stdin", action = ArgAction::SetTrue)]
    pub ignore_stdin: bool,

    // =========================================================================
    // OUTPUT
    // =========================================================================

    /// What to print for each response
    #[arg(short = 'o', long = "output", value_name = "MODE", value_enum)]
    pub output: Option<DisplayMode>,

    /// Shorthand for --output verbose
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Force disable colors in output
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    pub no_color: bool,

    // =========================================================================
    // NETWORK
    // =========================================================================

    /// Timeout per request in seconds
    #[arg(long = "timeout", value_name = "SECONDS")]
    pub timeout: Option<f64>,

    /// Follow redirects (the last of --follow-redirect/--no-redirect wins)
    #[arg(long = "follow-redirect", action = ArgAction::SetTrue, overrides_with = "no_redirect")]
    pub follow_redirect: bool,

    /// Don't follow redirects (the last of --follow-redirect/--no-redirect wins)
    #[arg(long = "no-redirect", action = ArgAction::SetTrue, overrides_with = "follow_redirect")]
    pub no_redirect: bool,

    /// Skip TLS certificate verification
    #[arg(short = 'k', long = "insecure", action = ArgAction::SetTrue)]
    pub insecure: bool,

    // =========================================================================
    // AUTHENTICATION
    // =========================================================================

    /// Client certificate: file path or inline PEM
    #[arg(long = "cert", value_name = "CERT", allow_hyphen_values = true)]
    pub cert: Option<String>,

    /// Client private key: file path or inline PEM
    #[arg(long = "key", value_name = "KEY", allow_hyphen_values = true)]
    pub key: Option<String>,

    /// CA bundle replacing the system trust store: file path or inline PEM
    #[arg(long = "ca", value_name = "CA", allow_hyphen_values = true)]
    pub ca: Option<String>,

    /// Basic auth username
    #[arg(short = 'u', long = "user", value_name = "USER")]
    pub user: Option<String>,

    /// Basic auth password
    #[arg(short = 'p', long = "password", value_name = "PASSWORD")]
    pub password: Option<SecretString>,

    // =========================================================================
    // REPEAT
    // =========================================================================

    /// Number of times to send the request
    #[arg(short = 'n', long = "repeat", value_name = "N", allow_negative_numbers = true)]
    pub repeat: Option<i64>,

    /// Maximum number of requests in flight at once
    #[arg(short = 'c', long = "concurrency", value_name = "N", allow_negative_numbers = true)]
    pub concurrency: Option<i64>,

    // =========================================================================
    // CONFIGURATION & TROUBLESHOOTING
    // =========================================================================

    /// Configuration file (default: $VOLLEY_CONFIG or <config dir>/volley/config.yaml)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Named profile from the configuration file
    #[arg(long = "profile", value_name = "NAME", env = "VOLLEY_PROFILE")]
    pub profile: Option<String>,

    /// Debug logging on stderr
    #[arg(long = "debug", action = ArgAction::SetTrue)]
    pub debug: bool,

    /// Log line format on stderr
    #[arg(long = "log-format", value_name = "FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,
}

/// Log format for diagnostics on stderr
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Plain text output (default)
    #[default]
    Text,
    /// JSON Lines format for parsing
    Json,
}
