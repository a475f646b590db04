//! Environment struct (terminal detection)

/// Execution environment
#[derive(Debug, Clone)]
pub struct Environment {
    pub stdin_isatty: bool,
    pub stderr_isatty: bool,
    /// Whether stdout can render ANSI colours
    pub colors: bool,
}

impl Environment {
    /// Initialize the environment from the real process streams
    pub fn init() -> Self {
        Self::default()
    }

    /// An environment with no terminal attached (used by tests)
    pub fn detached() -> Self {
        Self {
            stdin_isatty: false,
            stderr_isatty: false,
            colors: false,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            stdin_isatty: atty::is(atty::Stream::Stdin),
            stderr_isatty: atty::is(atty::Stream::Stderr),
            colors: detect_color_support(),
        }
    }
}

/// Detect whether stdout supports colour
fn detect_color_support() -> bool {
    if !atty::is(atty::Stream::Stdout) {
        return false;
    }

    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    !matches!(std::env::var("TERM").as_deref(), Ok("dumb"))
}
