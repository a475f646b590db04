//! Core option types shared between the CLI, the configuration file and the
//! request pipeline.

use clap::ValueEnum;
use serde::Deserialize;

/// A setting that can be switched on, switched off, or left to a lower layer.
///
/// Replaces "boolean as string" flags: `Unset` means no signal was given, so
/// the next layer (configuration, then built-in default) decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Toggle {
    #[default]
    Unset,
    Enabled,
    Disabled,
}

impl Toggle {
    /// Build from a pair of opposing flags.
    ///
    /// The parser resolves "last flag wins" before this point, so at most one
    /// of the two is set; if both are somehow set, `on` wins.
    pub fn from_flags(on: bool, off: bool) -> Self {
        match (on, off) {
            (true, _) => Toggle::Enabled,
            (false, true) => Toggle::Disabled,
            (false, false) => Toggle::Unset,
        }
    }

    pub fn from_option(value: Option<bool>) -> Self {
        match value {
            Some(true) => Toggle::Enabled,
            Some(false) => Toggle::Disabled,
            None => Toggle::Unset,
        }
    }

    /// Layer this toggle over `fallback`
    pub fn or(self, fallback: Toggle) -> Toggle {
        match self {
            Toggle::Unset => fallback,
            set => set,
        }
    }

    pub fn resolve(self, default: bool) -> bool {
        match self {
            Toggle::Enabled => true,
            Toggle::Disabled => false,
            Toggle::Unset => default,
        }
    }
}

/// How a response is rendered on stdout
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Response body only (pretty JSON when the response is JSON)
    #[default]
    Body,
    /// Numeric status code only
    Status,
    /// Status line, sorted headers, blank line, body
    Verbose,
}

/// How form fields are encoded
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormEncoding {
    /// Multipart when any field uploads a file, url-encoded otherwise
    #[default]
    Auto,
    /// application/x-www-form-urlencoded
    Urlencoded,
    /// multipart/form-data
    Multipart,
}
