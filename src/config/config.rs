//! Config file handling
//!
//! The configuration is a YAML document. Top-level keys are the defaults; the
//! optional `profiles` map holds named overlays selected with `--profile`.
//!
//! ```yaml
//! base_url: https://api.example.com
//! headers:
//!   X-Api-Key: secret
//! timeout: 10s
//! profiles:
//!   staging:
//!     base_url: https://staging.example.com
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::errors::{Result, VolleyError};
use crate::models::{DisplayMode, FormEncoding};
use crate::request::body::BodyReference;
use crate::request::form::FILE_INDICATOR;

/// Name of the config file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Timeout as either plain seconds or a humantime string ("1m 30s")
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TimeoutSetting {
    Seconds(f64),
    Text(String),
}

impl TimeoutSetting {
    pub fn to_duration(&self) -> Result<Duration> {
        match self {
            TimeoutSetting::Seconds(secs) if *secs > 0.0 && secs.is_finite() => {
                Duration::try_from_secs_f64(*secs).map_err(|e| {
                    VolleyError::Config(format!("timeout of {} seconds is out of range: {}", secs, e))
                })
            }
            TimeoutSetting::Seconds(secs) => Err(VolleyError::Config(format!(
                "timeout must be a positive number of seconds, got {}",
                secs
            ))),
            TimeoutSetting::Text(text) => humantime::parse_duration(text.trim()).map_err(|e| {
                VolleyError::Config(format!("invalid timeout '{}': {}", text, e))
            }),
        }
    }
}

/// Authentication material declared in the config file
#[derive(Clone, Default, Deserialize)]
pub struct AuthSettings {
    pub username: Option<String>,
    pub password: Option<String>,
    pub cert: Option<String>,
    pub key: Option<String>,
    pub ca: Option<String>,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("cert", &self.cert.is_some())
            .field("key", &self.key.is_some())
            .field("ca", &self.ca.is_some())
            .finish()
    }
}

impl AuthSettings {
    fn overlay(&self, other: &AuthSettings) -> AuthSettings {
        AuthSettings {
            username: other.username.clone().or_else(|| self.username.clone()),
            password: other.password.clone().or_else(|| self.password.clone()),
            cert: other.cert.clone().or_else(|| self.cert.clone()),
            key: other.key.clone().or_else(|| self.key.clone()),
            ca: other.ca.clone().or_else(|| self.ca.clone()),
        }
    }
}

/// One layer of settings: either the top level of the file or a profile
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub base_url: Option<String>,
    pub method: Option<String>,
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    pub output: Option<DisplayMode>,
    pub timeout: Option<TimeoutSetting>,
    pub follow_redirects: Option<bool>,
    pub insecure: Option<bool>,
    #[serde(default)]
    pub auth: AuthSettings,
    pub body: Option<String>,
    pub template: Option<PathBuf>,
    #[serde(default)]
    pub form: Vec<String>,
    pub form_encoding: Option<FormEncoding>,
    /// Legacy body file reference
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub variables: IndexMap<String, serde_yaml::Value>,
    pub repeat: Option<i64>,
    pub concurrency: Option<i64>,
}

impl Settings {
    /// Apply `other` on top of `self`; `other` wins field by field.
    pub fn overlay(&self, other: &Settings) -> Settings {
        let mut headers = self.headers.clone();
        headers.extend(other.headers.iter().map(|(k, v)| (k.clone(), v.clone())));

        let mut variables = self.variables.clone();
        variables.extend(other.variables.iter().map(|(k, v)| (k.clone(), v.clone())));

        Settings {
            base_url: other.base_url.clone().or_else(|| self.base_url.clone()),
            method: other.method.clone().or_else(|| self.method.clone()),
            headers,
            output: other.output.or(self.output),
            timeout: other.timeout.clone().or_else(|| self.timeout.clone()),
            follow_redirects: other.follow_redirects.or(self.follow_redirects),
            insecure: other.insecure.or(self.insecure),
            auth: self.auth.overlay(&other.auth),
            body: other.body.clone().or_else(|| self.body.clone()),
            template: other.template.clone().or_else(|| self.template.clone()),
            form: if other.form.is_empty() { self.form.clone() } else { other.form.clone() },
            form_encoding: other.form_encoding.or(self.form_encoding),
            file: other.file.clone().or_else(|| self.file.clone()),
            variables,
            repeat: other.repeat.or(self.repeat),
            concurrency: other.concurrency.or(self.concurrency),
        }
    }

    /// Template variables as strings; scalars are stringified, anything else
    /// is rejected.
    pub fn string_variables(&self) -> Result<IndexMap<String, String>> {
        self.variables
            .iter()
            .map(|(name, value)| {
                let text = match value {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    serde_yaml::Value::Null => String::new(),
                    _ => {
                        return Err(VolleyError::Config(format!(
                            "variable '{}' must be a string, number or boolean",
                            name
                        )))
                    }
                };
                Ok((name.clone(), text))
            })
            .collect()
    }

    /// Resolve relative file references against `base`, including `@path`
    /// values in `body` and `form`
    fn anchor_paths(&mut self, base: &Path) {
        for path in [&mut self.template, &mut self.file].into_iter().flatten() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }

        if let Some(body) = &mut self.body {
            if let BodyReference::File(path) = BodyReference::parse(body) {
                if path.is_relative() {
                    *body = format!("{}{}", FILE_INDICATOR, base.join(path).display());
                }
            }
        }

        for entry in &mut self.form {
            *entry = entry
                .lines()
                .map(|line| anchor_form_line(line, base))
                .collect::<Vec<_>>()
                .join("\n");
        }
    }
}

fn anchor_form_line(line: &str, base: &Path) -> String {
    let Some((name, value)) = line.split_once('=') else {
        return line.to_string();
    };
    match value.strip_prefix(FILE_INDICATOR) {
        Some(path) if !path.is_empty() && Path::new(path).is_relative() => {
            format!("{}={}{}", name, FILE_INDICATOR, base.join(path).display())
        }
        _ => line.to_string(),
    }
}

/// volley configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub defaults: Settings,
    #[serde(default)]
    pub profiles: IndexMap<String, Settings>,
    /// File the configuration was read from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Config {
    /// Load the configuration.
    ///
    /// An explicitly named file must exist; the default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => match std::env::var_os("VOLLEY_CONFIG") {
                Some(path) if !path.is_empty() => (PathBuf::from(path), true),
                _ => (Self::default_config_dir().join(CONFIG_FILE_NAME), false),
            },
        };

        if !path.exists() {
            if required {
                return Err(VolleyError::Config(format!(
                    "config file '{}' does not exist",
                    path.display()
                )));
            }
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            VolleyError::Config(format!("failed to read '{}': {}", path.display(), e))
        })?;

        let mut config = Self::from_yaml(&content).map_err(|e| match e {
            VolleyError::Config(msg) => VolleyError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;

        if let Some(dir) = path.parent() {
            config.defaults.anchor_paths(dir);
            for settings in config.profiles.values_mut() {
                settings.anchor_paths(dir);
            }
        }
        debug!(path = %path.display(), profiles = config.profiles.len(), "loaded config");
        config.source = Some(path);
        Ok(config)
    }

    /// Parse a configuration document
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| VolleyError::Config(format!("invalid YAML: {}", e)))
    }

    /// The effective settings for the selected profile (or the top level)
    pub fn settings(&self, profile: Option<&str>) -> Result<Settings> {
        match profile {
            None => Ok(self.defaults.clone()),
            Some(name) => {
                let overlay = self.profiles.get(name).ok_or_else(|| {
                    let known: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
                    VolleyError::Config(format!(
                        "unknown profile '{}' (known: {})",
                        name,
                        if known.is_empty() { "none".to_string() } else { known.join(", ") }
                    ))
                })?;
                Ok(self.defaults.overlay(overlay))
            }
        }
    }

    /// Get the default config directory
    fn default_config_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os("VOLLEY_CONFIG_DIR") {
            return PathBuf::from(dir);
        }
        dirs::config_dir()
            .map(|p| p.join("volley"))
            .unwrap_or_else(|| PathBuf::from(".volley"))
    }
}
