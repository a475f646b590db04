//! Persisted configuration

pub mod config;

pub use config::{AuthSettings, Config, Settings, TimeoutSetting};
