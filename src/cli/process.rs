//! Post-processing of parsed arguments
//!
//! Folds the command line over the loaded configuration into one immutable
//! [`Invocation`]. Every later stage reads from it; nothing is global.

use std::time::Duration;

use indexmap::IndexMap;
use tracing::debug;

use crate::auth::CredentialInputs;
use crate::cli::args::Args;
use crate::config::Settings;
use crate::context::Environment;
use crate::errors::{Result, VolleyError};
use crate::models::{DisplayMode, Toggle};
use crate::request::body::BodySources;
use crate::request::template::TemplateContext;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default HTTP method
pub const DEFAULT_METHOD: &str = "GET";

/// The resolved option set for one run
#[derive(Debug, Clone)]
pub struct Invocation {
    /// URL or path given on the command line
    pub target: Option<String>,
    pub base_url: Option<String>,
    pub method: String,
    pub cli_headers: Vec<String>,
    pub config_headers: IndexMap<String, String>,
    pub body: BodySources,
    pub variables: TemplateContext,
    pub display: DisplayMode,
    pub colors: bool,
    pub timeout: Duration,
    pub follow_redirects: bool,
    pub insecure: bool,
    pub cli_credentials: CredentialInputs,
    pub config_credentials: CredentialInputs,
    /// Raw counts; the execution plan clamps them
    pub repeat: i64,
    pub concurrency: i64,
    /// Whether stdin may be read as a body source
    pub read_stdin: bool,
}

impl Invocation {
    /// Resolve command-line arguments over configuration settings
    pub fn resolve(args: &Args, settings: &Settings, env: &Environment) -> Result<Self> {
        let display = if args.verbose {
            DisplayMode::Verbose
        } else {
            args.output.or(settings.output).unwrap_or_default()
        };

        let timeout = match args.timeout {
            Some(seconds) => seconds_to_duration(seconds)?,
            None => match &settings.timeout {
                Some(setting) => setting.to_duration()?,
                None => DEFAULT_TIMEOUT,
            },
        };

        let follow_redirects = Toggle::from_flags(args.follow_redirect, args.no_redirect)
            .or(Toggle::from_option(settings.follow_redirects))
            .resolve(true);

        let variables = TemplateContext::from_layers(&settings.string_variables()?, &args.vars)?;

        let body = BodySources {
            data: args.data.clone(),
            template: args.template.clone(),
            form: args.form.clone(),
            form_encoding: args.form_encoding.or(settings.form_encoding).unwrap_or_default(),
            config_body: settings.body.clone(),
            config_template: settings.template.clone(),
            config_form: settings.form.clone(),
            legacy_file: args.file.clone().or_else(|| settings.file.clone()),
        };

        let cli_credentials = CredentialInputs {
            cert: args.cert.clone(),
            key: args.key.clone(),
            ca: args.ca.clone(),
            username: args.user.clone(),
            password: args.password.as_ref().map(|p| p.as_str().to_string()),
        };
        let config_credentials = CredentialInputs {
            cert: settings.auth.cert.clone(),
            key: settings.auth.key.clone(),
            ca: settings.auth.ca.clone(),
            username: settings.auth.username.clone(),
            password: settings.auth.password.clone(),
        };

        let invocation = Self {
            target: args.url.clone(),
            base_url: settings.base_url.clone(),
            method: args
                .method
                .clone()
                .or_else(|| settings.method.clone())
                .unwrap_or_else(|| DEFAULT_METHOD.to_string()),
            cli_headers: args.headers.clone(),
            config_headers: settings.headers.clone(),
            body,
            variables,
            display,
            colors: env.colors && !args.no_color,
            timeout,
            follow_redirects,
            insecure: args.insecure || settings.insecure.unwrap_or(false),
            cli_credentials,
            config_credentials,
            repeat: args.repeat.or(settings.repeat).unwrap_or(1),
            concurrency: args.concurrency.or(settings.concurrency).unwrap_or(1),
            read_stdin: !args.ignore_stdin && !env.stdin_isatty,
        };

        debug!(
            method = %invocation.method,
            display = ?invocation.display,
            timeout = ?invocation.timeout,
            follow_redirects = invocation.follow_redirects,
            insecure = invocation.insecure,
            repeat = invocation.repeat,
            concurrency = invocation.concurrency,
            "resolved invocation"
        );

        Ok(invocation)
    }
}

fn seconds_to_duration(seconds: f64) -> Result<Duration> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(VolleyError::Argument(format!(
            "timeout must be a positive number of seconds, got {}",
            seconds
        )));
    }
    Duration::try_from_secs_f64(seconds).map_err(|e| {
        VolleyError::Argument(format!("timeout of {} seconds is out of range: {}", seconds, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use clap::Parser;

    fn args(argv: &[&str]) -> Args {
        let mut full = vec!["volley"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full).unwrap()
    }

    fn settings(yaml: &str) -> Settings {
        Config::from_yaml(yaml).unwrap().settings(None).unwrap()
    }

    #[test]
    fn test_defaults() {
        let inv = Invocation::resolve(&args(&["http://x"]), &Settings::default(), &Environment::detached()).unwrap();
        assert_eq!(inv.method, "GET");
        assert_eq!(inv.display, DisplayMode::Body);
        assert_eq!(inv.timeout, DEFAULT_TIMEOUT);
        assert!(inv.follow_redirects);
        assert!(!inv.insecure);
        assert_eq!((inv.repeat, inv.concurrency), (1, 1));
        assert!(inv.read_stdin);
    }

    #[test]
    fn test_cli_wins_over_config() {
        let cfg = settings("method: PUT\noutput: status\ntimeout: 5s\nrepeat: 3\nconcurrency: 2\n");
        let inv = Invocation::resolve(&args(&["-X", "PATCH", "-n", "7"]), &cfg, &Environment::detached()).unwrap();
        assert_eq!(inv.method, "PATCH");
        assert_eq!(inv.display, DisplayMode::Status);
        assert_eq!(inv.timeout, Duration::from_secs(5));
        assert_eq!((inv.repeat, inv.concurrency), (7, 2));
    }

    #[test]
    fn test_verbose_shorthand() {
        let inv = Invocation::resolve(&args(&["-v", "-o", "status"]), &Settings::default(), &Environment::detached()).unwrap();
        assert_eq!(inv.display, DisplayMode::Verbose);
    }

    #[test]
    fn test_redirect_layers() {
        let cfg = settings("follow_redirects: false\n");
        let env = Environment::detached();
        assert!(!Invocation::resolve(&args(&[]), &cfg, &env).unwrap().follow_redirects);
        assert!(Invocation::resolve(&args(&["--follow-redirect"]), &cfg, &env).unwrap().follow_redirects);
        assert!(
            Invocation::resolve(&args(&["--no-redirect", "--follow-redirect"]), &cfg, &env)
                .unwrap()
                .follow_redirects
        );
        assert!(
            !Invocation::resolve(&args(&["--follow-redirect", "--no-redirect"]), &Settings::default(), &env)
                .unwrap()
                .follow_redirects
        );
    }

    #[test]
    fn test_insecure_from_either_layer() {
        let env = Environment::detached();
        assert!(Invocation::resolve(&args(&["-k"]), &Settings::default(), &env).unwrap().insecure);
        assert!(Invocation::resolve(&args(&[]), &settings("insecure: true\n"), &env).unwrap().insecure);
    }

    #[test]
    fn test_invalid_timeout() {
        let err = Invocation::resolve(&args(&["--timeout", "0"]), &Settings::default(), &Environment::detached())
            .unwrap_err();
        assert!(matches!(err, VolleyError::Argument(_)));
    }

    #[test]
    fn test_oversized_timeout_is_an_error() {
        let err = Invocation::resolve(&args(&["--timeout", "1e30"]), &Settings::default(), &Environment::detached())
            .unwrap_err();
        assert!(matches!(err, VolleyError::Argument(_)));
    }

    #[test]
    fn test_variables_layered() {
        let cfg = settings("variables:\n  name: config\n  port: 8080\n");
        let inv = Invocation::resolve(&args(&["-V", "name=cli"]), &cfg, &Environment::detached()).unwrap();
        assert_eq!(inv.variables.get("name"), Some("cli"));
        assert_eq!(inv.variables.get("port"), Some("8080"));
    }

    #[test]
    fn test_stdin_rules() {
        let mut env = Environment::detached();
        assert!(!Invocation::resolve(&args(&["-I"]), &Settings::default(), &env).unwrap().read_stdin);
        env.stdin_isatty = true;
        assert!(!Invocation::resolve(&args(&[]), &Settings::default(), &env).unwrap().read_stdin);
    }

    #[test]
    fn test_colors_disabled_by_flag() {
        let mut env = Environment::detached();
        env.colors = true;
        assert!(Invocation::resolve(&args(&[]), &Settings::default(), &env).unwrap().colors);
        assert!(!Invocation::resolve(&args(&["--no-color"]), &Settings::default(), &env).unwrap().colors);
    }
}
