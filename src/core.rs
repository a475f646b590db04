//! Program driver: parse, resolve, execute, report

use std::io;
use std::sync::Arc;

use clap::Parser;
use tracing::debug;

use crate::auth::{self, AuthProfile};
use crate::cli::{Args, Invocation};
use crate::config::Config;
use crate::context::Environment;
use crate::engine::{ExecutionPlan, Runner};
use crate::errors::{Result, VolleyError};
use crate::logging;
use crate::output::{terminal, OutputSink, ResponseFormatter, StdioSink};
use crate::request::RequestSpec;
use crate::status::ExitStatus;

/// Everything resolved before the first network call
#[derive(Debug)]
pub struct Prepared {
    pub spec: RequestSpec,
    pub auth: AuthProfile,
    pub plan: ExecutionPlan,
    pub formatter: ResponseFormatter,
}

/// Main entry point for the CLI.
pub fn run(args: Vec<String>, env: Environment) -> ExitStatus {
    let parsed = match Args::try_parse_from(&args) {
        Ok(args) => args,
        Err(e) => {
            e.print().ok();
            return if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion
            {
                ExitStatus::Success
            } else {
                ExitStatus::Error
            };
        }
    };

    logging::init(parsed.debug, parsed.log_format.unwrap_or_default());
    debug!(args = ?parsed, "parsed arguments");

    let prepared = match prepare(&parsed, &env) {
        Ok(prepared) => prepared,
        Err(e) => return handle_error(e, &env),
    };

    if !prepared.auth.tls.verify {
        print_warning("TLS verification disabled", &env);
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => return handle_error(VolleyError::Io(e), &env),
    };

    match runtime.block_on(program(prepared, Arc::new(StdioSink))) {
        Ok(status) => status,
        Err(e) => handle_error(e, &env),
    }
}

/// Resolve configuration, credentials and the request.
///
/// Nothing touches the network here, so any error leaves stdout empty.
pub fn prepare(args: &Args, env: &Environment) -> Result<Prepared> {
    let config = Config::load(args.config.as_deref())?;
    let settings = config.settings(args.profile.as_deref())?;
    let invocation = Invocation::resolve(args, &settings, env)?;

    let mut auth = auth::resolve(&invocation.cli_credentials, &invocation.config_credentials)?;
    auth.tls.verify = !invocation.insecure;

    let spec = if invocation.read_stdin {
        let stdin = io::stdin();
        let mut reader = stdin.lock();
        RequestSpec::build(&invocation, &auth, Some(&mut reader))?
    } else {
        RequestSpec::build(&invocation, &auth, None)?
    };

    Ok(Prepared {
        spec,
        auth,
        plan: ExecutionPlan::from_invocation(&invocation),
        formatter: ResponseFormatter::new(invocation.display, invocation.colors),
    })
}

/// Execute a prepared run
pub async fn program(prepared: Prepared, sink: Arc<dyn OutputSink>) -> Result<ExitStatus> {
    let Prepared { spec, auth, plan, formatter } = prepared;
    let runner = Runner::new(spec, &auth.tls, plan, formatter, sink)?;
    let summary = runner.run().await?;
    Ok(ExitStatus::from_failures(summary.failed))
}

fn print_warning(message: &str, env: &Environment) {
    if env.stderr_isatty {
        eprintln!("{}", terminal::warning(&format!("Warning: {}", message)));
    } else {
        eprintln!("Warning: {}", message);
    }
}

fn handle_error(error: VolleyError, env: &Environment) -> ExitStatus {
    debug!(resolution = error.is_resolution_error(), error = ?error, "run failed");
    if env.stderr_isatty {
        eprintln!("{} {}", terminal::error("Error:"), error);
    } else {
        eprintln!("Error: {}", error);
    }
    ExitStatus::Error
}
