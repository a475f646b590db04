//! Repeat runner
//!
//! Sends the same request `repeat` times through one shared client. A
//! semaphore admits at most `concurrency` executions at once; every
//! execution renders its own output and writes it in one piece.

use std::sync::Arc;

use reqwest::Client;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

use super::plan::ExecutionPlan;
use crate::client::{self, TlsProfile};
use crate::errors::{Result, VolleyError};
use crate::output::{OutputSink, ResponseFormatter};
use crate::request::RequestSpec;

/// Outcome of a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    fn record(&mut self, outcome: std::result::Result<bool, JoinError>) {
        match outcome {
            Ok(true) => self.succeeded += 1,
            Ok(false) => self.failed += 1,
            Err(e) => {
                warn!(error = %e, "iteration task aborted");
                self.failed += 1;
            }
        }
    }
}

/// Executes a request plan
pub struct Runner {
    client: Client,
    spec: Arc<RequestSpec>,
    plan: ExecutionPlan,
    formatter: ResponseFormatter,
    sink: Arc<dyn OutputSink>,
}

impl Runner {
    /// Build the shared client once for the whole run
    pub fn new(
        spec: RequestSpec,
        tls: &TlsProfile,
        plan: ExecutionPlan,
        formatter: ResponseFormatter,
        sink: Arc<dyn OutputSink>,
    ) -> Result<Self> {
        let client = client::build_client(plan.transport(), tls)?;
        Ok(Self { client, spec: Arc::new(spec), plan, formatter, sink })
    }

    /// Run every iteration and wait for all of them.
    ///
    /// A lone request that fails returns the error. When repeating, failures
    /// are reported per iteration and counted in the summary.
    pub async fn run(self) -> Result<RunSummary> {
        if !self.plan.is_repeated() {
            let record = client::execute(&self.client, &self.spec, 0).await?;
            self.sink.write_stdout(&self.formatter.format(&record))?;
            return Ok(RunSummary { succeeded: 1, failed: 0 });
        }

        info!(
            repeat = self.plan.repeat,
            concurrency = self.plan.concurrency,
            url = %self.spec.url,
            "starting repeated run"
        );

        let semaphore = Arc::new(Semaphore::new(self.plan.concurrency));
        let mut tasks = JoinSet::new();
        let mut summary = RunSummary::default();

        for index in 0..self.plan.repeat {
            // Wait for a free slot before spawning so at most `concurrency`
            // tasks exist at any time
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            while let Some(done) = tasks.try_join_next() {
                summary.record(done);
            }

            let iteration = self.plan.iteration_label(index);
            let client = self.client.clone();
            let spec = self.spec.clone();
            let formatter = self.formatter;
            let sink = self.sink.clone();

            tasks.spawn(async move {
                let _permit = permit;
                run_iteration(&client, &spec, iteration, formatter, sink.as_ref()).await
            });
        }

        while let Some(done) = tasks.join_next().await {
            summary.record(done);
        }

        info!(succeeded = summary.succeeded, failed = summary.failed, "run finished");
        Ok(summary)
    }
}

/// One execution; returns whether the round trip completed
async fn run_iteration(
    client: &Client,
    spec: &RequestSpec,
    iteration: usize,
    formatter: ResponseFormatter,
    sink: &dyn OutputSink,
) -> bool {
    match client::execute(client, spec, iteration).await {
        Ok(record) => {
            if let Err(e) = sink.write_stdout(&formatter.format(&record)) {
                warn!(iteration, error = %e, "failed to write output");
            }
            true
        }
        Err(e) => {
            debug!(iteration, error = %e, "iteration failed");
            let message = match &e {
                VolleyError::Network(message) => message.clone(),
                other => other.to_string(),
            };
            if let Err(e) = sink.write_stderr(formatter.format_failure(iteration, &message).as_bytes()) {
                warn!(iteration, error = %e, "failed to write error");
            }
            false
        }
    }
}
