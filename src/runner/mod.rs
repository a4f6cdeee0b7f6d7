//! Parallel request runner: validation, fan-out, error classification and
//! latency aggregation.
mod call;
mod classify;
mod format;
mod input;
mod latency;
mod types;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use reqwest::Client;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{CallError, RunError};
use crate::shutdown::ShutdownSender;

use call::execute_call;

pub use classify::{ErrorCategory, categorize, classify};
pub use format::format_duration;
pub use input::{Input, MAX_PARALLEL, SUPPORTED_METHODS};
pub use latency::{latency, nearest_rank};
pub use types::{Call, Latency, Response, RunResult, Stats};

/// Issues bursts of concurrent requests through one shared HTTP client.
///
/// The client is built once, with the per-call timeout, and reused by every
/// run.
#[derive(Debug, Clone)]
pub struct Runner {
    timeout: TimeDelta,
    client: Client,
}

impl Runner {
    /// Creates a runner whose calls each time out after `timeout`.
    ///
    /// Zero disables the per-call timeout. A negative value is accepted here
    /// and rejected by [`Runner::run`].
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(timeout: TimeDelta) -> Result<Self, RunError> {
        let mut builder = Client::builder();
        if let Some(timeout) = positive_std(timeout) {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|source| RunError::Client { source })?;
        Ok(Self { timeout, client })
    }

    #[must_use]
    pub const fn timeout(&self) -> TimeDelta {
        self.timeout
    }

    /// Runs `input.parallel` requests concurrently and waits for all of them.
    ///
    /// Every call outcome, failures included, ends up in the returned
    /// [`RunResult`], in completion order. Sending on `shutdown_tx` cancels
    /// the calls still in flight.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured timeout is negative or when
    /// `input` fails validation. No request is sent in those cases.
    pub async fn run(
        &self,
        shutdown_tx: &ShutdownSender,
        input: Input,
    ) -> Result<RunResult, RunError> {
        if self.timeout < TimeDelta::zero() {
            return Err(RunError::InvalidTimeout);
        }
        input.validate()?;
        let budget = positive_std(input.duration);

        debug!(
            "Starting run: {} {} x{}",
            input.method, input.endpoint, input.parallel
        );

        let parallel = input.parallel;
        let input = Arc::new(input);
        let start_time = Utc::now();
        let started = Instant::now();
        let mut calls = JoinSet::new();

        for _ in 0..parallel {
            let client = self.client.clone();
            let input = Arc::clone(&input);
            let shutdown_rx = shutdown_tx.subscribe();
            calls.spawn(async move { execute_call(&client, &input, budget, shutdown_rx).await });
        }

        let mut requests = Vec::new();
        while let Some(joined) = calls.join_next().await {
            match joined {
                Ok(call) => requests.push(call),
                Err(err) => {
                    warn!("Call task failed: {}", err);
                    requests.push(Call::failed(CallError::Aborted));
                }
            }
        }
        let end_time = Utc::now();
        let duration = started.elapsed();

        let latency = latency(&requests);
        debug!(
            "Run finished in {}: p50={} p90={} p99={}",
            format_duration(duration),
            format_duration(latency.p50),
            format_duration(latency.p90),
            format_duration(latency.p99)
        );

        Ok(RunResult {
            requests,
            stats: Stats {
                start_time,
                end_time,
                duration,
                latency,
            },
        })
    }
}

/// Converts a strictly positive delta; zero and negative values yield `None`.
fn positive_std(delta: TimeDelta) -> Option<Duration> {
    delta.to_std().ok().filter(|duration| !duration.is_zero())
}
