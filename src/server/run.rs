use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use tracing::debug;

use crate::error::{InputError, RunError};
use crate::runner::{Input, Latency, RunResult, Runner, format_duration};
use crate::shutdown::ShutdownSender;

/// Body of `POST /run`. Missing fields take their zero value and are then
/// judged by the runner's validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct RunPayload {
    pub(super) method: String,
    pub(super) endpoint: String,
    /// Forwarded to the target byte for byte.
    pub(super) body: Option<Box<RawValue>>,
    pub(super) headers: BTreeMap<String, String>,
    pub(super) parallel: i64,
    /// Milliseconds.
    pub(super) request_timeout: i64,
    /// Milliseconds.
    pub(super) max_duration: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct ResponsePayload {
    pub(super) results: Vec<CallSummary>,
    pub(super) summary: Summary,
}

#[derive(Debug, Serialize)]
pub(super) struct CallSummary {
    pub(super) time: Option<DateTime<Utc>>,
    pub(super) status_code: Option<u16>,
    pub(super) duration: Option<String>,
    pub(super) error: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct Summary {
    pub(super) total_requests: usize,
    pub(super) success_count: usize,
    pub(super) error_count: usize,
    pub(super) avg_duration: String,
    pub(super) latency: Latency,
}

/// Runs the burst described by `payload`.
pub(super) async fn run_payload(
    shutdown_tx: &ShutdownSender,
    payload: RunPayload,
) -> Result<ResponsePayload, RunError> {
    let timeout =
        TimeDelta::try_milliseconds(payload.request_timeout).ok_or(RunError::InvalidTimeout)?;
    let duration =
        TimeDelta::try_milliseconds(payload.max_duration).ok_or(InputError::InvalidDuration)?;
    let input = Input {
        method: payload.method,
        endpoint: payload.endpoint,
        body: payload.body.map(|raw| raw.get().as_bytes().to_vec()),
        headers: payload.headers,
        parallel: payload.parallel,
        duration,
    };
    debug!("API run: {} {} x{}", input.method, input.endpoint, input.parallel);

    let result = Runner::new(timeout)?.run(shutdown_tx, input).await?;
    Ok(summarize(&result))
}

/// Success means no error and a status below 400. The average spreads the
/// recorded durations over every call, failed ones included.
pub(super) fn summarize(result: &RunResult) -> ResponsePayload {
    let total_requests = result.requests.len();
    let mut success_count: usize = 0;
    let mut total_duration = Duration::ZERO;
    let mut results = Vec::with_capacity(total_requests);

    for call in &result.requests {
        let mut summary = CallSummary {
            time: None,
            status_code: None,
            duration: None,
            error: call.error_message.clone(),
        };
        if let Some(response) = call.response.as_ref() {
            if call.error.is_none() && response.status_code < 400 {
                success_count = success_count.saturating_add(1);
            }
            total_duration = total_duration.saturating_add(response.duration);
            summary.time = Some(response.time);
            summary.status_code = Some(response.status_code);
            summary.duration = Some(response.duration_h.clone());
        }
        results.push(summary);
    }

    let avg_duration = u32::try_from(total_requests)
        .ok()
        .and_then(|count| total_duration.checked_div(count))
        .unwrap_or(Duration::ZERO);

    ResponsePayload {
        results,
        summary: Summary {
            total_requests,
            success_count,
            error_count: total_requests.saturating_sub(success_count),
            avg_duration: format_duration(avg_duration),
            latency: result.stats.latency,
        },
    }
}
