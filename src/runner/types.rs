use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CallError;

use super::format::{format_duration, serialize_human, serialize_nanos};

/// Everything a run produced: one [`Call`] per parallel slot plus aggregate stats.
///
/// Call order follows completion-channel drain order and carries no meaning.
#[derive(Debug, Serialize)]
pub struct RunResult {
    pub requests: Vec<Call>,
    pub stats: Stats,
}

impl RunResult {
    /// Calls that finished with a response and no error.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.requests.iter().filter(|call| call.is_success()).count()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.requests
            .iter()
            .filter(|call| call.error.is_some())
            .count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(serialize_with = "serialize_human")]
    pub duration: Duration,
    pub latency: Latency,
}

/// Nearest-rank latency percentiles over successful calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Latency {
    #[serde(serialize_with = "serialize_human")]
    pub p50: Duration,
    #[serde(serialize_with = "serialize_human")]
    pub p90: Duration,
    #[serde(serialize_with = "serialize_human")]
    pub p99: Duration,
}

#[derive(Debug, Serialize)]
pub struct Call {
    pub response: Option<Response>,
    #[serde(skip)]
    pub error: Option<CallError>,
    pub error_message: Option<String>,
}

impl Call {
    #[must_use]
    pub const fn succeeded(response: Response) -> Self {
        Self {
            response: Some(response),
            error: None,
            error_message: None,
        }
    }

    #[must_use]
    pub fn failed(error: CallError) -> Self {
        let message = error_chain_message(&error);
        Self {
            response: None,
            error: Some(error),
            error_message: Some(message),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none() && self.response.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub status_code: u16,
    pub time: DateTime<Utc>,
    #[serde(serialize_with = "serialize_nanos")]
    pub duration: Duration,
    pub duration_h: String,
}

impl Response {
    #[must_use]
    pub fn new(status_code: u16, time: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            status_code,
            time,
            duration,
            duration_h: format_duration(duration),
        }
    }
}

/// Joins an error and its sources into one line, skipping repeated text.
fn error_chain_message(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(err) = source {
        let text = err.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = err.source();
    }
    message
}
