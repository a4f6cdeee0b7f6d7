use std::time::Duration;

use chrono::Utc;
use futures_util::StreamExt;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Client, Method, Request};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::error::CallError;
use crate::shutdown::ShutdownReceiver;

use super::classify::classify;
use super::input::Input;
use super::types::{Call, Response};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Performs one request for `input` and records its outcome.
///
/// The request races the shutdown signal and, when `budget` is set, a
/// deadline of that length. Either firing marks the call canceled.
pub(super) async fn execute_call(
    client: &Client,
    input: &Input,
    budget: Option<Duration>,
    mut shutdown_rx: ShutdownReceiver,
) -> Call {
    let request = match build_request(client, input) {
        Ok(request) => request,
        Err(err) => return Call::failed(CallError::BuildRequest { source: err }),
    };

    let time = Utc::now();
    let started = Instant::now();
    let deadline = async {
        match budget {
            Some(budget) => sleep(budget).await,
            None => std::future::pending::<()>().await,
        }
    };

    let outcome = tokio::select! {
        biased;
        () = wait_for_shutdown(&mut shutdown_rx) => None,
        () = deadline => None,
        result = send(client, request, started) => Some(result),
    };

    let deadline_passed = budget.is_some_and(|budget| started.elapsed() >= budget);
    match outcome {
        None => {
            debug!("Call to {} canceled", input.endpoint);
            Call::failed(CallError::Canceled)
        }
        Some(_) if deadline_passed => Call::failed(CallError::Canceled),
        Some(Err(err)) => {
            debug!("Call to {} failed: {}", input.endpoint, err);
            Call::failed(classify(err))
        }
        Some(Ok((status, duration))) => Call::succeeded(Response::new(status, time, duration)),
    }
}

/// Sends the request and drains the body. The duration is taken once the
/// response head arrives.
async fn send(
    client: &Client,
    request: Request,
    started: Instant,
) -> Result<(u16, Duration), reqwest::Error> {
    let response = client.execute(request).await?;
    let duration = started.elapsed();
    let status = response.status().as_u16();
    drain_response_body(response).await?;
    Ok((status, duration))
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}

async fn wait_for_shutdown(shutdown_rx: &mut ShutdownReceiver) {
    match shutdown_rx.recv().await {
        Ok(()) | Err(RecvError::Lagged(_)) => {}
        // No sender left means nobody can ask us to stop.
        Err(RecvError::Closed) => std::future::pending::<()>().await,
    }
}

pub(super) fn build_request(client: &Client, input: &Input) -> Result<Request, BoxError> {
    let method = Method::from_bytes(input.method.to_ascii_uppercase().as_bytes())?;
    let mut builder = client.request(method, input.endpoint.as_str());
    if let Some(body) = input.body.as_ref() {
        builder = builder.body(body.clone());
    }
    let mut request = builder.build()?;

    let headers = request.headers_mut();
    for (key, value) in &input.headers {
        let name = HeaderName::from_bytes(key.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        headers.insert(name, value);
    }
    Ok(request)
}
