//! HTTP front-end: the JSON run API, a health probe, a demo endpoint and a
//! static file server.
mod demo;
mod http;
mod run;
mod static_files;


use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ::http::StatusCode;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, ServerError};
use crate::shutdown::ShutdownSender;

use self::http::{
    CONTENT_TYPE_JSON, HttpRequest, read_http_request, write_error_response,
    write_head_response, write_json_response, write_response,
};
use self::run::{RunPayload, run_payload};

/// Shared state handed to every connection task.
#[derive(Debug, Clone)]
pub struct ServerState {
    static_dir: PathBuf,
    demo_max_delay: Duration,
    shutdown_tx: ShutdownSender,
}

impl ServerState {
    #[must_use]
    pub fn new(static_dir: impl Into<PathBuf>, shutdown_tx: ShutdownSender) -> Self {
        Self {
            static_dir: static_dir.into(),
            demo_max_delay: demo::DEMO_MAX_DELAY,
            shutdown_tx,
        }
    }

    /// Caps the random delay of `/test`.
    #[must_use]
    pub const fn with_demo_max_delay(mut self, max_delay: Duration) -> Self {
        self.demo_max_delay = max_delay;
        self
    }
}

/// Binds the API listener on all interfaces.
///
/// # Errors
///
/// Returns an error when the port cannot be bound.
pub async fn bind(port: u16) -> AppResult<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    TcpListener::bind(addr).await.map_err(|err| {
        AppError::server(ServerError::Bind {
            addr: addr.to_string(),
            source: err,
        })
    })
}

/// Accepts connections until a shutdown is broadcast.
///
/// # Errors
///
/// Returns an error when the listener fails to accept.
pub async fn serve(listener: TcpListener, state: ServerState) -> AppResult<()> {
    let mut shutdown_rx = state.shutdown_tx.subscribe();
    let state = Arc::new(state);
    match listener.local_addr() {
        Ok(addr) => info!("Server started at: {}", addr),
        Err(err) => warn!("Server started, local address unavailable: {}", err),
    }

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Server shutting down");
                break;
            }
            accepted = listener.accept() => {
                let (socket, peer) = accepted
                    .map_err(|err| AppError::server(ServerError::Accept { source: err }))?;
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(socket, &state).await {
                        debug!("Connection from {} failed: {}", peer, err);
                    }
                });
            }
        }
    }
    Ok(())
}

async fn handle_connection(mut socket: TcpStream, state: &ServerState) -> AppResult<()> {
    let request = match read_http_request(&mut socket).await {
        Ok(request) => request,
        Err(err) => {
            debug!("Rejected request: {}", err.message);
            return write_error_response(&mut socket, err.status, "bad.request", &err.message)
                .await;
        }
    };
    debug!("{} {}", request.method, request.path);

    match request.path.as_str() {
        "/health" => handle_health(&mut socket).await,
        "/run" => handle_run(&mut socket, state, &request).await,
        "/test" => handle_demo(&mut socket, state).await,
        _ => handle_static(&mut socket, state, &request).await,
    }
}

async fn handle_health(socket: &mut TcpStream) -> AppResult<()> {
    write_json_response(socket, StatusCode::OK, &serde_json::json!({ "status": "ok" })).await
}

async fn handle_run(
    socket: &mut TcpStream,
    state: &ServerState,
    request: &HttpRequest,
) -> AppResult<()> {
    if request.method != "POST" {
        return write_error_response(
            socket,
            StatusCode::METHOD_NOT_ALLOWED,
            "method.not.allowed",
            "Method not allowed",
        )
        .await;
    }
    let payload: RunPayload = match serde_json::from_slice(&request.body) {
        Ok(payload) => payload,
        Err(err) => {
            debug!("Invalid run payload: {}", err);
            return write_error_response(
                socket,
                StatusCode::BAD_REQUEST,
                "bad.request",
                "Bad request",
            )
            .await;
        }
    };

    match run_payload(&state.shutdown_tx, payload).await {
        Ok(response) => write_json_response(socket, StatusCode::OK, &response).await,
        Err(err) => {
            write_error_response(
                socket,
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation.error",
                &err.to_string(),
            )
            .await
        }
    }
}

async fn handle_demo(socket: &mut TcpStream, state: &ServerState) -> AppResult<()> {
    let (delay, status) = demo::demo_outcome(state.demo_max_delay);
    tokio::time::sleep(delay).await;
    write_response(socket, status, CONTENT_TYPE_JSON, demo::DEMO_BODY).await
}

async fn handle_static(
    socket: &mut TcpStream,
    state: &ServerState,
    request: &HttpRequest,
) -> AppResult<()> {
    if request.method != "GET" && request.method != "HEAD" {
        return write_error_response(
            socket,
            StatusCode::METHOD_NOT_ALLOWED,
            "method.not.allowed",
            "Method not allowed",
        )
        .await;
    }
    let Some(path) = static_files::resolve_static_path(&state.static_dir, &request.path) else {
        return write_not_found(socket).await;
    };
    match tokio::fs::read(&path).await {
        Ok(contents) => {
            let content_type = static_files::content_type(&path);
            if request.method == "HEAD" {
                write_head_response(socket, StatusCode::OK, content_type, contents.len()).await
            } else {
                write_response(socket, StatusCode::OK, content_type, &contents).await
            }
        }
        Err(err) => {
            debug!("Static file {} unavailable: {}", path.display(), err);
            write_not_found(socket).await
        }
    }
}

async fn write_not_found(socket: &mut TcpStream) -> AppResult<()> {
    write_error_response(socket, StatusCode::NOT_FOUND, "not.found", "Not found").await
}
