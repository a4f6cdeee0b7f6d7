use std::collections::HashMap;

use http::StatusCode;
use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::{AppError, AppResult, ServerError};

pub(super) const CONTENT_TYPE_JSON: &str = "application/json";
const MAX_REQUEST_BYTES: usize = 1024 * 1024;

pub(super) struct HttpRequest {
    pub(super) method: String,
    pub(super) path: String,
    pub(super) body: Vec<u8>,
}

/// A request that could not be read, answered with `status`.
#[derive(Debug)]
pub(super) struct RequestError {
    pub(super) status: StatusCode,
    pub(super) message: String,
}

impl RequestError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

pub(super) async fn read_http_request(socket: &mut TcpStream) -> Result<HttpRequest, RequestError> {
    let mut buffer: Vec<u8> = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    let header_end;

    loop {
        let bytes = socket
            .read(&mut chunk)
            .await
            .map_err(|err| RequestError::bad_request(format!("Failed to read request: {}", err)))?;
        if bytes == 0 {
            return Err(RequestError::bad_request("Empty request"));
        }
        let read_slice = chunk
            .get(..bytes)
            .ok_or_else(|| RequestError::bad_request("Invalid read length"))?;
        buffer.extend_from_slice(read_slice);
        if buffer.len() > MAX_REQUEST_BYTES {
            return Err(RequestError::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request too large",
            ));
        }
        if let Some(pos) = find_header_end(&buffer) {
            header_end = pos;
            break;
        }
    }

    let header_bytes = buffer
        .get(..header_end)
        .ok_or_else(|| RequestError::bad_request("Malformed request headers"))?;
    let header_text = std::str::from_utf8(header_bytes)
        .map_err(|err| RequestError::bad_request(format!("Invalid request encoding: {}", err)))?;
    let mut lines = header_text.split("\r\n");
    let request_line = lines
        .next()
        .ok_or_else(|| RequestError::bad_request("Missing request line"))?;
    let mut parts = request_line.split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| RequestError::bad_request("Missing HTTP method"))?;
    let target = parts
        .next()
        .ok_or_else(|| RequestError::bad_request("Missing request path"))?;
    let path = target.split(['?', '#']).next().unwrap_or(target);

    let mut headers = HashMap::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            return Err(RequestError::bad_request("Malformed header"));
        };
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }

    let content_length = headers
        .get("content-length")
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(0);
    if content_length > MAX_REQUEST_BYTES {
        return Err(RequestError::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body too large",
        ));
    }
    let body_start = header_end
        .checked_add(4)
        .ok_or_else(|| RequestError::bad_request("Malformed request headers"))?;
    let mut body = buffer.get(body_start..).unwrap_or_default().to_vec();
    while body.len() < content_length {
        let bytes = socket
            .read(&mut chunk)
            .await
            .map_err(|err| RequestError::bad_request(format!("Failed to read body: {}", err)))?;
        if bytes == 0 {
            break;
        }
        let read_slice = chunk
            .get(..bytes)
            .ok_or_else(|| RequestError::bad_request("Invalid read length"))?;
        body.extend_from_slice(read_slice);
    }
    body.truncate(content_length);

    Ok(HttpRequest {
        method: method.to_ascii_uppercase(),
        path: path.to_owned(),
        body,
    })
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

pub(super) async fn write_json_response<T>(
    socket: &mut TcpStream,
    status: StatusCode,
    response: &T,
) -> AppResult<()>
where
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(response).map_err(|err| {
        AppError::server(ServerError::Serialize {
            context: "json response",
            source: err,
        })
    })?;
    write_response(socket, status, CONTENT_TYPE_JSON, &body).await
}

/// Answers with `{"error": code, "title": title}`.
pub(super) async fn write_error_response(
    socket: &mut TcpStream,
    status: StatusCode,
    code: &str,
    title: &str,
) -> AppResult<()> {
    #[derive(Serialize)]
    struct ErrorResponse<'msg> {
        error: &'msg str,
        title: &'msg str,
    }
    write_json_response(socket, status, &ErrorResponse { error: code, title }).await
}

/// Writes a full response and closes the exchange. Bodiless statuses drop `body`.
pub(super) async fn write_response(
    socket: &mut TcpStream,
    status: StatusCode,
    content_type: &str,
    body: &[u8],
) -> AppResult<()> {
    let body = if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED {
        &[][..]
    } else {
        body
    };
    write_head(socket, status, content_type, body.len()).await?;
    socket.write_all(body).await.map_err(|err| {
        AppError::server(ServerError::Io {
            context: "write response body",
            source: err,
        })
    })?;
    flush(socket).await
}

/// Answers a `HEAD` request: the head advertises `content_length`, no body follows.
pub(super) async fn write_head_response(
    socket: &mut TcpStream,
    status: StatusCode,
    content_type: &str,
    content_length: usize,
) -> AppResult<()> {
    write_head(socket, status, content_type, content_length).await?;
    flush(socket).await
}

async fn write_head(
    socket: &mut TcpStream,
    status: StatusCode,
    content_type: &str,
    content_length: usize,
) -> AppResult<()> {
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown"),
        content_type,
        content_length
    );
    socket.write_all(head.as_bytes()).await.map_err(|err| {
        AppError::server(ServerError::Io {
            context: "write response",
            source: err,
        })
    })
}

async fn flush(socket: &mut TcpStream) -> AppResult<()> {
    socket.flush().await.map_err(|err| {
        AppError::server(ServerError::Io {
            context: "flush response",
            source: err,
        })
    })
}
