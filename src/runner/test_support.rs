use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Poll interval of the non-blocking accept loops.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);
const READ_TIMEOUT: Duration = Duration::from_secs(2);

pub(super) const OK_RESPONSE: &[u8] =
    b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOK";

pub(super) struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

#[derive(Clone, Copy)]
enum Mode {
    Respond(&'static [u8]),
    Hold,
}

/// Serves `response` to every connection and forwards each raw request.
pub(super) fn spawn_http_server(
    response: &'static [u8],
) -> Result<(String, ServerHandle, mpsc::Receiver<Vec<u8>>), String> {
    spawn_server(Mode::Respond(response))
}

/// Accepts connections and never answers them.
pub(super) fn spawn_silent_server() -> Result<(String, ServerHandle), String> {
    let (url, handle, _requests) = spawn_server(Mode::Hold)?;
    Ok((url, handle))
}

/// An endpoint on a port nothing listens on.
pub(super) fn refused_endpoint() -> Result<String, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    drop(listener);
    Ok(format!("http://{}", addr))
}

fn spawn_server(mode: Mode) -> Result<(String, ServerHandle, mpsc::Receiver<Vec<u8>>), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    let (request_tx, request_rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        let mut held: Vec<TcpStream> = Vec::new();
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => match mode {
                    Mode::Respond(response) => {
                        let request_tx = request_tx.clone();
                        thread::spawn(move || handle_client(stream, response, &request_tx));
                    }
                    Mode::Hold => held.push(stream),
                },
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(_) => break,
            }
        }
        drop(held);
    });

    Ok((
        format!("http://{}", addr),
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
        },
        request_rx,
    ))
}

fn handle_client(mut stream: TcpStream, response: &[u8], request_tx: &mpsc::Sender<Vec<u8>>) {
    if stream.set_nonblocking(false).is_err() || stream.set_read_timeout(Some(READ_TIMEOUT)).is_err()
    {
        return;
    }
    let request = read_request(&mut stream);
    drop(request_tx.send(request));
    if stream.write_all(response).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

fn read_request(stream: &mut TcpStream) -> Vec<u8> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let read = match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(read) => read,
        };
        buffer.extend_from_slice(chunk.get(..read).unwrap_or_default());
        if request_complete(&buffer) {
            break;
        }
    }
    buffer
}

fn request_complete(buffer: &[u8]) -> bool {
    let Some(header_end) = buffer.windows(4).position(|window| window == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(buffer.get(..header_end).unwrap_or_default());
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    buffer.len() >= header_end.saturating_add(4).saturating_add(content_length)
}
