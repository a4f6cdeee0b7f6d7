use std::error::Error as StdError;
use std::io::ErrorKind;

use crate::error::CallError;

/// Fragments resolvers put in their error text when a name does not resolve.
const HOST_NOT_FOUND_MARKERS: [&str; 6] = [
    "dns error",
    "failed to lookup address",
    "no such host",
    "name or service not known",
    "nodename nor servname",
    "no address associated",
];
const CONNECTION_REFUSED_MARKER: &str = "connection refused";
const TIMED_OUT_MARKER: &str = "timed out";

/// Stable failure categories a transport error can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    HostNotFound,
    ConnectionRefused,
    TimedOut,
}

impl ErrorCategory {
    #[must_use]
    pub const fn into_call_error(self) -> CallError {
        match self {
            ErrorCategory::HostNotFound => CallError::HostNotFound,
            ErrorCategory::ConnectionRefused => CallError::ConnectionRefused,
            ErrorCategory::TimedOut => CallError::TimedOut,
        }
    }
}

/// Maps a transport error to a [`CallError`].
///
/// Errors that match no category are passed through unchanged.
#[must_use]
pub fn classify(err: reqwest::Error) -> CallError {
    if let Some(category) = categorize(&err) {
        return category.into_call_error();
    }
    if err.is_timeout() {
        return CallError::TimedOut;
    }
    CallError::Transport(err)
}

/// Looks through an error and its sources for a known failure category.
///
/// Host resolution wins over refusal, which wins over timeout.
#[must_use]
pub fn categorize(err: &(dyn StdError + 'static)) -> Option<ErrorCategory> {
    if chain_matches(err, is_host_not_found) {
        return Some(ErrorCategory::HostNotFound);
    }
    if chain_matches(err, is_connection_refused) {
        return Some(ErrorCategory::ConnectionRefused);
    }
    if chain_matches(err, is_timed_out) {
        return Some(ErrorCategory::TimedOut);
    }
    None
}

fn chain_matches(
    err: &(dyn StdError + 'static),
    predicate: fn(&(dyn StdError + 'static)) -> bool,
) -> bool {
    let mut current = Some(err);
    while let Some(err) = current {
        if predicate(err) {
            return true;
        }
        current = err.source();
    }
    false
}

fn is_host_not_found(err: &(dyn StdError + 'static)) -> bool {
    let text = err.to_string().to_ascii_lowercase();
    HOST_NOT_FOUND_MARKERS
        .iter()
        .any(|marker| text.contains(marker))
}

fn is_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    if io_kind(err) == Some(ErrorKind::ConnectionRefused) {
        return true;
    }
    err.to_string()
        .to_ascii_lowercase()
        .contains(CONNECTION_REFUSED_MARKER)
}

fn is_timed_out(err: &(dyn StdError + 'static)) -> bool {
    if io_kind(err) == Some(ErrorKind::TimedOut) {
        return true;
    }
    err.to_string()
        .to_ascii_lowercase()
        .contains(TIMED_OUT_MARKER)
}

fn io_kind(err: &(dyn StdError + 'static)) -> Option<ErrorKind> {
    err.downcast_ref::<std::io::Error>().map(std::io::Error::kind)
}
