use thiserror::Error;

/// Reasons an [`Input`](crate::runner::Input) is rejected before any request is sent.
///
/// Variants are listed in the order the validator checks them.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    #[error("endpoint is required")]
    EndpointRequired,
    #[error("invalid value for method")]
    InvalidMethod,
    #[error("invalid value for parallel")]
    InvalidParallel,
    #[error("invalid value for duration")]
    InvalidDuration,
}

/// Configuration failures that abort a run before any call is made.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid value for timeout")]
    InvalidTimeout,
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("failed to build HTTP client: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },
}

/// Outcome of a single failed call.
///
/// The classified variants carry fixed messages so consumers can match on
/// them; `BuildRequest` and `Transport` pass the underlying error through.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("host not found")]
    HostNotFound,
    #[error("connection refused. The server may be down")]
    ConnectionRefused,
    #[error("request timed out")]
    TimedOut,
    #[error("canceled")]
    Canceled,
    #[error("call task aborted")]
    Aborted,
    #[error("{source}")]
    BuildRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error(transparent)]
    Transport(reqwest::Error),
}

impl CallError {
    /// Whether the message is one of the fixed classified strings.
    #[must_use]
    pub const fn is_classified(&self) -> bool {
        matches!(
            self,
            CallError::HostNotFound
                | CallError::ConnectionRefused
                | CallError::TimedOut
                | CallError::Canceled
        )
    }
}
