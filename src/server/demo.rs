use std::time::Duration;

use http::StatusCode;
use rand::Rng;
use rand::seq::SliceRandom;

/// Upper bound of the `/test` delay.
pub(super) const DEMO_MAX_DELAY: Duration = Duration::from_secs(10);
pub(super) const DEMO_BODY: &[u8] = br#"{"text": "hello"}"#;

/// Statuses `/test` picks from.
pub(super) const DEMO_STATUSES: [StatusCode; 7] = [
    StatusCode::OK,
    StatusCode::ACCEPTED,
    StatusCode::NO_CONTENT,
    StatusCode::BAD_REQUEST,
    StatusCode::FORBIDDEN,
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
];

/// Draws the delay and status for one `/test` answer.
pub(super) fn demo_outcome(max_delay: Duration) -> (Duration, StatusCode) {
    let mut rng = rand::thread_rng();
    let max_ms = u64::try_from(max_delay.as_millis()).unwrap_or(u64::MAX);
    let delay = if max_ms == 0 {
        Duration::ZERO
    } else {
        Duration::from_millis(rng.gen_range(0..max_ms))
    };
    let status = DEMO_STATUSES
        .choose(&mut rng)
        .copied()
        .unwrap_or(StatusCode::OK);
    (delay, status)
}
