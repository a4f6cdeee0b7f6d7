use std::time::Duration;

use super::types::{Call, Latency};

const PERCENTILE_P50: u64 = 50;
const PERCENTILE_P90: u64 = 90;
const PERCENTILE_P99: u64 = 99;
const PERCENT_DIVISOR: u64 = 100;

/// Computes P50/P90/P99 over the durations of successful calls.
///
/// Failed calls, calls without a response and zero durations are left out of
/// the sample. With no eligible sample every percentile is zero.
#[must_use]
pub fn latency(calls: &[Call]) -> Latency {
    let mut samples: Vec<Duration> = calls
        .iter()
        .filter(|call| call.error.is_none())
        .filter_map(|call| call.response.as_ref())
        .map(|response| response.duration)
        .filter(|duration| !duration.is_zero())
        .collect();
    samples.sort_unstable();

    Latency {
        p50: nearest_rank(&samples, PERCENTILE_P50),
        p90: nearest_rank(&samples, PERCENTILE_P90),
        p99: nearest_rank(&samples, PERCENTILE_P99),
    }
}

/// Nearest-rank percentile of an ascending sample: index `ceil(p*n/100) - 1`.
#[must_use]
pub fn nearest_rank(sorted: &[Duration], percentile: u64) -> Duration {
    let Some(last) = sorted.len().checked_sub(1) else {
        return Duration::ZERO;
    };
    let count = u64::try_from(sorted.len()).unwrap_or(u64::MAX);
    let rank = percentile
        .saturating_mul(count)
        .saturating_add(PERCENT_DIVISOR.saturating_sub(1))
        .checked_div(PERCENT_DIVISOR)
        .unwrap_or(0);
    let index = usize::try_from(rank.saturating_sub(1))
        .unwrap_or(last)
        .min(last);
    sorted.get(index).copied().unwrap_or(Duration::ZERO)
}
