use std::time::Duration;

use serde::Serializer;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;
const SECS_PER_MIN: u64 = 60;
const SECS_PER_HOUR: u64 = 3_600;

/// Formats a duration in the compact `1h2m3.5s` / `30ms` / `1.5µs` form.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_owned();
    }
    if nanos < NANOS_PER_MICRO {
        return format!("{}ns", nanos);
    }
    if nanos < NANOS_PER_MILLI {
        return format!("{}µs", format_scaled(nanos, NANOS_PER_MICRO, 3));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", format_scaled(nanos, NANOS_PER_MILLI, 6));
    }

    let total_secs = duration.as_secs();
    let hours = total_secs.checked_div(SECS_PER_HOUR).unwrap_or(0);
    let minutes = total_secs
        .checked_rem(SECS_PER_HOUR)
        .and_then(|rem| rem.checked_div(SECS_PER_MIN))
        .unwrap_or(0);
    let secs = total_secs.checked_rem(SECS_PER_MIN).unwrap_or(0);
    let sec_nanos = u128::from(secs)
        .saturating_mul(NANOS_PER_SEC)
        .saturating_add(u128::from(duration.subsec_nanos()));
    let seconds = format_scaled(sec_nanos, NANOS_PER_SEC, 9);

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

fn format_scaled(value: u128, unit: u128, width: usize) -> String {
    let whole = value.checked_div(unit).unwrap_or(0);
    let rem = value.checked_rem(unit).unwrap_or(0);
    if rem == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:0width$}", rem, width = width);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

pub(crate) fn serialize_human<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_duration(*duration))
}

pub(crate) fn serialize_nanos<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX))
}
