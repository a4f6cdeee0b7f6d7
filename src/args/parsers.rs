use chrono::TimeDelta;

use crate::error::{AppError, AppResult, ValidationError};

const MS_PER_SEC: i64 = 1_000;
const SECS_PER_MIN: i64 = 60;
const SECS_PER_HOUR: i64 = 3_600;

pub fn parse_header(s: &str) -> Result<(String, String), ValidationError> {
    match s.split_once(':') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.trim().to_owned()))
        }
        Some(_) | None => Err(ValidationError::InvalidHeaderFormat {
            value: s.to_owned(),
        }),
    }
}

/// Parses `0`, bare seconds, or `<n>ms|s|m|h` into a non-negative delta.
///
/// # Errors
///
/// Returns an error for empty input, a missing number, an unknown unit or a
/// value that overflows.
pub fn parse_duration_arg(s: &str) -> AppResult<TimeDelta> {
    parse_duration(s).map_err(AppError::validation)
}

pub(crate) fn parse_duration(s: &str) -> Result<TimeDelta, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let digits_len = value.chars().take_while(char::is_ascii_digit).count();
    if digits_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: i64 =
        num_part
            .parse()
            .map_err(|err| ValidationError::InvalidDurationNumber {
                value: value.to_owned(),
                source: err,
            })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    let millis = match unit {
        "ms" => Some(number),
        "s" => number.checked_mul(MS_PER_SEC),
        "m" => number
            .checked_mul(SECS_PER_MIN)
            .and_then(|secs| secs.checked_mul(MS_PER_SEC)),
        "h" => number
            .checked_mul(SECS_PER_HOUR)
            .and_then(|secs| secs.checked_mul(MS_PER_SEC)),
        _ => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };

    millis
        .and_then(TimeDelta::try_milliseconds)
        .ok_or(ValidationError::DurationOverflow)
}
