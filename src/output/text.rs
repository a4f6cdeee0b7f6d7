use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{AppError, AppResult, OutputError};
use crate::runner::{Call, RunResult, format_duration};

const MISSING: &str = "-";

pub(super) fn render_text(result: &RunResult) -> AppResult<String> {
    let mut output = String::new();

    write_line(&mut output, "Results:")?;
    write_line(
        &mut output,
        &format!(
            " {:>3}. {:>35} {:>11} {:>20} {:>15}",
            "#", "Time", "Status Code", "Duration", "Error"
        ),
    )?;
    for (idx, call) in result.requests.iter().enumerate() {
        let (time, status, duration, error) = call_columns(call);
        write_line(
            &mut output,
            &format!(
                " {:>3}. {:>35} {:>11} {:>20} {:>15}",
                idx.saturating_add(1),
                time,
                status,
                duration,
                error
            ),
        )?;
    }

    let stats = &result.stats;
    write_line(&mut output, "")?;
    write_line(&mut output, "Stats:")?;
    write_line(
        &mut output,
        &format!("  Start Time: {}", timestamp(&stats.start_time)),
    )?;
    write_line(
        &mut output,
        &format!("  End Time: {}", timestamp(&stats.end_time)),
    )?;
    write_line(
        &mut output,
        &format!("  Total Duration: {}", format_duration(stats.duration)),
    )?;
    write_line(&mut output, "Latency:")?;
    write_line(
        &mut output,
        &format!("  P50 {}", format_duration(stats.latency.p50)),
    )?;
    write_line(
        &mut output,
        &format!("  P90 {}", format_duration(stats.latency.p90)),
    )?;
    write_line(
        &mut output,
        &format!("  P99 {}", format_duration(stats.latency.p99)),
    )?;

    Ok(output)
}

/// Calls without a response show `-` for time, status and duration.
fn call_columns(call: &Call) -> (String, String, String, String) {
    let mut time = MISSING.to_owned();
    let mut status = MISSING.to_owned();
    let mut duration = MISSING.to_owned();
    if let Some(response) = call.response.as_ref() {
        time = timestamp(&response.time);
        status = response.status_code.to_string();
        duration.clone_from(&response.duration_h);
    }
    let error = call.error_message.clone().unwrap_or_default();
    (time, status, duration, error)
}

fn timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn write_line(output: &mut String, line: &str) -> AppResult<()> {
    writeln!(output, "{}", line)
        .map_err(|err| AppError::output(OutputError::WriteLine { source: err }))
}
