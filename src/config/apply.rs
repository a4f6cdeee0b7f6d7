use chrono::TimeDelta;
use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{CliArgs, parse_header};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ConfigFile, DurationValue};

/// Applies configuration values to CLI arguments.
///
/// Values given explicitly on the command line win over the file.
///
/// # Errors
///
/// Returns an error when config values are invalid or conflict.
pub fn apply_config(
    args: &mut CliArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if config.data.is_some() && config.data_file.is_some() {
        return Err(AppError::config(ConfigError::Conflict {
            left: "data",
            right: "data_file",
        }));
    }

    if !is_cli(matches, "method")
        && let Some(method) = config.method
    {
        args.method = method;
    }

    if !is_cli(matches, "endpoint")
        && let Some(endpoint) = config.endpoint.clone()
    {
        args.endpoint = Some(endpoint);
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        let mut parsed = Vec::with_capacity(headers.len());
        for header in headers {
            parsed.push(
                parse_header(header)
                    .map_err(|err| AppError::config(ConfigError::InvalidHeader { source: err }))?,
            );
        }
        args.headers = parsed;
    }

    let body_from_cli = is_cli(matches, "data") || is_cli(matches, "data_file");
    if !body_from_cli {
        if let Some(data) = config.data.clone() {
            args.data = Some(data);
        }
        if let Some(path) = config.data_file.clone() {
            args.data_file = Some(path);
        }
    }

    if !is_cli(matches, "parallel")
        && let Some(parallel) = config.parallel
    {
        args.parallel = parallel;
    }

    if !is_cli(matches, "duration")
        && let Some(duration) = config.duration.as_ref()
    {
        args.duration = config_duration(duration, "duration")?;
    }

    if !is_cli(matches, "timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.timeout = config_duration(timeout, "timeout")?;
    }

    if !is_cli(matches, "format")
        && let Some(format) = config.format
    {
        args.format = format;
    }

    if !is_cli(matches, "port")
        && let Some(port) = config.port
    {
        args.port = port;
    }

    if !is_cli(matches, "static_dir")
        && let Some(static_dir) = config.static_dir.clone()
    {
        args.static_dir = static_dir;
    }

    Ok(())
}

fn config_duration(value: &DurationValue, field: &'static str) -> AppResult<TimeDelta> {
    value
        .to_time_delta()
        .map_err(|source| AppError::config(ConfigError::InvalidDuration { field, source }))
}

fn is_cli(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

