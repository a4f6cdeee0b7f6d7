use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::TimeDelta;
use tracing::{debug, info};

use parallel::args::{CliArgs, OutputFormat};
use parallel::error::{AppError, AppResult, ValidationError};
use parallel::output::render;
use parallel::runner::{Input, Runner};
use parallel::server::{self, ServerState};
use parallel::shutdown::shutdown_channel;

use crate::shutdown_handlers::setup_signal_shutdown_handler;

#[derive(Debug)]
pub(super) enum RunPlan {
    Serve {
        port: u16,
        static_dir: PathBuf,
    },
    Once {
        timeout: TimeDelta,
        input: Input,
        format: OutputFormat,
    },
}

pub(super) fn build_plan(args: &CliArgs) -> AppResult<RunPlan> {
    if args.serve {
        return Ok(RunPlan::Serve {
            port: args.port,
            static_dir: PathBuf::from(&args.static_dir),
        });
    }

    Ok(RunPlan::Once {
        timeout: args.timeout,
        input: build_input(args)?,
        format: args.format,
    })
}

/// Maps CLI values onto a run description. Validation is left to the runner.
fn build_input(args: &CliArgs) -> AppResult<Input> {
    let body = match (args.data.as_ref(), args.data_file.as_ref()) {
        (Some(data), _) => Some(data.clone().into_bytes()),
        (None, Some(path)) => Some(std::fs::read(path).map_err(|err| {
            AppError::validation(ValidationError::ReadDataFile {
                path: path.clone(),
                source: err,
            })
        })?),
        (None, None) => None,
    };
    let headers: BTreeMap<String, String> = args.headers.iter().cloned().collect();

    Ok(Input {
        method: args.method.as_str().to_owned(),
        endpoint: args.endpoint.clone().unwrap_or_default(),
        body,
        headers,
        parallel: args.parallel,
        duration: args.duration,
    })
}

pub(super) async fn execute_plan(plan: RunPlan) -> AppResult<()> {
    let (shutdown_tx, _) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let outcome = match plan {
        RunPlan::Serve { port, static_dir } => {
            info!("Serving {} on port {}", static_dir.display(), port);
            match server::bind(port).await {
                Ok(listener) => {
                    server::serve(listener, ServerState::new(static_dir, shutdown_tx.clone()))
                        .await
                }
                Err(err) => Err(err),
            }
        }
        RunPlan::Once {
            timeout,
            input,
            format,
        } => {
            debug!(
                "Running {} {} x{}",
                input.method, input.endpoint, input.parallel
            );
            let run_result = match Runner::new(timeout) {
                Ok(runner) => runner.run(&shutdown_tx, input).await,
                Err(err) => Err(err),
            };
            match run_result {
                Ok(result) => render(&result, format).map(|rendered| {
                    if rendered.ends_with('\n') {
                        print!("{}", rendered);
                    } else {
                        println!("{}", rendered);
                    }
                }),
                Err(err) => Err(AppError::from(err)),
            }
        }
    };

    drop(shutdown_tx.send(()));
    signal_handle.await?;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Result<CliArgs, String> {
        CliArgs::try_parse_from(args).map_err(|err| format!("parse failed: {}", err))
    }

    fn once_input(args: &CliArgs) -> Result<(TimeDelta, Input, OutputFormat), String> {
        match build_plan(args).map_err(|err| err.to_string())? {
            RunPlan::Once {
                timeout,
                input,
                format,
            } => Ok((timeout, input, format)),
            RunPlan::Serve { .. } => Err("Expected a single run plan".to_owned()),
        }
    }

    #[test]
    fn build_plan_maps_run_flags() -> Result<(), String> {
        let args = parse(&[
            "parallel",
            "-X",
            "put",
            "-e",
            "http://localhost:3000",
            "-H",
            "X-A: 1",
            "-H",
            "X-A: 2",
            "-d",
            "payload",
            "-p",
            "4",
            "--duration",
            "2s",
            "--timeout",
            "150ms",
            "-f",
            "yaml",
        ])?;
        let (timeout, input, format) = once_input(&args)?;

        if timeout != TimeDelta::milliseconds(150) || format != OutputFormat::Yaml {
            return Err("Unexpected timeout or format".to_owned());
        }
        if input.method != "PUT" || input.endpoint != "http://localhost:3000" {
            return Err(format!("Unexpected method or endpoint: {:?}", input));
        }
        if input.headers.get("X-A").map(String::as_str) != Some("2") {
            return Err("Expected later header to win".to_owned());
        }
        if input.body.as_deref() != Some(b"payload".as_slice()) {
            return Err("Unexpected body".to_owned());
        }
        if input.parallel != 4 || input.duration != TimeDelta::seconds(2) {
            return Err("Unexpected parallel or duration".to_owned());
        }
        Ok(())
    }

    #[test]
    fn build_plan_leaves_missing_endpoint_to_runner() -> Result<(), String> {
        let args = parse(&["parallel", "-p", "2"])?;
        let (_, input, _) = once_input(&args)?;
        if !input.endpoint.is_empty() || input.method != "GET" {
            return Err(format!("Unexpected input: {:?}", input));
        }
        Ok(())
    }

    #[test]
    fn build_plan_reads_data_file() -> Result<(), String> {
        let dir = tempfile::tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
        let path = dir.path().join("body.json");
        std::fs::write(&path, br#"{"a":1}"#).map_err(|err| format!("write failed: {}", err))?;
        let path_arg = path.display().to_string();
        let args = parse(&["parallel", "-e", "http://localhost", "-D", &path_arg])?;

        let (_, input, _) = once_input(&args)?;
        if input.body.as_deref() != Some(br#"{"a":1}"#.as_slice()) {
            return Err("Unexpected body from file".to_owned());
        }
        Ok(())
    }

    #[test]
    fn build_plan_reports_missing_data_file() -> Result<(), String> {
        let args = parse(&[
            "parallel",
            "-e",
            "http://localhost",
            "-D",
            "/nonexistent/parallel-body.json",
        ])?;
        match build_plan(&args) {
            Err(AppError::Validation(ValidationError::ReadDataFile { .. })) => Ok(()),
            Err(err) => Err(format!("Unexpected error: {}", err)),
            Ok(plan) => Err(format!("Expected read failure, got {:?}", plan)),
        }
    }

    #[test]
    fn build_plan_serve_mode() -> Result<(), String> {
        let args = parse(&["parallel", "--serve", "--port", "9000", "--static-dir", "web"])?;
        match build_plan(&args).map_err(|err| err.to_string())? {
            RunPlan::Serve { port, static_dir } => {
                if port != 9000 || static_dir != PathBuf::from("web") {
                    return Err(format!("Unexpected serve plan: {} {}", port, static_dir.display()));
                }
                Ok(())
            }
            RunPlan::Once { .. } => Err("Expected serve plan".to_owned()),
        }
    }
}
