use chrono::TimeDelta;
use clap::Parser;

use super::parsers::{parse_duration_arg, parse_header};
use super::types::{HttpMethod, OutputFormat};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Fire a burst of concurrent HTTP requests at one endpoint and report per-call outcomes and latency percentiles."
)]
pub struct CliArgs {
    /// HTTP method to use
    #[arg(long, short = 'X', default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// Endpoint to call
    #[arg(long, short = 'e', alias = "url")]
    pub endpoint: Option<String>,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request body
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// Request body from file
    #[arg(long = "data-file", short = 'D', conflicts_with = "data")]
    pub data_file: Option<String>,

    /// Number of parallel calls
    #[arg(long, short = 'p', default_value_t = 1, allow_negative_numbers = true)]
    pub parallel: i64,

    /// Max duration for all calls, 0 for no limit (supports ms/s/m/h)
    #[arg(long, default_value = "0", value_parser = parse_duration_arg)]
    pub duration: TimeDelta,

    /// Per-request timeout, 0 for no limit (supports ms/s/m/h)
    #[arg(long, default_value = "0", value_parser = parse_duration_arg)]
    pub timeout: TimeDelta,

    /// Output format
    #[arg(long, short = 'f', default_value = "json", ignore_case = true)]
    pub format: OutputFormat,

    /// Start the HTTP server instead of running once
    #[arg(long)]
    pub serve: bool,

    /// HTTP server port
    #[arg(long, default_value_t = super::DEFAULT_PORT)]
    pub port: u16,

    /// Directory served at / by the HTTP server
    #[arg(long = "static-dir", default_value = super::DEFAULT_STATIC_DIR)]
    pub static_dir: String,

    /// Path to config file (TOML/JSON). Defaults to ./parallel.toml or ./parallel.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by PARALLEL_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
