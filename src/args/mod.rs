//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
mod test_support;

pub use cli::CliArgs;
pub use defaults::{DEFAULT_PORT, DEFAULT_STATIC_DIR};
pub use parsers::{parse_duration_arg, parse_header};
pub use types::{HttpMethod, OutputFormat};
