//! Renders a [`RunResult`] for the terminal.
mod text;


use crate::args::OutputFormat;
use crate::error::{AppError, AppResult, OutputError};
use crate::runner::RunResult;

/// Renders the run result in the requested format.
///
/// # Errors
///
/// Returns an error when serialization or text formatting fails.
pub fn render(result: &RunResult, format: OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Json => serde_json::to_string(result)
            .map_err(|err| AppError::output(OutputError::SerializeJson { source: err })),
        OutputFormat::Yaml => serde_yaml::to_string(result)
            .map_err(|err| AppError::output(OutputError::SerializeYaml { source: err })),
        OutputFormat::Text => text::render_text(result),
    }
}
