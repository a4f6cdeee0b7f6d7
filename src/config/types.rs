use chrono::TimeDelta;
use serde::Deserialize;

use crate::args::parsers::parse_duration;
use crate::args::{HttpMethod, OutputFormat};
use crate::error::ValidationError;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub method: Option<HttpMethod>,
    #[serde(alias = "url")]
    pub endpoint: Option<String>,
    pub headers: Option<Vec<String>>,
    pub data: Option<String>,
    pub data_file: Option<String>,
    pub parallel: Option<i64>,
    pub duration: Option<DurationValue>,
    pub timeout: Option<DurationValue>,
    pub format: Option<OutputFormat>,
    pub port: Option<u16>,
    pub static_dir: Option<String>,
}

/// A duration given either as signed milliseconds or as text like `250ms`.
///
/// Negative milliseconds are kept so the runner can report them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Millis(i64),
    Text(String),
}

impl DurationValue {
    /// Converts the value into a signed delta.
    ///
    /// # Errors
    ///
    /// Returns an error when the text form does not parse or the value
    /// overflows.
    pub fn to_time_delta(&self) -> Result<TimeDelta, ValidationError> {
        match self {
            DurationValue::Millis(ms) => {
                TimeDelta::try_milliseconds(*ms).ok_or(ValidationError::DurationOverflow)
            }
            DurationValue::Text(text) => parse_duration(text),
        }
    }
}
