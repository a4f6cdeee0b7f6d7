use std::collections::BTreeMap;

use chrono::TimeDelta;

use crate::error::InputError;

/// Methods a run may use, compared after uppercasing.
pub const SUPPORTED_METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

/// Largest burst a single run may launch.
pub const MAX_PARALLEL: i64 = 100_000;

/// Description of one burst of requests.
///
/// Producers (CLI flags, config files, the JSON API) coerce their values into
/// this shape; the runner validates it before doing anything else. `parallel`
/// and `duration` are signed so out-of-range values survive coercion and are
/// reported by [`Input::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub method: String,
    pub endpoint: String,
    pub body: Option<Vec<u8>>,
    /// Header values set on every request, overwriting any earlier value.
    pub headers: BTreeMap<String, String>,
    pub parallel: i64,
    /// Overall budget applied as a deadline to each call. Zero means unbounded.
    pub duration: TimeDelta,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            method: "GET".to_owned(),
            endpoint: String::new(),
            body: None,
            headers: BTreeMap::new(),
            parallel: 1,
            duration: TimeDelta::zero(),
        }
    }
}

impl Input {
    /// Checks the input, reporting the first rule that fails.
    ///
    /// # Errors
    ///
    /// Returns the [`InputError`] for the first failing rule, checked in the
    /// order endpoint, method, parallel, duration.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.endpoint.is_empty() {
            return Err(InputError::EndpointRequired);
        }
        let method = self.method.to_ascii_uppercase();
        if !SUPPORTED_METHODS.contains(&method.as_str()) {
            return Err(InputError::InvalidMethod);
        }
        if self.parallel <= 0 || self.parallel > MAX_PARALLEL {
            return Err(InputError::InvalidParallel);
        }
        if self.duration < TimeDelta::zero() {
            return Err(InputError::InvalidDuration);
        }
        Ok(())
    }
}
