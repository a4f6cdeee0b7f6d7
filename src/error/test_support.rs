use super::{ConfigError, OutputError, ServerError, ValidationError};

impl From<&'static str> for ValidationError {
    fn from(message: &'static str) -> Self {
        ValidationError::TestExpectation { message }
    }
}

impl From<String> for ValidationError {
    fn from(value: String) -> Self {
        ValidationError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for ConfigError {
    fn from(message: &'static str) -> Self {
        ConfigError::TestExpectation { message }
    }
}

impl From<String> for ConfigError {
    fn from(value: String) -> Self {
        ConfigError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for OutputError {
    fn from(message: &'static str) -> Self {
        OutputError::TestExpectation { message }
    }
}

impl From<String> for OutputError {
    fn from(value: String) -> Self {
        OutputError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for ServerError {
    fn from(message: &'static str) -> Self {
        ServerError::TestExpectation { message }
    }
}

impl From<String> for ServerError {
    fn from(value: String) -> Self {
        ServerError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}
