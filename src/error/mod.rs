mod app;
mod config;
mod output;
mod run;
mod server;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use output::OutputError;
pub use run::{CallError, InputError, RunError};
pub use server::ServerError;
pub use validation::ValidationError;
