//! Core library for the `parallel` CLI.
//!
//! This crate fires a burst of concurrent HTTP requests at one endpoint and
//! reports every call's outcome together with nearest-rank latency
//! percentiles. The binary drives it from CLI flags or a config file, or
//! exposes it over a small JSON API with `--serve`.
pub mod args;
pub mod config;
pub mod error;
pub mod output;
pub mod runner;
pub mod server;
pub mod shutdown;
