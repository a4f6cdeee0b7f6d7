use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Env var checked before `RUST_LOG`.
const LOG_ENV: &str = "PARALLEL_LOG";

pub fn init_logging(verbose: bool, no_color: bool) {
    let configured = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();
    let filter = build_filter(configured.as_deref(), verbose);

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

/// An explicit directive wins over `--verbose`; an invalid one falls back to `info`.
fn build_filter(configured: Option<&str>, verbose: bool) -> EnvFilter {
    match configured {
        Some(value) => EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new("info")),
        None if verbose => EnvFilter::new("debug"),
        None => EnvFilter::new("info"),
    }
}
