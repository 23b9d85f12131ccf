use tracing_subscriber::{fmt, EnvFilter};

/// Initialize tracing to stderr, honoring RUST_LOG (default "warn") so
/// table rendering on stdout stays clean.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(false)
        .compact()
        .init();
}
