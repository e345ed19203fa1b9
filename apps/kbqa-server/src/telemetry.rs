use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; otherwise info everywhere and debug for our crates.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,kbqa=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
