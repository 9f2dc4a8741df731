use tracing_subscriber::EnvFilter;

/// Initialise logging. The default level is `info`, or `debug` when `verbose`
/// is set; `RUST_LOG` overrides either.
pub fn init(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // A second init (e.g. from tests) is not an error worth reporting.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
