use tracing_subscriber::EnvFilter;

/// Initialise logging for hosts embedding the engine. The default level is
/// `info`; passing `debug = true` (usually from the settings file) raises it
/// to `debug` and lets `RUST_LOG` override the filter.
pub fn init(debug: bool) {
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        // Ignore RUST_LOG when debug logging is off so a stray environment
        // variable cannot make an embedding host verbose.
        EnvFilter::new(level)
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
