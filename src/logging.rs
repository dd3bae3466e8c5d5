use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `fairway=debug`.
pub const LOG_ENV: &str = "FAIRWAY_LOG";

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "fairway=debug"
    } else {
        "warn"
    }
}

/// Install the stderr log subscriber. `FAIRWAY_LOG` wins over `--verbose`.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
