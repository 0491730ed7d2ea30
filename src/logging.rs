use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber.
///
/// Filter precedence: `--log-level`, then `RUST_LOG`, then `info`. `--quiet` caps it at `warn`.
pub fn init(level: Option<&str>, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("warn")
    } else {
        level
            .and_then(|l| EnvFilter::try_new(l).ok())
            .or_else(|| EnvFilter::try_from_default_env().ok())
            .unwrap_or_else(|| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
