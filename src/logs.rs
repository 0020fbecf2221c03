use super::*;

/// Installs the global subscriber: human-readable events on stderr,
/// filtered by `RUST_LOG`. Keep the guard alive until exit so buffered
/// events are flushed.
pub(crate) fn init() -> tracing_appender::non_blocking::WorkerGuard {
    let (writer, guard) = non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(writer),
        )
        .with(EnvFilter::from_default_env())
        .init();

    guard
}
