//! Tracing setup: human-readable stderr output plus an optional rotating
//! JSON file.

use ephemera_config::LoggingSection;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be kept
/// alive for the life of the process.
pub fn init(verbose: bool, logging: Option<&LoggingSection>) -> Option<WorkerGuard> {
    let filter = if verbose {
        "ephemera=debug,ephemera_session=debug,ephemera_config=debug,info"
    } else {
        "ephemera=info,ephemera_session=info,warn"
    };

    let (file_layer, guard) = match logging.and_then(|l| l.dir.as_ref().map(|dir| (dir, l))) {
        Some((dir, section)) => {
            let appender = tracing_appender::rolling::daily(dir, &section.file_prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(EnvFilter::new(
                    "ephemera=trace,ephemera_session=trace,ephemera_config=trace,info",
                ));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // Logs go to stderr so `--json` output on stdout stays parseable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::new(filter)),
        )
        .with(file_layer)
        .init();

    guard
}
