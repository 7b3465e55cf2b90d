use std::env;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Log to stderr, and additionally to `LOG_FILE_PATH` when set.
///
/// The filter is `level` when given, else `TRACING_LEVEL`, else `info`.
/// The returned guard must stay alive until exit so the file writer flushes.
pub fn init_logger(level: Option<&str>) -> Option<WorkerGuard> {
    let filter = match level {
        Some(level) => level.to_string(),
        None => env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string()),
    };
    let filter_layer = EnvFilter::new(filter);

    let (file_layer, guard) = match env::var("LOG_FILE_PATH") {
        Ok(log_file_path) => {
            let file_appender = tracing_appender::rolling::never("./", log_file_path);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().with_writer(non_blocking).with_ansi(false);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .with_ansi(true),
        )
        .with(file_layer)
        .with(filter_layer)
        .init();

    debug!("Tracing is configured");

    guard
}
