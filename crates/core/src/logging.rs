//! Log setup shared by every binary entry point.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initializes global logging for `component` and returns the guard that
/// flushes the file writer on drop.
///
/// Log files land in `~/.traitdex/logs` as `<component>.<date>`, rolled
/// daily. `RUST_LOG` overrides the default `info` filter. With `to_stderr`
/// set, a human-readable copy also goes to stderr.
pub fn init_logging(component: &str, to_stderr: bool) -> WorkerGuard {
    let log_dir = log_directory();
    let _ = std::fs::create_dir_all(&log_dir);

    let file_appender = tracing_appender::rolling::daily(&log_dir, component);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    if to_stderr {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);
        registry.with(stderr_layer).init();
    } else {
        registry.init();
    }

    guard
}

fn log_directory() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".traitdex").join("logs")
}
