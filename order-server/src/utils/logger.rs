//! Logging Infrastructure
//!
//! Console logging by default; daily rolling files when a log directory is
//! configured and exists.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger with optional file output
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init_logger_with_file(level: &str, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists() {
            let file_appender = tracing_appender::rolling::daily(log_path, "order-server");
            // try_init: tests and embedders may already have a subscriber
            let _ = subscriber.with_ansi(false).with_writer(file_appender).try_init();
            return;
        }
        eprintln!("Log directory {dir} does not exist, logging to console");
    }

    let _ = subscriber.try_init();
}
