//! Tracing subscriber setup for the command line tool

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::Subscriber;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt};

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid log file path: {0}")]
    InvalidPath(PathBuf),

    #[error("Failed to install subscriber: {0}")]
    Install(#[from] SetGlobalDefaultError),
}

type BoxedSubscriber = Box<dyn Subscriber + Send + Sync>;

/// Open `path` for appending behind a non-blocking writer
fn file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::InvalidPath(path.to_path_buf()))?;
    let dir = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

/// Stderr output plus an optional plain (no ANSI) copy to `file`
fn build_subscriber(filter: EnvFilter, json: bool, file: Option<NonBlocking>) -> BoxedSubscriber {
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        let file_layer = file.map(|writer| fmt::layer().json().with_writer(writer));
        Box::new(
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .with(file_layer),
        )
    } else {
        let file_layer = file.map(|writer| {
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
        });
        Box::new(
            registry
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .with(file_layer),
        )
    }
}

/// Install the global subscriber.
///
/// The returned guard must be held until exit so buffered file lines are
/// flushed.
pub fn init_logging(
    json: bool,
    log_file: Option<&Path>,
) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (file, guard) = match log_file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    tracing::subscriber::set_global_default(build_subscriber(filter, json, file))?;

    Ok(guard)
}
