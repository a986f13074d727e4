use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by a platform keyboard source.
///
/// None of these reach the host: the controller factory turns them into an
/// inert handle.
#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("keyboard watcher is unavailable on this platform")]
    Unavailable,
    #[error("keyboard watcher rejected listener: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
