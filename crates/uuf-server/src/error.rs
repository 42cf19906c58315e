//! Error types for uuf-server

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Apps directory not found: {0}")]
    AppsDirNotFound(PathBuf),

    #[error("No apps found in {0} (expected subdirectories containing app.json)")]
    NoApps(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

pub type Result<T> = std::result::Result<T, Error>;
