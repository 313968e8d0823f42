use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Unknown provider name, or `custom` without a base URL.
    #[error("Invalid type or missing custom URL: '{0}'")]
    InvalidProvider(String),

    #[error("Could not determine the home directory")]
    HomeDirNotFound,

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
