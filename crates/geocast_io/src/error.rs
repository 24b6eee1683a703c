//! Failures while storing or loading run artifacts.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("no such file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("document is empty")]
    EmptyDocument,

    #[error("gzip stream: {0}")]
    Gzip(#[source] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("file system: {0}")]
    FileSystem(#[from] std::io::Error),

    /// An inner failure tagged with what was being done.
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<IoError>,
    },
}

pub type Result<T> = std::result::Result<T, IoError>;

impl IoError {
    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}
