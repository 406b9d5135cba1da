use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid repository '{0}', expected owner/repo")]
    InvalidRepo(String),

    #[error("GitHub request failed")]
    Transport(#[from] octocrab::Error),

    #[error("page {page} is not an issue list: {detail}")]
    MalformedPage { page: u32, detail: String },

    #[error("could not decode issues on page {page}")]
    Decode {
        page: u32,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
