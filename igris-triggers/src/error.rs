use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("invalid trigger word: {0:?}")]
    InvalidKey(String),

    #[error("invalid image URL: {0}")]
    InvalidImageUrl(String),

    #[error("trigger response is empty")]
    EmptyContent,

    #[error("trigger response is {0} characters long")]
    ContentTooLong(usize),

    #[error("trigger file {path} is corrupt")]
    StorageCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize triggers")]
    Serialize(#[from] serde_json::Error),

    #[error("trigger file I/O failed")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TriggerError>;
