use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No active identity")]
    Unauthenticated,

    #[error("Story not found: {0}")]
    NotFound(String),

    #[error("Story already deleted: {0}")]
    AlreadyDeleted(String),

    #[error("Transient remote failure: {0}")]
    Transient(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
