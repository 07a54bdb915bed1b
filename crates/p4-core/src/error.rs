use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Network failure, non-2xx status or an unusable body. Always retryable.
    #[error("Transient fetch failure: {0}")]
    Transient(String),

    #[error("Cannot render item {id}: {reason}")]
    Render { id: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transient(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
