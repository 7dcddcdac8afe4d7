use thiserror::Error;

/// Failure taxonomy for the retrieval core.
///
/// Chunking is total over any string input and has no error variant.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Store operation failed: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, Error>;
