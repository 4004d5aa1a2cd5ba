use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Connectivity failure, timeout, or a non-success status from the API.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The API answered but the payload did not match the expected shape.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] tokio_rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
