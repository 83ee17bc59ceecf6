use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot serialize order: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, Error>;
