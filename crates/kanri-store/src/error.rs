use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Backend(String),
    #[error("record not found: {0}")]
    RecordNotFound(String),
    #[error("stored document is corrupt: {0}")]
    Decode(String),
    #[error("document encode error: {0}")]
    Encode(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub(crate) fn backend<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Backend(e.to_string())
}

pub(crate) fn decode<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Decode(e.to_string())
}

pub(crate) fn encode<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Encode(e.to_string())
}
