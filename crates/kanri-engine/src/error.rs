use thiserror::Error;

use kanri_core::CoreError;

/// The four caller-visible failure kinds, kept distinct so the API layer
/// can map them to 400/404/403 without inspecting messages. Notification
/// failures never appear here; the dispatcher swallows them.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("change request not found")]
    NotFound,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("file exceeds upload limit: {size} bytes (max {max})")]
    UploadTooLarge { size: u64, max: u64 },
    #[error("upload failed: {0}")]
    Upload(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("store error: {0}")]
    Store(#[from] kanri_store::StoreError),
}

impl From<CoreError> for EngineError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidRecordId(msg) => EngineError::InvalidId(msg),
            CoreError::Validation(msg) => EngineError::Validation(msg),
        }
    }
}
