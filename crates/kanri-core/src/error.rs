use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid record id: {0}")]
    InvalidRecordId(String),
    #[error("validation failed: {0}")]
    Validation(String),
}
