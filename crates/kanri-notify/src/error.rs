use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("mail delivery failed: {0}")]
    Mail(String),
    #[error("store error: {0}")]
    Store(#[from] kanri_store::StoreError),
}
