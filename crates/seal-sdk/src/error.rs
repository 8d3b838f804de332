use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("store error: {0}")]
    Store(#[from] seal_store::StoreError),

    #[error("type error: {0}")]
    Type(#[from] seal_types::TypeError),
}

pub type SdkResult<T> = Result<T, SdkError>;
