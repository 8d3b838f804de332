use seal_types::{BlobId, TypeError};

/// Errors from blob and stamp store operations.
///
/// A missing record is not an error: lookups return `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The embedded database could not be opened, read or written.
    #[error("storage failure: {0}")]
    Storage(String),

    /// I/O error from the filesystem (data directory, legacy files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A row exists but its columns cannot be decoded.
    #[error("corrupt record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    /// An imported blob id is already taken by different contents.
    #[error("blob {0} already exists with different contents")]
    Conflict(BlobId),

    /// Invalid identifier or design handed to the store.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Store configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
