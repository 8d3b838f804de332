use thiserror::Error;

/// Errors produced by type operations.
///
/// Every variant is a caller bug (an argument that does not satisfy the
/// codec or identifier invariants); none of them is ever coerced silently.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("design too short: {dimensions}x{dimensions} grid needs {required} bits, got {available}")]
    DesignTooShort {
        dimensions: usize,
        required: usize,
        available: usize,
    },

    #[error("invalid design dimensions: {0}")]
    InvalidDimensions(usize),

    #[error("grid is not square: row {row} has {actual} cells, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("invalid design character {found:?} at position {position}")]
    InvalidDesignChar { position: usize, found: char },

    #[error("design string of length {0} is not a square grid")]
    NotSquare(usize),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
