use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// The template has none of the nodes the requested geometry attaches to.
    #[error("shape has no element named {0:?}")]
    MissingAnchor(String),

    #[error("invalid shape: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("upload failed: {0}")]
    Upload(String),
}

pub type RenderResult<T> = Result<T, RenderError>;
