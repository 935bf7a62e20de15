/// Error types for inference invocations
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Provider(String),

    #[error("{0}")]
    MalformedResponse(String),

    #[error("{0}")]
    Timeout(String),

    #[error("Unsupported image input: {0}")]
    UnsupportedImage(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, InferenceError>;
