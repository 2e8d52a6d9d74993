use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("label {label} out of range for {classes} output units")]
    LabelOutOfRange { label: usize, classes: usize },
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("cannot normalize a vector whose sum is zero or not finite")]
    DegenerateNormalization,
    #[error("dataset error: {0}")]
    Dataset(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
