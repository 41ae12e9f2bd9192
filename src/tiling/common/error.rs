use thiserror::Error;

#[derive(Error, Debug)]
pub enum TilingError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Failed to decode slide image: {0}")]
    DecodeFailure(String),

    #[error("Failed to write output: {0}")]
    IoFailure(String),

    #[error("No annotations found for slide: {0}")]
    EmptyAnnotationSet(String),

    #[error("Failed to load annotations: {0}")]
    AnnotationLoadError(String),

    #[error("No matching GeoJSON found for slide: {0}")]
    NoMatchingAnnotation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TilingError {
    /// Conditions the batch loop treats as a skip rather than a failure.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            TilingError::EmptyAnnotationSet(_) | TilingError::NoMatchingAnnotation(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TilingError>;
