//! Error types for snap configuration.
//!
//! Indexing and querying never fail; only building an engine does.

/// Configuration errors raised when constructing a snap engine.
#[derive(Debug, thiserror::Error)]
pub enum SnapError {
    #[error("Both a feature collection and a vector source were configured; pick one")]
    ConflictingTargets,
    #[error("Neither a feature collection nor a vector source was configured")]
    MissingTarget,
    #[error("Pixel tolerance must be finite and non-negative, got: {0}")]
    InvalidTolerance(f64),
    #[error("Circle approximation needs at least 3 sides, got: {0}")]
    InvalidCircleSides(usize),
    #[error(transparent)]
    Config(#[from] serde_json::Error),
}

pub type Result<T, E = SnapError> = std::result::Result<T, E>;
