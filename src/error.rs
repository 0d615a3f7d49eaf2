use thiserror::Error;

/// Top-level error type for the geoptics engine.
#[derive(Debug, Error)]
pub enum OpticsError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Region(#[from] RegionError),

    #[error(transparent)]
    Propagation(#[from] PropagationError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Errors related to geometric computations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors raised while building or querying a region boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegionError {
    #[error("region boundary has not been started")]
    NotStarted,

    #[error("region boundary is already closed")]
    AlreadyClosed,

    #[error("region boundary is not closed ({segments} segments)")]
    Unclosed { segments: usize },
}

/// Errors raised while propagating a ray.
///
/// These are recoverable: the ray keeps the parts computed so far.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropagationError {
    #[error("propagation limit exceeded after {parts} parts")]
    LimitExceeded { parts: usize },
}

/// Errors related to scene bookkeeping.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),
}

/// Convenience type alias for results using [`OpticsError`].
pub type Result<T> = std::result::Result<T, OpticsError>;
