//! Error types for vhsdepth.

use thiserror::Error;

/// Errors raised while building a [`DepthMap`](crate::DepthMap).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DepthMapError {
    /// The map has zero width or height.
    #[error("depth map must not be empty ({width}x{height})")]
    Empty { width: u32, height: u32 },

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A sample is NaN or infinite.
    #[error("depth sample {index} is not finite")]
    NonFinite { index: usize },

    /// A normalized sample lies outside `[0, 1]`.
    #[error("depth sample {index} = {value} lies outside [0, 1]")]
    OutOfRange { index: usize, value: f32 },
}

/// Failure reported by a depth estimation collaborator.
#[derive(Error, Debug)]
pub enum EstimationError {
    /// No estimator could be initialized.
    #[error("no depth estimator available: {0}")]
    Unavailable(String),

    /// The estimator was asked to run before initialization.
    #[error("depth estimator '{0}' not initialized")]
    NotInitialized(String),

    /// Inference failed.
    #[error("depth estimation failed: {0}")]
    Failed(String),

    /// The estimator produced an unusable map.
    #[error("invalid depth map: {0}")]
    InvalidOutput(#[from] DepthMapError),
}

/// Failure reported by an image acquisition collaborator.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file could not be decoded as an image.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// Pixel buffer does not match the declared dimensions.
    #[error("image buffer size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// The image has zero width or height.
    #[error("image must not be empty")]
    Empty,
}

/// The main error type for vhsdepth operations.
#[derive(Error, Debug)]
pub enum VhsDepthError {
    /// Depth map construction failed.
    #[error(transparent)]
    DepthMap(#[from] DepthMapError),

    /// Depth estimation failed.
    #[error(transparent)]
    Estimation(#[from] EstimationError),

    /// Image acquisition failed.
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    /// Rendering error.
    #[error("render error: {0}")]
    RenderError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for vhsdepth operations.
pub type Result<T> = std::result::Result<T, VhsDepthError>;
