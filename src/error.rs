//! Error types for the overlay pipeline

use thiserror::Error;

/// Errors raised while setting up the overlay pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    /// The analyzed frame reported a zero-sized resolution.
    ///
    /// Indicates a bug in the camera/environment layer; the transform
    /// would otherwise divide by zero.
    #[error("invalid detection frame resolution {width}x{height}")]
    InvalidFrameResolution { width: u32, height: u32 },
}

pub type OverlayResult<T> = Result<T, OverlayError>;
