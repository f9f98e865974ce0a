use std::fmt;

use fen_vision_core::ImageBufferError;

/// Why no usable board region was found.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NoDetectionCause {
    /// The board detector returned no candidates.
    NoCandidates,
    /// The clamped rectangle collapsed to (almost) nothing.
    Degenerate { width: f32, height: f32 },
}

impl fmt::Display for NoDetectionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCandidates => write!(f, "no board candidates"),
            Self::Degenerate { width, height } => {
                write!(f, "crop rect too small after clamp ({width:.1}x{height:.1})")
            }
        }
    }
}

/// Errors returned by the region locator.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LocateError {
    #[error("no chessboard detected: {0}")]
    NoDetection(NoDetectionCause),
    #[error("output crop size must be at least 1 px")]
    EmptyOutput,
    #[error("invalid source image: {0}")]
    InvalidImage(#[from] ImageBufferError),
}
