//! Error types for orofacial-core.

use thiserror::Error;

/// Result type alias for orofacial operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for mask and tip operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The mask has no foreground pixels, so no centroid exists.
    #[error("mask has no foreground pixels")]
    EmptyMask,

    /// An argument is degenerate (zero-length direction, bad parameter).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Buffer length does not match the declared mask dimensions.
    #[error("mask buffer has {actual} cells, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Pixel coordinate outside the mask extent.
    #[error("pixel ({x}, {y}) outside {width}x{height} mask")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}
