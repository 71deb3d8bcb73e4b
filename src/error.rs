//! # Error Types
//!
//! Errors returned while encoding or rendering an Aztec symbol.

use thiserror::Error;

/// Main error type for aztecrust operations.
///
/// Ways to handle [`AztecError::CapacityExceeded`]:
///
/// - Lower the error correction percentage.
/// - Let the encoder pick the layer count (`layers = 0`) instead of forcing one.
/// - Shorten the payload.
#[derive(Debug, Error)]
pub enum AztecError {
    /// An argument is outside the range the symbology allows.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The stuffed data plus its check words does not fit in any allowed symbol.
    #[error("Data too large: {bits} bits needed, {capacity} bits available")]
    CapacityExceeded { bits: usize, capacity: usize },

    /// Image encoding error while rendering
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
