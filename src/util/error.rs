//! Error types for flcc.

use thiserror::Error;

/// Result alias for flcc operations.
pub type FlccResult<T> = std::result::Result<T, FlccError>;

/// Errors that can occur when computing local correlation coefficients.
///
/// All variants are raised at the call boundary, before any transform work.
/// Flat (zero-variance) windows are not errors; they score `0`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlccError {
    /// Ranks differ, the needle does not fit the haystack, or a session
    /// received a needle of the wrong shape.
    #[error("shape mismatch: {reason} (expected {expected:?}, got {got:?})")]
    ShapeMismatch {
        reason: &'static str,
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    /// The tensor has no axes or a zero extent on some axis.
    #[error("empty input: shape {shape:?} has no elements")]
    EmptyInput { shape: Vec<usize> },
    /// The backing buffer does not hold exactly one element per index.
    #[error("buffer length {got} does not match shape {shape:?} ({needed} elements)")]
    LengthMismatch {
        shape: Vec<usize>,
        needed: usize,
        got: usize,
    },
    /// The element count of a shape overflows `usize`.
    #[error("invalid dimensions: {shape:?}")]
    InvalidDimensions { shape: Vec<usize> },
    /// A view window does not lie inside its parent tensor.
    #[error("window at {origin:?} with shape {shape:?} exceeds bounds {bounds:?}")]
    RoiOutOfBounds {
        origin: Vec<usize>,
        shape: Vec<usize>,
        bounds: Vec<usize>,
    },
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}
