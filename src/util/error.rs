//! Error types for sealscan.

use thiserror::Error;

/// Result alias for sealscan operations.
pub type SealScanResult<T> = std::result::Result<T, SealScanError>;

/// Errors raised when the engine cannot use the input it was given.
///
/// Missing templates and pages without detections are not errors; they are
/// reported as warnings and empty region lists respectively.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SealScanError {
    /// Width or height is zero or overflows the buffer arithmetic.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The backing buffer is shorter than the declared layout requires.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Row stride is shorter than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Template does not fit inside the searched image.
    #[error("template {tpl_width}x{tpl_height} larger than image {img_width}x{img_height}")]
    TemplateTooLarge {
        tpl_width: usize,
        tpl_height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Template cannot be correlated (for example a flat patch).
    #[error("degenerate template: {reason}")]
    DegenerateTemplate { reason: &'static str },
    /// Image decoding or encoding failed.
    #[error("image io error: {reason}")]
    ImageIo { reason: String },
}
