//! Error types for disk image access.

use std::io;
use thiserror;

/// Represents errors that can occur while accessing the mapped image.
#[derive(thiserror::Error, Debug)]
pub enum ImageError {
    /// Wraps an I/O error raised while opening, mapping or flushing the image.
    #[error("I/O error: {0}")]
    Io(io::Error),
    /// An access would reach past the end of the image.
    #[error("Access of {len} bytes at offset {offset} is out of the image bounds ({size} bytes)")]
    OutOfBounds { offset: u64, len: u64, size: u64 },
}

/// Converts standard I/O errors into ImageError.
impl From<io::Error> for ImageError {
    fn from(err: io::Error) -> Self {
        ImageError::Io(err)
    }
}
