//! Error types for the driver.

use core::fmt;

/// Failure of an operation which talks to the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// The display interface failed to transmit a command or data. The framebuffer is left
    /// unchanged, but the controller RAM may hold a partial frame until the next successful
    /// flush.
    Transfer(E),
    /// A command argument was outside the range accepted by the controller. Nothing was sent.
    InvalidArgument,
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::Transfer(e)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Transfer(e) => write!(f, "display transfer failed: {:?}", e),
            Error::InvalidArgument => f.write_str("command argument out of range"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Error<E> {}

/// A framebuffer or panel geometry which cannot be represented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GeometryError {
    /// The width does not fill a whole number of bytes per row at the given pixel depth.
    UnpackedWidth,
    /// The storage provided for the framebuffer is not exactly the size of the raster.
    StorageLength { expected: usize, actual: usize },
    /// The framebuffer pixel depth is not the controller's native 4 bits per pixel.
    UnsupportedDepth,
    /// The panel does not fit inside the controller RAM at the configured offset, or is not
    /// aligned to whole controller columns.
    OutOfRange,
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GeometryError::UnpackedWidth => {
                f.write_str("width is not a whole number of bytes per row")
            }
            GeometryError::StorageLength { expected, actual } => write!(
                f,
                "framebuffer storage is {} bytes, expected {}",
                actual, expected
            ),
            GeometryError::UnsupportedDepth => {
                f.write_str("controller requires 4 bits per pixel")
            }
            GeometryError::OutOfRange => f.write_str("panel does not fit controller RAM"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GeometryError {}
