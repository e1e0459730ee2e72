//! Error types for table construction and buffer grading.

use std::fmt;

/// Error type for building a [`ColorTable`](crate::ColorTable).
#[derive(Debug, Clone, PartialEq)]
pub enum TableError {
    /// Grid edge length was zero
    ZeroSize,
    /// `size^3` does not fit in `usize`
    TooLarge {
        /// Declared grid edge length
        size: usize,
    },
    /// Entry count does not match `size^3`
    EntryCount {
        /// Declared grid edge length
        size: usize,
        /// Number of entries supplied
        found: usize,
    },
    /// An entry contains NaN or infinity
    NonFinite {
        /// Flat index of the offending entry
        index: usize,
    },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::ZeroSize => write!(f, "table size must be at least 1"),
            TableError::TooLarge { size } => {
                write!(f, "table size {} is too large", size)
            }
            TableError::EntryCount { size, found } => match size.checked_pow(3) {
                Some(needed) => write!(
                    f,
                    "table of size {} needs {} entries, found {}",
                    size, needed, found
                ),
                None => write!(f, "table of size {} is too large, found {} entries", size, found),
            },
            TableError::NonFinite { index } => {
                write!(f, "table entry {} is not a finite number", index)
            }
        }
    }
}

impl std::error::Error for TableError {}

/// Error type for applying a [`Grade`](crate::Grade) to a pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum GradeError {
    /// Only 3 (RGB) and 4 (RGBA) channel layouts are supported
    UnsupportedChannels(usize),
    /// Buffer length is not a whole number of pixels
    TruncatedBuffer {
        /// Buffer length in bytes
        len: usize,
        /// Channels per pixel
        channels: usize,
    },
}

impl fmt::Display for GradeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradeError::UnsupportedChannels(n) => {
                write!(f, "unsupported channel count {} (expected 3 or 4)", n)
            }
            GradeError::TruncatedBuffer { len, channels } => write!(
                f,
                "buffer of {} bytes is not a multiple of {} channels",
                len, channels
            ),
        }
    }
}

impl std::error::Error for GradeError {}
