//! Error types for the bandlimit crate.

use std::fmt;

/// Errors that can occur while converting a file or buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResampleError {
    /// Wrong command-line usage.
    Usage(String),
    /// Sample rate missing, zero, unparsable, or out of range.
    InvalidRate(String),
    /// Malformed or unsupported audio data or container.
    InvalidFormat(String),
    /// I/O error.
    IoError(String),
    /// A working buffer could not be allocated.
    Allocation { requested: usize },
}

impl fmt::Display for ResampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResampleError::Usage(msg) => write!(f, "usage: {}", msg),
            ResampleError::InvalidRate(msg) => write!(f, "rate is {}", msg),
            ResampleError::InvalidFormat(msg) => write!(f, "invalid format: {}", msg),
            ResampleError::IoError(msg) => write!(f, "I/O error: {}", msg),
            ResampleError::Allocation { requested } => {
                write!(f, "allocation failed: {} elements requested", requested)
            }
        }
    }
}

impl std::error::Error for ResampleError {}

impl From<std::io::Error> for ResampleError {
    fn from(err: std::io::Error) -> Self {
        ResampleError::IoError(err.to_string())
    }
}
