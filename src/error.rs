//! Error types for seekmap.

use std::io;
use thiserror::Error;

/// Result type for seekmap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for seekmap operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid MP4 file structure.
    #[error("Invalid MP4: {0}")]
    InvalidMp4(String),

    /// Missing required atom in MP4 file.
    #[error("Missing required atom: {0}")]
    MissingAtom(&'static str),
}

impl Error {
    /// Create an invalid MP4 error.
    pub fn invalid_mp4(msg: impl Into<String>) -> Self {
        Self::InvalidMp4(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_mp4("truncated moov");
        assert_eq!(err.to_string(), "Invalid MP4: truncated moov");

        let err = Error::MissingAtom("elst");
        assert_eq!(err.to_string(), "Missing required atom: elst");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "short read");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
    }
}
