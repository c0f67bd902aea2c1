//! Error types for seqconvert

use thiserror::Error;

/// Result type alias for seqconvert operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Main error type for seqconvert
#[derive(Error, Debug)]
pub enum ConvertError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse errors with a known line number
    #[error("{format} parse error at line {line}: {message}")]
    Parse {
        format: &'static str,
        line: usize,
        message: String,
    },

    /// Parse errors reported by a delegated parser without position information
    #[error("{format} parse error: {message}")]
    Malformed {
        format: &'static str,
        message: String,
    },

    /// Format name not known to the registry
    #[error("Unknown {kind} format: {name}. Valid formats: {supported}")]
    UnknownFormat {
        kind: &'static str,
        name: String,
        supported: String,
    },

    /// The target format cannot represent the data it was given
    #[error("Cannot write {format}: {message}")]
    Write {
        format: &'static str,
        message: String,
    },

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File not found errors
    #[error("File not found: {0}")]
    FileNotFound(String),
}

impl ConvertError {
    pub(crate) fn parse(format: &'static str, line: usize, message: impl Into<String>) -> Self {
        ConvertError::Parse {
            format,
            line,
            message: message.into(),
        }
    }

    pub(crate) fn write(format: &'static str, message: impl Into<String>) -> Self {
        ConvertError::Write {
            format,
            message: message.into(),
        }
    }
}
