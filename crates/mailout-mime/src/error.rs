//! Error types for MIME generation.

use std::path::PathBuf;
use std::string::FromUtf8Error;

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Attachment file could not be opened or fully read.
    #[error("failed to read attachment {path:?}: {source}")]
    AttachmentRead {
        /// Path of the offending attachment.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Attachment content type could not be determined from file bytes.
    #[error("failed to sniff content type of {path:?}")]
    ContentSniff {
        /// Path of the offending attachment.
        path: PathBuf,
    },

    /// Invalid encoding.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Base64 decode error.
    #[error("base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// UTF-8 decode error.
    #[error("UTF-8 decode error: {0}")]
    Utf8Decode(#[from] FromUtf8Error),
}
