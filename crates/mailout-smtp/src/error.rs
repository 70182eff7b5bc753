//! Error types for SMTP operations.

use std::io;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TLS error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Dial did not complete within the configured timeout.
    #[error("timeout connecting to {0}")]
    Timeout(String),

    /// Server returned error response.
    #[error("SMTP error {code}: {message}")]
    SmtpError {
        /// Reply code (e.g., 550).
        code: u16,
        /// Error message from server.
        message: String,
    },

    /// Protocol error (unexpected response).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Feature not supported by server.
    #[error("server does not support {0}")]
    NotSupported(String),

    /// Refusing to send credentials over an unencrypted connection to a
    /// non-loopback host.
    #[error("unencrypted connection")]
    UnencryptedConnection,

    /// The server identifies as a different host than the credentials were
    /// configured for.
    #[error("wrong host name")]
    WrongHost,

    /// Authentication handshake error.
    #[error("authentication error: {0}")]
    Auth(String),
}

impl Error {
    /// Creates an SMTP error from a reply code and message.
    #[must_use]
    pub fn smtp_error(code: u16, message: impl Into<String>) -> Self {
        Self::SmtpError {
            code,
            message: message.into(),
        }
    }
}
