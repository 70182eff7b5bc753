//! Error types for the send pipeline.

/// Result type alias for send operations.
pub type Result<T> = std::result::Result<T, SendError>;

/// Terminal failures of a single send. None of these are retried
/// internally; each names the point in the session where the attempt
/// stopped and carries enough context to diagnose it without the session
/// log.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// Could not establish the SMTP session.
    #[error("failed to make smtp client for {host}:{port}: {source}")]
    Dial {
        /// Relay host.
        host: String,
        /// Relay port.
        port: u16,
        /// Underlying transport or protocol error.
        source: mailout_smtp::Error,
    },

    /// The server rejected the credentials or the handshake failed.
    #[error("failed to auth to smtp {host}:{port}: {source}")]
    Auth {
        /// Relay host.
        host: String,
        /// Relay port.
        port: u16,
        /// Underlying error.
        source: mailout_smtp::Error,
    },

    /// MAIL FROM was rejected.
    #[error("bad from address {from:?}: {source}")]
    BadFrom {
        /// The rejected sender address.
        from: String,
        /// Underlying error.
        source: mailout_smtp::Error,
    },

    /// RCPT TO was rejected. Recipients are attempted in order and the
    /// first rejection aborts the send.
    #[error("bad to address {to:?}: {source}")]
    BadTo {
        /// Full recipient list of the aborted message.
        to: Vec<String>,
        /// The address the server rejected.
        rejected: String,
        /// Underlying error.
        source: mailout_smtp::Error,
    },

    /// DATA was refused; no message bytes were written.
    #[error("can't make email writer: {source}")]
    DataOpen {
        /// Underlying error.
        source: mailout_smtp::Error,
    },

    /// Message assembly failed before anything reached the sink.
    #[error("can't make email message: {source}")]
    MessageBuild {
        /// Underlying builder error.
        #[from]
        source: mailout_mime::Error,
    },

    /// Writing the message body to the open data sink failed partway.
    #[error("failed to send email body to {to:?}: {source}")]
    BodyWrite {
        /// Full recipient list of the aborted message.
        to: Vec<String>,
        /// Underlying error.
        source: mailout_smtp::Error,
    },
}
