//! Email sending client.
//!
//! Builds MIME messages (quoted-printable bodies, base64 attachments) and
//! delivers them over SMTP with optional TLS/STARTTLS and SASL
//! authentication. One [`Sender::send`] call is one complete SMTP session.
//!
//! ```no_run
//! use mailout::{Encryption, SendParams, Sender, SenderConfig};
//!
//! # async fn example() -> Result<(), mailout::SendError> {
//! let sender = Sender::new(
//!     SenderConfig::builder("smtp.example.com")
//!         .port(587)
//!         .encryption(Encryption::StartTls)
//!         .credentials("user@example.com", "secret")
//!         .build(),
//! );
//!
//! let params = SendParams {
//!     from: "user@example.com".to_string(),
//!     to: vec!["friend@example.com".to_string()],
//!     subject: "hello".to_string(),
//!     attachments: vec![],
//! };
//! sender.send("message text", &params).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Logging goes through `tracing`; without a subscriber installed it is
//! a no-op.

#![forbid(unsafe_code)]

pub mod clock;
pub mod config;
mod error;
mod sender;
pub mod wire;

pub use clock::{Clock, SystemClock};
pub use config::{AuthMechanism, Credentials, Encryption, SenderConfig, SenderConfigBuilder};
pub use error::{Result, SendError};
pub use sender::{SendParams, Sender};
pub use wire::WireClient;
