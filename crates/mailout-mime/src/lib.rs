//! # mailout-mime
//!
//! MIME message generation for outbound email.
//!
//! Serializes a header block, a quoted-printable text body, and optional
//! base64-encoded file attachments into the byte sequence an SMTP client
//! streams through the DATA command.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mailout_mime::MessageBuilder;
//!
//! # fn main() -> mailout_mime::Result<()> {
//! let message = MessageBuilder::new()
//!     .from("sender@example.com")
//!     .to("recipient@example.com")
//!     .subject("Hello")
//!     .content_type("text/plain")
//!     .attach("report.pdf")
//!     .build("Hello, World!\n")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`builder`]: message assembly and multipart framing
//! - [`encoding`]: Base64 and RFC 2045 quoted-printable transforms
//! - [`boundary`]: random multipart boundary tokens
//! - [`sniff`]: content-type detection from attachment bytes

#![forbid(unsafe_code)]

pub mod boundary;
pub mod builder;
pub mod encoding;
mod error;
pub mod sniff;

pub use builder::MessageBuilder;
pub use error::{Error, Result};
