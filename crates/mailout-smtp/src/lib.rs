//! SMTP client protocol implementation.
//!
//! Wire-level building blocks for submitting mail: connection
//! establishment (plain TCP, implicit TLS, or STARTTLS upgrade), reply
//! parsing, command serialization, and SASL authentication mechanisms.
//!
//! [`SmtpClient`] drives one session: handshake, optional TLS upgrade,
//! authentication, then the MAIL/RCPT/DATA transaction.

#![forbid(unsafe_code)]

pub mod auth;
pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod reply;

pub use connection::{ServerInfo, SmtpClient, SmtpStream, connect, connect_tls};
pub use error::{Error, Result};
