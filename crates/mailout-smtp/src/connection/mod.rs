//! SMTP connection management.

mod client;
mod stream;

pub use client::SmtpClient;
pub use stream::{SmtpStream, connect, connect_tls};

use std::collections::HashSet;

/// Server capabilities discovered from the greeting and EHLO response.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// Server hostname from the greeting.
    pub hostname: String,
    /// Extension keywords advertised by EHLO, uppercased.
    pub extensions: HashSet<String>,
}

impl ServerInfo {
    /// Checks if the server advertises an extension keyword.
    #[must_use]
    pub fn supports(&self, keyword: &str) -> bool {
        self.extensions.contains(&keyword.to_uppercase())
    }

    /// Checks if STARTTLS is advertised.
    #[must_use]
    pub fn supports_starttls(&self) -> bool {
        self.supports("STARTTLS")
    }
}
