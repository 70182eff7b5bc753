//! The wire-client seam between the orchestrator and the protocol crate.

use async_trait::async_trait;
use mailout_smtp::auth::Mechanism;
use mailout_smtp::{Result, SmtpClient};

/// The session operations the orchestrator drives, in the order a send
/// uses them. Implemented by [`SmtpClient`]; substituted with a recording
/// double in tests.
#[async_trait]
pub trait WireClient: Send {
    /// Runs the SASL exchange.
    async fn auth(&mut self, mechanism: &mut dyn Mechanism) -> Result<()>;
    /// Issues MAIL FROM.
    async fn mail(&mut self, from: &str) -> Result<()>;
    /// Issues RCPT TO.
    async fn rcpt(&mut self, to: &str) -> Result<()>;
    /// Opens the data sink (DATA, expect 354).
    async fn data(&mut self) -> Result<()>;
    /// Streams message bytes into the open sink.
    async fn write_body(&mut self, message: &[u8]) -> Result<()>;
    /// Terminates the sink and reads the server's verdict.
    async fn end_data(&mut self) -> Result<()>;
    /// Sends QUIT. Success also terminates the connection.
    async fn quit(&mut self) -> Result<()>;
    /// Tears the connection down without QUIT.
    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
impl WireClient for SmtpClient {
    async fn auth(&mut self, mechanism: &mut dyn Mechanism) -> Result<()> {
        Self::auth(self, mechanism).await
    }

    async fn mail(&mut self, from: &str) -> Result<()> {
        Self::mail(self, from).await
    }

    async fn rcpt(&mut self, to: &str) -> Result<()> {
        Self::rcpt(self, to).await
    }

    async fn data(&mut self) -> Result<()> {
        Self::data(self).await
    }

    async fn write_body(&mut self, message: &[u8]) -> Result<()> {
        Self::write_body(self, message).await
    }

    async fn end_data(&mut self) -> Result<()> {
        Self::end_data(self).await
    }

    async fn quit(&mut self) -> Result<()> {
        Self::quit(self).await
    }

    async fn close(&mut self) -> Result<()> {
        Self::close(self).await
    }
}
