//! Session-oriented SMTP client.
//!
//! Issues the ordered command sequence of one outbound mail transaction:
//! greeting, EHLO, optional STARTTLS, AUTH, MAIL FROM, RCPT TO, DATA,
//! message bytes, QUIT. SMTP is half-duplex; every command waits for its
//! reply before the next is written.

use super::{ServerInfo, SmtpStream};
use crate::auth::{Mechanism, ServerIdentity};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::reply::{Reply, ReplyCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

/// Hostname announced in EHLO. Relays identify the client by its address;
/// the literal name is only a greeting.
const LOCAL_NAME: &str = "localhost";

/// SMTP client over an established stream.
#[derive(Debug)]
pub struct SmtpClient {
    stream: SmtpStream,
    server: ServerInfo,
    host: String,
}

impl SmtpClient {
    /// Performs the opening handshake on a fresh stream: reads the 220
    /// greeting and sends EHLO. `host` is the name the session was dialed
    /// against; it becomes the authentication target.
    ///
    /// # Errors
    ///
    /// Returns an error if the greeting or EHLO fails.
    pub async fn handshake(mut stream: SmtpStream, host: impl Into<String>) -> Result<Self> {
        let greeting = Self::read_reply(&mut stream).await?;
        if !greeting.is_success() {
            return Err(Error::smtp_error(
                greeting.code.as_u16(),
                greeting.message_text(),
            ));
        }

        let hostname = greeting
            .message
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();

        let mut client = Self {
            stream,
            server: ServerInfo {
                hostname,
                extensions: std::collections::HashSet::new(),
            },
            host: host.into(),
        };
        client.ehlo().await?;
        debug!(server = %client.server.hostname, "SMTP session established");
        Ok(client)
    }

    /// Upgrades the connection with STARTTLS and repeats EHLO.
    ///
    /// # Errors
    ///
    /// Returns an error if STARTTLS is not advertised or the upgrade fails.
    pub async fn starttls(mut self) -> Result<Self> {
        if !self.server.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS".into()));
        }

        let reply = self.send_command(Command::StartTls).await?;
        if !reply.is_success() {
            return Err(Error::smtp_error(reply.code.as_u16(), reply.message_text()));
        }

        self.stream = self.stream.upgrade_to_tls(&self.host).await?;
        debug!(host = %self.host, "connection upgraded to TLS");

        // Capabilities may differ after the upgrade.
        self.ehlo().await?;
        Ok(self)
    }

    /// Returns the discovered server capabilities.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server
    }

    /// Runs the SASL exchange with the given mechanism.
    ///
    /// The mechanism validates the server identity and produces responses;
    /// this method frames them: `AUTH <name> <initial>`, then one
    /// base64-encoded response per 334 challenge.
    ///
    /// # Errors
    ///
    /// Returns an error if the mechanism refuses to start or the server
    /// rejects the credentials.
    pub async fn auth(&mut self, mechanism: &mut dyn Mechanism) -> Result<()> {
        let identity = ServerIdentity {
            name: self.host.clone(),
            tls: self.stream.is_tls(),
        };
        let initial = mechanism.start(&identity)?;

        let cmd = Command::Auth {
            mechanism: initial.mechanism,
            initial_response: Some(STANDARD.encode(&initial.response)),
        };
        let mut reply = self.send_command(cmd).await?;

        while reply.code == ReplyCode::AUTH_CONTINUE {
            let challenge = STANDARD
                .decode(reply.message_text().trim())
                .map_err(|e| Error::Auth(format!("invalid server challenge: {e}")))?;
            let response = mechanism.next(&challenge, true)?;
            self.stream.write_all(STANDARD.encode(&response).as_bytes()).await?;
            self.stream.write_all(b"\r\n").await?;
            reply = Self::read_reply(&mut self.stream).await?;
        }

        if !reply.is_success() {
            return Err(Error::smtp_error(reply.code.as_u16(), reply.message_text()));
        }
        // Drive the mechanism to its terminal state.
        mechanism.next(&[], false)?;
        Ok(())
    }

    /// Issues MAIL FROM.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the sender.
    pub async fn mail(&mut self, from: &str) -> Result<()> {
        self.expect_success(Command::MailFrom { from: from.to_string() })
            .await
    }

    /// Issues RCPT TO for one recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the recipient.
    pub async fn rcpt(&mut self, to: &str) -> Result<()> {
        self.expect_success(Command::RcptTo { to: to.to_string() }).await
    }

    /// Issues DATA and waits for the 354 go-ahead.
    ///
    /// # Errors
    ///
    /// Returns an error if the server refuses to accept message data.
    pub async fn data(&mut self) -> Result<()> {
        let reply = self.send_command(Command::Data).await?;
        if reply.code != ReplyCode::START_DATA {
            return Err(Error::smtp_error(reply.code.as_u16(), reply.message_text()));
        }
        Ok(())
    }

    /// Streams message bytes into the open data sink.
    ///
    /// Line endings are normalized to CRLF and lines starting with `.` are
    /// byte-stuffed. Must be called between [`Self::data`] and
    /// [`Self::end_data`].
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails partway.
    pub async fn write_body(&mut self, message: &[u8]) -> Result<()> {
        let mut lines = message.split(|&b| b == b'\n').peekable();
        while let Some(line) = lines.next() {
            let line = line.strip_suffix(b"\r").unwrap_or(line);

            // A trailing newline terminates the last line; it does not
            // open an extra blank one.
            if lines.peek().is_none() && line.is_empty() {
                break;
            }

            if line.first() == Some(&b'.') {
                self.stream.write_all(b".").await?;
            }
            self.stream.write_all(line).await?;
            self.stream.write_all(b"\r\n").await?;
        }
        Ok(())
    }

    /// Terminates the data sink with the `.` line and reads the verdict.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the message.
    pub async fn end_data(&mut self) -> Result<()> {
        self.stream.write_all(b".\r\n").await?;
        let reply = Self::read_reply(&mut self.stream).await?;
        if !reply.is_success() {
            return Err(Error::smtp_error(reply.code.as_u16(), reply.message_text()));
        }
        Ok(())
    }

    /// Sends QUIT. A successful QUIT also terminates the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT command fails.
    pub async fn quit(&mut self) -> Result<()> {
        let reply = self.send_command(Command::Quit).await?;
        if !reply.is_success() {
            return Err(Error::smtp_error(reply.code.as_u16(), reply.message_text()));
        }
        Ok(())
    }

    /// Shuts the connection down without the QUIT exchange.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket shutdown fails.
    pub async fn close(&mut self) -> Result<()> {
        self.stream.shutdown().await
    }

    async fn ehlo(&mut self) -> Result<()> {
        let cmd = Command::Ehlo {
            hostname: LOCAL_NAME.to_string(),
        };
        let reply = self.send_command(cmd).await?;
        if !reply.is_success() {
            return Err(Error::smtp_error(reply.code.as_u16(), reply.message_text()));
        }

        // First line repeats the greeting; the rest are extension keywords
        // with optional parameters.
        self.server.extensions = reply
            .message
            .iter()
            .skip(1)
            .filter_map(|line| line.split_whitespace().next())
            .map(str::to_uppercase)
            .collect();
        Ok(())
    }

    async fn expect_success(&mut self, cmd: Command) -> Result<()> {
        let reply = self.send_command(cmd).await?;
        if !reply.is_success() {
            return Err(Error::smtp_error(reply.code.as_u16(), reply.message_text()));
        }
        Ok(())
    }

    async fn send_command(&mut self, cmd: Command) -> Result<Reply> {
        self.stream.write_all(&cmd.serialize()).await?;
        Self::read_reply(&mut self.stream).await
    }

    async fn read_reply(stream: &mut SmtpStream) -> Result<Reply> {
        let mut lines = Vec::new();
        loop {
            let line = stream.read_line().await?;
            if line.is_empty() {
                continue;
            }

            let is_last = is_last_reply_line(&line);
            lines.push(line);

            if is_last {
                break;
            }
        }

        parse_reply(&lines)
    }
}
