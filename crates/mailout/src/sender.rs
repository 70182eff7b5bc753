//! The send lifecycle.
//!
//! One call to [`Sender::send`] is one SMTP session: dial (or borrow the
//! pre-supplied client), authenticate, MAIL FROM, RCPT TO per recipient,
//! DATA, stream the built message, QUIT. The connection is torn down on
//! every exit path; only a successful QUIT skips the explicit close.

use crate::clock::{Clock, SystemClock};
use crate::config::{AuthMechanism, Encryption, SenderConfig};
use crate::error::{Result, SendError};
use crate::wire::WireClient;
use mailout_mime::MessageBuilder;
use mailout_smtp::auth::{Login, Mechanism, Plain};
use mailout_smtp::{SmtpClient, connect, connect_tls};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Per-message delivery parameters.
#[derive(Debug, Clone, Default)]
pub struct SendParams {
    /// Envelope and header sender address.
    pub from: String,
    /// Recipients, in order. Empty means there is nothing to do and the
    /// send succeeds without touching the wire.
    pub to: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Files to attach, in order.
    pub attachments: Vec<PathBuf>,
}

/// Email sender bound to one relay.
///
/// Cheap to clone is not a goal; construct once and reuse. Independent
/// [`Sender::send`] calls each dial their own connection unless a shared
/// wire client was supplied, in which case sessions are serialized over it.
pub struct Sender {
    config: SenderConfig,
    clock: Arc<dyn Clock>,
    wire: Option<Arc<Mutex<Box<dyn WireClient>>>>,
}

impl std::fmt::Debug for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sender")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Sender {
    /// Creates a sender for the given relay configuration.
    #[must_use]
    pub fn new(config: SenderConfig) -> Self {
        debug!(
            host = %config.host,
            port = config.port,
            encryption = ?config.encryption,
            mechanism = ?config.auth_mechanism,
            username = config.credentials.as_ref().map(|c| c.username.as_str()),
            content_type = %config.content_type,
            charset = %config.charset,
            "sender created",
        );
        Self {
            config,
            clock: Arc::new(SystemClock),
            wire: None,
        }
    }

    /// Replaces the dialed connection with a pre-supplied wire client.
    ///
    /// All sessions then run over this client, one at a time.
    #[must_use]
    pub fn with_wire_client(mut self, client: Box<dyn WireClient>) -> Self {
        self.wire = Some(Arc::new(Mutex::new(client)));
        self
    }

    /// Replaces the wall clock used for the `Date` header.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sends one message.
    ///
    /// An empty recipient list is a successful no-op. Otherwise the full
    /// session runs; the first rejected command aborts the send and the
    /// connection is closed. QUIT and end-of-data failures are logged and
    /// swallowed, never failing an otherwise delivered message.
    ///
    /// # Errors
    ///
    /// Returns a [`SendError`] naming the step that failed: dial, auth,
    /// sender or recipient rejection, data-sink open, message assembly, or
    /// body write.
    pub async fn send(&self, text: &str, params: &SendParams) -> Result<()> {
        if params.to.is_empty() {
            debug!("no recipients, nothing to send");
            return Ok(());
        }
        debug!(from = %params.from, to = ?params.to, subject = %params.subject, "sending email");

        if let Some(shared) = &self.wire {
            let mut client = shared.lock().await;
            self.submit(client.as_mut(), text, params).await
        } else {
            let mut client = self.dial().await?;
            self.submit(&mut client, text, params).await
        }
    }

    /// Runs the transaction, then tears the session down: QUIT after
    /// success (falling back to close when QUIT fails), plain close after
    /// any error.
    async fn submit(
        &self,
        client: &mut dyn WireClient,
        text: &str,
        params: &SendParams,
    ) -> Result<()> {
        let outcome = self.transact(client, text, params).await;

        let mut quit = false;
        if outcome.is_ok() {
            match client.quit().await {
                Ok(()) => quit = true,
                Err(err) => warn!(
                    host = %self.config.host,
                    port = self.config.port,
                    error = %err,
                    "failed to send quit command",
                ),
            }
        }
        if !quit {
            if let Err(err) = client.close().await {
                warn!(error = %err, "can't close smtp connection");
            }
        }

        outcome
    }

    async fn transact(
        &self,
        client: &mut dyn WireClient,
        text: &str,
        params: &SendParams,
    ) -> Result<()> {
        if let Some(creds) = self.config.credentials.as_ref().filter(|c| c.is_usable()) {
            let mut mechanism: Box<dyn Mechanism> = match self.config.auth_mechanism {
                AuthMechanism::Plain => Box::new(Plain::new(
                    creds.username.clone(),
                    creds.password.clone(),
                    self.config.host.clone(),
                )),
                AuthMechanism::Login => Box::new(Login::new(
                    creds.username.clone(),
                    creds.password.clone(),
                    self.config.host.clone(),
                )),
            };
            client
                .auth(mechanism.as_mut())
                .await
                .map_err(|source| SendError::Auth {
                    host: self.config.host.clone(),
                    port: self.config.port,
                    source,
                })?;
        }

        client
            .mail(&params.from)
            .await
            .map_err(|source| SendError::BadFrom {
                from: params.from.clone(),
                source,
            })?;

        for rcpt in &params.to {
            client
                .rcpt(rcpt)
                .await
                .map_err(|source| SendError::BadTo {
                    to: params.to.clone(),
                    rejected: rcpt.clone(),
                    source,
                })?;
        }

        client
            .data()
            .await
            .map_err(|source| SendError::DataOpen { source })?;

        // Built only after the sink is open, but nothing is written until
        // the whole message assembled cleanly.
        let message = self.build_message(text, params)?;

        client
            .write_body(message.as_bytes())
            .await
            .map_err(|source| SendError::BodyWrite {
                to: params.to.clone(),
                source,
            })?;

        if let Err(err) = client.end_data().await {
            warn!(error = %err, "can't close smtp body writer");
        }

        Ok(())
    }

    fn build_message(&self, text: &str, params: &SendParams) -> Result<String> {
        let mut builder = MessageBuilder::new()
            .from(&params.from)
            .recipients(params.to.iter().cloned())
            .subject(&params.subject)
            .content_type(&self.config.content_type)
            .charset(&self.config.charset)
            .date(self.clock.now());
        for path in &params.attachments {
            builder = builder.attach(path);
        }
        Ok(builder.build(text)?)
    }

    async fn dial(&self) -> Result<SmtpClient> {
        let host = &self.config.host;
        let port = self.config.port;
        let timeout = self.config.timeout;

        let session = async {
            match self.config.encryption {
                Encryption::Implicit => {
                    let stream = connect_tls(host, port, timeout).await?;
                    SmtpClient::handshake(stream, host).await
                }
                Encryption::StartTls => {
                    let stream = connect(host, port, timeout).await?;
                    let client = SmtpClient::handshake(stream, host).await?;
                    client.starttls().await
                }
                Encryption::None => {
                    let stream = connect(host, port, timeout).await?;
                    SmtpClient::handshake(stream, host).await
                }
            }
        };

        session.await.map_err(|source| SendError::Dial {
            host: host.clone(),
            port,
            source,
        })
    }
}
