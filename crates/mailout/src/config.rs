//! Sender configuration.

use std::fmt;
use std::time::Duration;

/// Default SMTP port (cleartext submission).
pub const DEFAULT_PORT: u16 = 25;

/// Default dial timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default body content type.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Default body charset.
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Transport encryption mode for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encryption {
    /// Plain TCP, no encryption.
    #[default]
    None,
    /// Plain TCP upgraded with STARTTLS after the greeting.
    StartTls,
    /// TLS from the first byte (port 465 style).
    Implicit,
}

/// SASL mechanism used when credentials are configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMechanism {
    /// AUTH PLAIN (RFC 4616), the default.
    #[default]
    Plain,
    /// AUTH LOGIN, for relays that accept nothing else.
    Login,
}

/// SMTP credentials. Authentication runs only when both fields are
/// non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login username.
    pub username: String,
    /// Login password.
    pub password: String,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub(crate) fn is_usable(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

// Manual impl keeps the password out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Connection and message defaults for a [`crate::Sender`].
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// Relay host name. Also the target the auth mechanisms are bound to.
    pub host: String,
    /// Relay port.
    pub port: u16,
    /// Transport encryption mode.
    pub encryption: Encryption,
    /// Optional credentials; no AUTH command is sent without them.
    pub credentials: Option<Credentials>,
    /// Mechanism used when credentials are set.
    pub auth_mechanism: AuthMechanism,
    /// Body content type. An empty string omits the MIME headers from
    /// plain messages.
    pub content_type: String,
    /// Body charset.
    pub charset: String,
    /// Bounds the TCP dial only; established sessions are not timed out.
    pub timeout: Duration,
}

impl SenderConfig {
    /// Starts a builder for the given relay host.
    pub fn builder(host: impl Into<String>) -> SenderConfigBuilder {
        SenderConfigBuilder {
            config: Self {
                host: host.into(),
                port: DEFAULT_PORT,
                encryption: Encryption::default(),
                credentials: None,
                auth_mechanism: AuthMechanism::default(),
                content_type: DEFAULT_CONTENT_TYPE.to_string(),
                charset: DEFAULT_CHARSET.to_string(),
                timeout: DEFAULT_TIMEOUT,
            },
        }
    }
}

/// Builder for [`SenderConfig`].
#[derive(Debug, Clone)]
pub struct SenderConfigBuilder {
    config: SenderConfig,
}

impl SenderConfigBuilder {
    /// Sets the relay port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets the transport encryption mode.
    #[must_use]
    pub const fn encryption(mut self, encryption: Encryption) -> Self {
        self.config.encryption = encryption;
        self
    }

    /// Sets the credentials used for AUTH.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Some(Credentials::new(username, password));
        self
    }

    /// Selects the SASL mechanism.
    #[must_use]
    pub const fn auth_mechanism(mut self, mechanism: AuthMechanism) -> Self {
        self.config.auth_mechanism = mechanism;
        self
    }

    /// Sets the body content type. Pass an empty string to omit the MIME
    /// headers from plain messages.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.config.content_type = content_type.into();
        self
    }

    /// Sets the body charset.
    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.config.charset = charset.into();
        self
    }

    /// Sets the dial timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Finishes the builder.
    #[must_use]
    pub fn build(self) -> SenderConfig {
        self.config
    }
}
