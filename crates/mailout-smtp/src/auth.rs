//! SASL authentication mechanisms.
//!
//! A mechanism is a small challenge-response state machine driven by the
//! client's AUTH exchange: [`Mechanism::start`] yields the mechanism name
//! and initial response, [`Mechanism::next`] answers each server challenge.
//! Acceptance or rejection is reported by the AUTH command's final reply,
//! not by the mechanism itself.

use crate::error::{Error, Result};

/// What the client knows about the server when authentication starts.
#[derive(Debug, Clone)]
pub struct ServerIdentity {
    /// Host name the session was established against.
    pub name: String,
    /// Whether the transport is encrypted.
    pub tls: bool,
}

/// Mechanism name plus the initial SASL response.
#[derive(Debug, Clone)]
pub struct Initial {
    /// Mechanism identifier sent with the AUTH command.
    pub mechanism: &'static str,
    /// Raw initial response bytes (base64-encoded by the client).
    pub response: Vec<u8>,
}

/// A SASL client mechanism.
pub trait Mechanism: Send {
    /// Begins the exchange, validating the server identity first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnencryptedConnection`] when credentials would be
    /// sent in the clear to a non-loopback host, and [`Error::WrongHost`]
    /// when the server is not the host the mechanism was configured for.
    /// In both cases no credential bytes are produced.
    fn start(&mut self, server: &ServerIdentity) -> Result<Initial>;

    /// Answers a server challenge. `more` is false once the server has
    /// sent its final reply; the returned response is then empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the challenge is unexpected for this mechanism.
    fn next(&mut self, challenge: &[u8], more: bool) -> Result<Vec<u8>>;
}

fn is_loopback(name: &str) -> bool {
    name == "localhost" || name == "127.0.0.1" || name == "::1"
}

fn check_server(server: &ServerIdentity, host: &str) -> Result<()> {
    if !server.tls && !is_loopback(&server.name) {
        return Err(Error::UnencryptedConnection);
    }
    if server.name != host {
        return Err(Error::WrongHost);
    }
    Ok(())
}

/// AUTH PLAIN (RFC 4616): single `\0user\0pass` response.
#[derive(Debug)]
pub struct Plain {
    username: String,
    password: String,
    host: String,
}

impl Plain {
    /// Creates a PLAIN mechanism bound to the given host.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            host: host.into(),
        }
    }
}

impl Mechanism for Plain {
    fn start(&mut self, server: &ServerIdentity) -> Result<Initial> {
        check_server(server, &self.host)?;
        let mut response = Vec::with_capacity(self.username.len() + self.password.len() + 2);
        response.push(0);
        response.extend_from_slice(self.username.as_bytes());
        response.push(0);
        response.extend_from_slice(self.password.as_bytes());
        Ok(Initial {
            mechanism: "PLAIN",
            response,
        })
    }

    fn next(&mut self, _challenge: &[u8], more: bool) -> Result<Vec<u8>> {
        if more {
            // PLAIN is a single-shot mechanism.
            return Err(Error::Auth("unexpected server challenge".to_string()));
        }
        Ok(Vec::new())
    }
}

/// AUTH LOGIN: obsolete but still required by some relays (e.g. Office 365).
///
/// Strict 3-message exchange: client sends the username as the initial
/// response, the server challenges for the password, the client sends it.
#[derive(Debug)]
pub struct Login {
    username: String,
    password: String,
    host: String,
    state: LoginState,
}

/// LOGIN exchange state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginState {
    /// Username sent, waiting for the server to request the password.
    AwaitingUsernameAck,
    /// Password sent, waiting for the final verdict.
    AwaitingPasswordAck,
    /// Exchange complete.
    Done,
}

impl Login {
    /// Creates a LOGIN mechanism bound to the given host.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            host: host.into(),
            state: LoginState::AwaitingUsernameAck,
        }
    }
}

impl Mechanism for Login {
    fn start(&mut self, server: &ServerIdentity) -> Result<Initial> {
        check_server(server, &self.host)?;
        self.state = LoginState::AwaitingUsernameAck;
        Ok(Initial {
            mechanism: "LOGIN",
            response: self.username.clone().into_bytes(),
        })
    }

    fn next(&mut self, _challenge: &[u8], more: bool) -> Result<Vec<u8>> {
        if !more {
            self.state = LoginState::Done;
            return Ok(Vec::new());
        }
        match self.state {
            LoginState::AwaitingUsernameAck => {
                self.state = LoginState::AwaitingPasswordAck;
                Ok(self.password.clone().into_bytes())
            }
            LoginState::AwaitingPasswordAck | LoginState::Done => {
                Err(Error::Auth("unexpected server challenge".to_string()))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tls_server(name: &str) -> ServerIdentity {
        ServerIdentity {
            name: name.to_string(),
            tls: true,
        }
    }

    fn plain_server(name: &str) -> ServerIdentity {
        ServerIdentity {
            name: name.to_string(),
            tls: false,
        }
    }

    #[test]
    fn login_full_exchange() {
        let mut auth = Login::new("user", "password", "servername");

        let initial = auth.start(&tls_server("servername")).unwrap();
        assert_eq!(initial.mechanism, "LOGIN");
        assert_eq!(initial.response, b"user");

        let resp = auth.next(b"Password:", true).unwrap();
        assert_eq!(resp, b"password");

        let resp = auth.next(&[], false).unwrap();
        assert!(resp.is_empty());
    }

    #[test]
    fn login_rejects_extra_challenge() {
        let mut auth = Login::new("user", "password", "servername");
        auth.start(&tls_server("servername")).unwrap();
        auth.next(b"Password:", true).unwrap();
        assert!(auth.next(b"again?", true).is_err());
    }

    #[test]
    fn login_refuses_unencrypted_non_loopback() {
        let mut auth = Login::new("foo", "bar", "mail.example.com");
        let err = auth.start(&plain_server("mail.example.com")).unwrap_err();
        assert!(matches!(err, Error::UnencryptedConnection));
        assert_eq!(err.to_string(), "unencrypted connection");
    }

    #[test]
    fn login_allows_unencrypted_loopback() {
        for name in ["localhost", "127.0.0.1", "::1"] {
            let mut auth = Login::new("foo", "bar", name);
            assert!(auth.start(&plain_server(name)).is_ok(), "{name}");
        }
    }

    #[test]
    fn login_refuses_wrong_host() {
        let mut auth = Login::new("foo", "bar", "servername");
        let err = auth.start(&tls_server("hacker")).unwrap_err();
        assert!(matches!(err, Error::WrongHost));
    }

    #[test]
    fn plain_initial_response_layout() {
        let mut auth = Plain::new("admin", "secret", "servername");
        let initial = auth.start(&tls_server("servername")).unwrap();
        assert_eq!(initial.mechanism, "PLAIN");
        assert_eq!(initial.response, b"\0admin\0secret");
    }

    #[test]
    fn plain_refuses_unencrypted_non_loopback() {
        let mut auth = Plain::new("foo", "bar", "mail.example.com");
        let err = auth.start(&plain_server("mail.example.com")).unwrap_err();
        assert!(matches!(err, Error::UnencryptedConnection));
    }

    #[test]
    fn plain_rejects_challenge() {
        let mut auth = Plain::new("foo", "bar", "servername");
        auth.start(&tls_server("servername")).unwrap();
        assert!(auth.next(b"?", true).is_err());
        assert!(auth.next(&[], false).unwrap().is_empty());
    }
}
