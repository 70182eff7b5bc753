//! Integration tests for the SMTP client.
//!
//! Each test runs one session against a scripted server on a localhost
//! socket, so the whole stack below the client (stream, parser, command
//! serialization, SASL framing) is exercised over real I/O.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio_test::assert_ok;

use mailout_smtp::auth::{Login, Plain};
use mailout_smtp::{Error, SmtpClient, connect};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Accepts one connection and plays the server side of a session.
/// Returns every command line received and the DATA payload lines.
async fn run_server(listener: TcpListener, rcpt_reply: &'static str) -> (Vec<String>, Vec<String>) {
    let (stream, _) = listener.accept().await.unwrap();
    let mut reader = BufReader::new(stream);
    let mut commands = Vec::new();
    let mut data_lines = Vec::new();
    let mut awaiting_auth_response = false;

    reader
        .get_mut()
        .write_all(b"220 mail.test ESMTP ready\r\n")
        .await
        .unwrap();

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await.unwrap() == 0 {
            break;
        }
        let cmd = line.trim_end().to_string();
        commands.push(cmd.clone());

        if awaiting_auth_response {
            awaiting_auth_response = false;
            reader
                .get_mut()
                .write_all(b"235 2.7.0 accepted\r\n")
                .await
                .unwrap();
            continue;
        }

        if cmd == "DATA" {
            reader.get_mut().write_all(b"354 go ahead\r\n").await.unwrap();
            loop {
                line.clear();
                reader.read_line(&mut line).await.unwrap();
                let payload = line.trim_end();
                if payload == "." {
                    break;
                }
                data_lines.push(payload.to_string());
            }
            reader.get_mut().write_all(b"250 queued\r\n").await.unwrap();
            continue;
        }

        let reply: &[u8] = if cmd.starts_with("EHLO") {
            b"250-mail.test greets you\r\n250-8BITMIME\r\n250 AUTH PLAIN LOGIN\r\n"
        } else if cmd.starts_with("AUTH LOGIN") {
            // Challenge for the password ("Password:" in base64).
            awaiting_auth_response = true;
            b"334 UGFzc3dvcmQ6\r\n"
        } else if cmd.starts_with("AUTH PLAIN") {
            b"235 2.7.0 accepted\r\n"
        } else if cmd.starts_with("MAIL FROM") {
            b"250 sender ok\r\n"
        } else if cmd.starts_with("RCPT TO") {
            reader
                .get_mut()
                .write_all(rcpt_reply.as_bytes())
                .await
                .unwrap();
            reader.get_mut().write_all(b"\r\n").await.unwrap();
            continue;
        } else if cmd == "QUIT" {
            reader.get_mut().write_all(b"221 bye\r\n").await.unwrap();
            break;
        } else {
            b"250 ok\r\n"
        };
        reader.get_mut().write_all(reply).await.unwrap();
    }

    (commands, data_lines)
}

async fn start_server(rcpt_reply: &'static str) -> (u16, tokio::task::JoinHandle<(Vec<String>, Vec<String>)>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (port, tokio::spawn(run_server(listener, rcpt_reply)))
}

#[tokio::test]
async fn full_session_with_login_auth() {
    init_tracing();
    let (port, server) = start_server("250 recipient ok").await;

    let stream = assert_ok!(connect("127.0.0.1", port, Duration::from_secs(5)).await);
    let mut client = assert_ok!(SmtpClient::handshake(stream, "127.0.0.1").await);
    assert!(client.server_info().supports("8BITMIME"));
    assert!(!client.server_info().supports_starttls());

    // Plaintext auth is allowed against loopback.
    let mut login = Login::new("user", "secret", "127.0.0.1");
    assert_ok!(client.auth(&mut login).await);

    assert_ok!(client.mail("from@example.com").await);
    assert_ok!(client.rcpt("to@example.com").await);
    assert_ok!(client.data().await);
    assert_ok!(
        client
            .write_body(b"Subject: hi\r\n\r\nline one\n.starts with a dot\n")
            .await
    );
    assert_ok!(client.end_data().await);
    assert_ok!(client.quit().await);

    let (commands, data_lines) = server.await.unwrap();
    assert!(commands.iter().any(|c| c == "AUTH LOGIN dXNlcg=="));
    assert!(commands.iter().any(|c| c == "c2VjcmV0"));
    assert!(commands.iter().any(|c| c == "MAIL FROM:<from@example.com>"));
    assert!(commands.iter().any(|c| c == "RCPT TO:<to@example.com>"));
    assert!(commands.iter().any(|c| c == "QUIT"));

    assert_eq!(data_lines[0], "Subject: hi");
    assert!(data_lines.iter().any(|l| l == "line one"));
    // Dot-stuffing applied on the wire.
    assert!(data_lines.iter().any(|l| l == "..starts with a dot"));
    // The trailing newline does not become an extra blank line.
    assert_eq!(data_lines.last().unwrap(), "..starts with a dot");
}

#[tokio::test]
async fn trailing_newline_does_not_add_a_blank_line() {
    init_tracing();
    let (port, server) = start_server("250 ok").await;

    let stream = assert_ok!(connect("127.0.0.1", port, Duration::from_secs(5)).await);
    let mut client = assert_ok!(SmtpClient::handshake(stream, "127.0.0.1").await);
    assert_ok!(client.mail("from@example.com").await);
    assert_ok!(client.rcpt("to@example.com").await);
    assert_ok!(client.data().await);
    assert_ok!(client.write_body(b"one\r\ntwo\r\n").await);
    assert_ok!(client.end_data().await);
    assert_ok!(client.quit().await);

    let (_, data_lines) = server.await.unwrap();
    assert_eq!(data_lines, vec!["one", "two"]);
}

#[tokio::test]
async fn plain_auth_uses_initial_response() {
    init_tracing();
    let (port, server) = start_server("250 ok").await;

    let stream = assert_ok!(connect("127.0.0.1", port, Duration::from_secs(5)).await);
    let mut client = assert_ok!(SmtpClient::handshake(stream, "127.0.0.1").await);

    let mut plain = Plain::new("user", "pass", "127.0.0.1");
    assert_ok!(client.auth(&mut plain).await);
    assert_ok!(client.quit().await);

    let (commands, _) = server.await.unwrap();
    // base64 of "\0user\0pass".
    assert!(commands.iter().any(|c| c == "AUTH PLAIN AHVzZXIAcGFzcw=="));
}

#[tokio::test]
async fn rejected_recipient_surfaces_the_reply() {
    init_tracing();
    let (port, _server) = start_server("550 5.1.1 no such user").await;

    let stream = assert_ok!(connect("127.0.0.1", port, Duration::from_secs(5)).await);
    let mut client = assert_ok!(SmtpClient::handshake(stream, "127.0.0.1").await);
    assert_ok!(client.mail("from@example.com").await);

    let err = client.rcpt("nobody@example.com").await.unwrap_err();
    match err {
        Error::SmtpError { code, message } => {
            assert_eq!(code, 550);
            assert!(message.contains("no such user"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_ok!(client.close().await);
}

#[tokio::test]
async fn starttls_refused_when_not_advertised() {
    init_tracing();
    let (port, _server) = start_server("250 ok").await;

    let stream = assert_ok!(connect("127.0.0.1", port, Duration::from_secs(5)).await);
    let client = assert_ok!(SmtpClient::handshake(stream, "127.0.0.1").await);

    let err = client.starttls().await.unwrap_err();
    assert!(matches!(err, Error::NotSupported(_)));
}

#[tokio::test]
async fn auth_refused_over_plaintext_to_non_loopback() {
    init_tracing();
    let (port, _server) = start_server("250 ok").await;

    // Dialed via loopback but configured for a real host name: the
    // mechanism must refuse before any credential bytes are framed.
    let stream = assert_ok!(connect("127.0.0.1", port, Duration::from_secs(5)).await);
    let mut client = assert_ok!(SmtpClient::handshake(stream, "mail.example.com").await);

    let mut login = Login::new("user", "secret", "mail.example.com");
    let err = client.auth(&mut login).await.unwrap_err();
    assert!(matches!(err, Error::UnencryptedConnection));
}
