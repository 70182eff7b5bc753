//! Outbound message assembly.
//!
//! Serializes headers, a quoted-printable body, and base64 attachment parts
//! into the byte sequence handed to the SMTP DATA sink.

use crate::boundary::unique_boundary;
use crate::encoding::{encode_base64_wrapped, encode_quoted_printable};
use crate::error::{Error, Result};
use crate::sniff::detect_content_type;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// `Date` header format: RFC 1123 with a numeric zone.
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Builder for a serialized RFC 822 / MIME message.
///
/// The timestamp for the `Date` header is injected through [`Self::date`];
/// callers that need deterministic output must supply it. When unset, the
/// current wall-clock time is used.
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    from: String,
    to: Vec<String>,
    subject: String,
    content_type: String,
    charset: String,
    date: Option<DateTime<Utc>>,
    attachments: Vec<PathBuf>,
}

impl MessageBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `From` address.
    #[must_use]
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    /// Adds a recipient to the `To` header.
    #[must_use]
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to.push(to.into());
        self
    }

    /// Adds all recipients from an iterator.
    #[must_use]
    pub fn recipients<I, S>(mut self, to: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.to.extend(to.into_iter().map(Into::into));
        self
    }

    /// Sets the `Subject` header.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the body content type. An empty string disables the
    /// `MIME-version` and `Content-Type` headers for plain messages.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Sets the body charset. Defaults to `UTF-8`.
    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Sets the timestamp used for the `Date` header.
    #[must_use]
    pub const fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Adds a file attachment by path.
    #[must_use]
    pub fn attach(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachments.push(path.into());
        self
    }

    /// Serializes the message.
    ///
    /// Headers are emitted in a fixed order, terminated by a single blank
    /// line, followed by the quoted-printable body or the multipart/mixed
    /// structure when attachments are present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AttachmentRead`] when an attachment cannot be read
    /// and [`Error::ContentSniff`] when its content type cannot be
    /// determined. No partial message is produced on failure.
    pub fn build(&self, body: &str) -> Result<String> {
        let encoded_body = encode_quoted_printable(body);

        let mut out = String::with_capacity(encoded_body.len() + 512);
        write_header(&mut out, "From", &self.from);
        write_header(&mut out, "To", &self.to.join(","));
        write_header(&mut out, "Subject", &self.subject);
        write_header(&mut out, "Content-Transfer-Encoding", "quoted-printable");

        if self.attachments.is_empty() {
            if !self.content_type.is_empty() {
                write_header(&mut out, "MIME-version", "1.0");
                write_header(&mut out, "Content-Type", &self.content_type_header());
            }
            write_header(&mut out, "Date", &self.format_date());
            out.push_str("\r\n");
            out.push_str(&encoded_body);
            return Ok(out);
        }

        // Read everything up front: an unreadable attachment must fail the
        // build before any part of the message escapes.
        let parts = self.read_attachments()?;

        let mut payloads: Vec<&str> = vec![&encoded_body];
        payloads.extend(parts.iter().map(|p| p.encoded.as_str()));
        let boundary = unique_boundary(&payloads);

        write_header(&mut out, "MIME-version", "1.0");
        write_header(
            &mut out,
            "Content-Type",
            &format!("multipart/mixed; boundary=\"{boundary}\""),
        );
        write_header(&mut out, "Date", &self.format_date());
        out.push_str("\r\n");

        out.push_str(&format!("--{boundary}\r\n"));
        write_header(&mut out, "Content-Type", &self.body_part_content_type());
        write_header(&mut out, "Content-Transfer-Encoding", "quoted-printable");
        out.push_str("\r\n");
        out.push_str(&encoded_body);
        out.push_str("\r\n");

        for part in &parts {
            out.push_str(&format!("--{boundary}\r\n"));
            write_header(&mut out, "Content-Type", &part.content_type);
            write_header(&mut out, "Content-Transfer-Encoding", "base64");
            write_header(
                &mut out,
                "Content-Disposition",
                &format!("attachment; filename=\"{}\"", part.filename),
            );
            out.push_str("\r\n");
            out.push_str(&part.encoded);
        }
        out.push_str(&format!("--{boundary}--\r\n"));

        Ok(out)
    }

    fn read_attachments(&self) -> Result<Vec<AttachmentPart>> {
        self.attachments
            .iter()
            .map(|path| {
                let data = std::fs::read(path).map_err(|source| Error::AttachmentRead {
                    path: path.clone(),
                    source,
                })?;
                let content_type = detect_content_type(path, &data)?;
                Ok(AttachmentPart {
                    filename: base_name(path),
                    content_type,
                    encoded: encode_base64_wrapped(&data),
                })
            })
            .collect()
    }

    fn content_type_header(&self) -> String {
        format!("{}; charset=\"{}\"", self.content_type, self.effective_charset())
    }

    fn body_part_content_type(&self) -> String {
        let ct = if self.content_type.is_empty() {
            "text/plain"
        } else {
            &self.content_type
        };
        format!("{ct}; charset=\"{}\"", self.effective_charset())
    }

    fn effective_charset(&self) -> &str {
        if self.charset.is_empty() { "UTF-8" } else { &self.charset }
    }

    fn format_date(&self) -> String {
        self.date
            .unwrap_or_else(Utc::now)
            .format(DATE_FORMAT)
            .to_string()
    }
}

/// One encoded attachment, ready for multipart framing.
#[derive(Debug)]
struct AttachmentPart {
    filename: String,
    content_type: String,
    encoded: String,
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

fn write_header(out: &mut String, name: &str, value: &str) {
    out.push_str(name);
    out.push_str(": ");
    out.push_str(value);
    out.push_str("\r\n");
}
