//! SMTP reply parser.

use crate::error::{Error, Result};
use crate::reply::{Reply, ReplyCode};

/// Parses an SMTP reply from response lines.
///
/// Replies can be single-line or multi-line:
/// - Single: `250 OK\r\n`
/// - Multi: `250-First line\r\n250-Second line\r\n250 Last line\r\n`
///
/// # Errors
///
/// Returns an error if the reply is malformed.
pub fn parse_reply(lines: &[String]) -> Result<Reply> {
    let first = lines
        .first()
        .ok_or_else(|| Error::Protocol("empty reply".into()))?;

    // Slice through `get`: the line is whatever the server sent, and a
    // multi-byte character straddling the offset must not panic.
    let code_str = first
        .get(0..3)
        .ok_or_else(|| Error::Protocol(format!("reply too short: {first}")))?;
    let code = code_str
        .parse::<u16>()
        .map_err(|_| Error::Protocol(format!("invalid reply code: {code_str}")))?;

    let mut message = Vec::with_capacity(lines.len());
    for line in lines {
        if line.len() == 3 {
            message.push(String::new());
        } else if let Some(text) = line.get(4..) {
            // Skip the code and separator ("250-" or "250 ").
            message.push(text.to_string());
        } else {
            return Err(Error::Protocol(format!("malformed reply line: {line}")));
        }
    }

    Ok(Reply::new(ReplyCode::new(code), message))
}

/// Checks if a line terminates a multi-line reply.
///
/// Continuation lines use `-` after the code; the last line uses a space
/// or is a bare code.
#[must_use]
pub fn is_last_reply_line(line: &str) -> bool {
    line.len() == 3 || (line.len() >= 4 && line.as_bytes()[3] == b' ')
}
